//! Fargate services

use crate::resource::{Resource, Value};

pub const SERVICE: &str = "ecs_service";

/// Attachment of a container port to a target group
#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancerTarget {
    pub container_name: String,
    pub container_port: u16,
    /// Logical id of the target group
    pub target_group: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FargateService {
    pub logical_id: String,
    pub service_name: String,
    pub cluster: Value,
    /// Logical id of the task definition
    pub task_definition: String,
    pub desired_count: u32,
    pub subnets: Value,
    pub security_groups: Vec<Value>,
    pub assign_public_ip: bool,
    pub health_check_grace_period_seconds: u32,
    pub maximum_percent: u32,
    pub minimum_healthy_percent: u32,
    pub load_balancers: Vec<LoadBalancerTarget>,
    /// Logical ids that must exist before the service is created
    pub depends_on: Vec<String>,
    pub service: Option<String>,
}

impl FargateService {
    pub fn new(
        logical_id: impl Into<String>,
        service_name: impl Into<String>,
        cluster: Value,
        task_definition: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            service_name: service_name.into(),
            cluster,
            task_definition: task_definition.into(),
            desired_count: 1,
            subnets: Value::List(Vec::new()),
            security_groups: Vec::new(),
            assign_public_ip: false,
            health_check_grace_period_seconds: 60,
            maximum_percent: 200,
            minimum_healthy_percent: 50,
            load_balancers: Vec::new(),
            depends_on: Vec::new(),
            service: None,
        }
    }

    /// Register the service's tasks with a target group
    pub fn attach_to_target_group(
        &mut self,
        container_name: impl Into<String>,
        container_port: u16,
        target_group: impl Into<String>,
    ) {
        self.load_balancers.push(LoadBalancerTarget {
            container_name: container_name.into(),
            container_port,
            target_group: target_group.into(),
        });
    }

    pub fn to_resource(&self) -> Resource {
        let assign_public_ip = if self.assign_public_ip {
            "ENABLED"
        } else {
            "DISABLED"
        };
        let network = Value::map([(
            "awsvpc_configuration",
            Value::map([
                ("assign_public_ip", Value::string(assign_public_ip)),
                ("subnets", self.subnets.clone()),
                ("security_groups", Value::List(self.security_groups.clone())),
            ]),
        )]);

        let load_balancers = self
            .load_balancers
            .iter()
            .map(|lb| {
                Value::map([
                    ("container_name", Value::string(&lb.container_name)),
                    ("container_port", Value::Int(lb.container_port.into())),
                    ("target_group_arn", Value::Ref(lb.target_group.clone())),
                ])
            })
            .collect();

        let mut resource = Resource::new(SERVICE, &self.logical_id)
            .with_attribute("service_name", self.service_name.as_str())
            .with_attribute("cluster", self.cluster.clone())
            .with_attribute("task_definition", Value::Ref(self.task_definition.clone()))
            .with_attribute("desired_count", Value::Int(self.desired_count.into()))
            .with_attribute("launch_type", "FARGATE")
            .with_attribute(
                "health_check_grace_period_seconds",
                Value::Int(self.health_check_grace_period_seconds.into()),
            )
            .with_attribute(
                "deployment_controller",
                Value::map([("type", Value::string("ECS"))]),
            )
            .with_attribute(
                "deployment_configuration",
                Value::map([
                    ("maximum_percent", Value::Int(self.maximum_percent.into())),
                    (
                        "minimum_healthy_percent",
                        Value::Int(self.minimum_healthy_percent.into()),
                    ),
                ]),
            )
            .with_attribute("network_configuration", network)
            .with_attribute("load_balancers", Value::List(load_balancers));

        for dependency in &self.depends_on {
            resource = resource.with_dependency(dependency);
        }

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> FargateService {
        let mut svc = FargateService::new(
            "ServiceApi",
            "ecs-api",
            Value::Parameter("/ecs/cluster/demo/arn".into()),
            "TaskDefinitionApi",
        );
        svc.desired_count = 2;
        svc.subnets = Value::List(vec![
            Value::Parameter("/network/prisub1".into()),
            Value::Parameter("/network/prisub2".into()),
        ]);
        svc.security_groups = vec![Value::ResourceRef(
            "SecurityGroupEcsFargate".into(),
            "GroupId".into(),
        )];
        svc.attach_to_target_group("api", 8080, "TargetGroupApi");
        svc.depends_on.push("ListenerRuleApi".into());
        svc.service = Some("api".into());
        svc
    }

    #[test]
    fn service_runs_in_private_subnets_without_public_ip() {
        let resource = service().to_resource();
        let network = resource.get("network_configuration").unwrap().as_map().unwrap();
        let vpc = network["awsvpc_configuration"].as_map().unwrap();
        assert_eq!(vpc["assign_public_ip"], Value::string("DISABLED"));
        assert_eq!(vpc["subnets"].as_list().unwrap().len(), 2);
        assert_eq!(resource.get("desired_count"), Some(&Value::Int(2)));
        assert_eq!(resource.get("launch_type"), Some(&Value::string("FARGATE")));
    }

    #[test]
    fn service_targets_container_port() {
        let resource = service().to_resource();
        let lbs = resource.get("load_balancers").unwrap().as_list().unwrap();
        let lb = lbs[0].as_map().unwrap();
        assert_eq!(lb["container_name"], Value::string("api"));
        assert_eq!(lb["container_port"], Value::Int(8080));
        assert_eq!(lb["target_group_arn"], Value::Ref("TargetGroupApi".into()));
    }

    #[test]
    fn service_waits_for_listener_rule() {
        let resource = service().to_resource();
        assert_eq!(resource.depends_on, vec!["ListenerRuleApi"]);
        assert_eq!(
            resource.dependencies(),
            vec![
                "ListenerRuleApi",
                "SecurityGroupEcsFargate",
                "TargetGroupApi",
                "TaskDefinitionApi"
            ]
        );
    }
}
