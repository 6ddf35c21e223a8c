//! ServiceFleetProvisioner - Declares the resource graph of a Fargate fleet
//!
//! One load balancer and listener are shared by the whole fleet. Every
//! service descriptor then adds its own subgraph: target group, listener
//! rule, task definition, security group with load balancer ingress, and
//! the service itself.
//!
//! Shared network and cluster identifiers come from the parameter store.
//! Without a store the lookups are deferred to the provisioning engine, so
//! a missing key only surfaces when the template is applied.

use std::collections::HashMap;

use crate::components::iam::{ECS_TASKS_PRINCIPAL, Policy, PolicyStatement, Role};
use crate::components::load_balancer::{FixedResponse, HealthCheck, Listener, LoadBalancer, TargetGroup};
use crate::components::logs::{LogDriver, LogGroup};
use crate::components::routing::RoutingRule;
use crate::components::security::{ANY_IPV4, SecurityGroup, allow_from};
use crate::components::service::FargateService;
use crate::components::task::{ContainerDefinition, PortMapping, TaskDefinition};
use crate::config::{ConfigError, FleetConfig, ServiceDescriptor};
use crate::network::{
    CLUSTER_ARN_KEY, ClusterReference, NetworkContext, resolve_shared_parameters,
};
use crate::parameter::{ParameterError, ParameterStore};
use crate::resource::{Value, logical_id_fragment};
use crate::stack::{Stack, StackError};

pub const COMPUTE_SECURITY_GROUP: &str = "SecurityGroupEcsFargate";
pub const TASK_ROLE: &str = "EcsTaskRole";
pub const TASK_ROLE_POLICY: &str = "EcsTaskRolePolicy";
pub const EXECUTION_ROLE: &str = "EcsExecutionRole";
pub const EXECUTION_ROLE_POLICY: &str = "EcsExecutionRolePolicy";
pub const LOG_GROUP: &str = "LogGroup";
pub const LOAD_BALANCER: &str = "LoadBalancer";
pub const LOAD_BALANCER_SECURITY_GROUP: &str = "LoadBalancerSecurityGroup";
pub const LISTENER: &str = "Listener";

pub const DNS_NAME_OUTPUT: &str = "LoadBalancerDnsName";

/// Ports the load balancer may reach every service on
pub const SERVICE_INGRESS_PORTS: [u16; 2] = [80, 8080];

const LISTENER_PORT: u16 = 80;
const TARGET_GROUP_PORT: u16 = 80;

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("Unresolved references:\n  {}", format_references(.0))]
    References(Vec<StackError>),

    #[error("Physical name collisions: {}", format_collisions(.0))]
    NameCollision(Vec<(String, String)>),
}

fn format_references(errors: &[StackError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    lines.join("\n  ")
}

fn format_collisions(collisions: &[(String, String)]) -> String {
    let names: Vec<String> = collisions
        .iter()
        .map(|(resource_type, name)| format!("{} '{}'", resource_type, name))
        .collect();
    names.join(", ")
}

/// Logical ids of the resources declared for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResources {
    pub service_name: String,
    pub target_group: String,
    pub listener_rule: String,
    pub task_definition: String,
    pub security_group: String,
    pub service: String,
}

impl ServiceResources {
    fn for_descriptor(descriptor: &ServiceDescriptor) -> Self {
        let fragment = logical_id_fragment(&descriptor.service_name);
        Self {
            service_name: descriptor.service_name.clone(),
            target_group: format!("TargetGroup{}", fragment),
            listener_rule: format!("ListenerRule{}", fragment),
            task_definition: format!("TaskDefinition{}", fragment),
            security_group: format!("ServiceSecurityGroup{}", fragment),
            service: format!("Service{}", fragment),
        }
    }

    /// Prefix of the security group rules admitting load balancer traffic
    fn ingress_prefix(&self) -> &str {
        &self.service
    }
}

/// Result of a synthesis
#[derive(Debug, Clone)]
pub struct FleetStack {
    pub app_name: String,
    pub stack: Stack,
    pub network: NetworkContext,
    pub cluster: ClusterReference,
    /// Routing rules in priority order
    pub routing_rules: Vec<RoutingRule>,
    pub services: Vec<ServiceResources>,
}

impl FleetStack {
    pub fn routing_rule(&self, service_name: &str) -> Option<&RoutingRule> {
        self.routing_rules
            .iter()
            .find(|rule| rule.service.as_deref() == Some(service_name))
    }

    pub fn service_resources(&self, service_name: &str) -> Option<&ServiceResources> {
        self.services
            .iter()
            .find(|s| s.service_name == service_name)
    }
}

pub struct ServiceFleetProvisioner {
    config: FleetConfig,
    parameter_store: Option<Box<dyn ParameterStore>>,
}

impl ServiceFleetProvisioner {
    /// Provisioner whose parameter lookups are deferred to apply time
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            parameter_store: None,
        }
    }

    /// Resolve shared parameters through `store` during synthesis
    pub fn with_parameter_store(mut self, store: impl ParameterStore + 'static) -> Self {
        self.parameter_store = Some(Box::new(store));
        self
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Validate the configuration, resolve shared inputs, and declare the fleet
    pub async fn synthesize(&self) -> Result<FleetStack, FleetError> {
        self.config.validate()?;

        let values = match &self.parameter_store {
            Some(store) => resolve_shared_parameters(store.as_ref()).await?,
            None => {
                log::debug!("No parameter store configured, deferring lookups");
                HashMap::new()
            }
        };

        let network = NetworkContext::from_values(&values);
        let cluster_arn = match values.get(CLUSTER_ARN_KEY) {
            Some(arn) => Value::String(arn.clone()),
            None => Value::Parameter(CLUSTER_ARN_KEY.to_string()),
        };
        self.declare(network, cluster_arn)
    }

    /// Declare the fleet against an already known network and cluster
    pub fn build(&self, network: NetworkContext, cluster_arn: Value) -> Result<FleetStack, FleetError> {
        self.config.validate()?;
        self.declare(network, cluster_arn)
    }

    fn declare(&self, network: NetworkContext, cluster_arn: Value) -> Result<FleetStack, FleetError> {
        let app = self.config.app_name.as_str();
        log::info!(
            "Synthesizing fleet '{}' with {} service(s)",
            app,
            self.config.services.len()
        );

        let cluster = ClusterReference::new(app, cluster_arn, COMPUTE_SECURITY_GROUP);
        let mut stack = Stack::new();
        stack.description = Some(format!("ECS Fargate service fleet for {}", app));

        let compute_sg = SecurityGroup::new(
            COMPUTE_SECURITY_GROUP,
            "Security Group for Fargate",
            network.vpc_id.clone(),
        );
        stack.add(compute_sg.to_resource())?;

        let task_role = Role::new(TASK_ROLE, ECS_TASKS_PRINCIPAL)
            .with_role_name(format!("role-{}EcsTaskRole", app));
        stack.add(task_role.to_resource())?;
        // TODO: scope the task role to the parameters and buckets the services actually use
        let mut task_policy = Policy::new(TASK_ROLE_POLICY, TASK_ROLE_POLICY, TASK_ROLE);
        task_policy.add_statement(PolicyStatement::allow_all(["ssm:*", "s3:*"]));
        stack.add(task_policy.to_resource())?;

        let lb_sg = SecurityGroup::new(
            LOAD_BALANCER_SECURITY_GROUP,
            format!("Security Group for alb-{}", app),
            network.vpc_id.clone(),
        )
        .with_allow_all_outbound(false)
        .with_ingress_from_cidr(ANY_IPV4, LISTENER_PORT);
        stack.add(lb_sg.to_resource())?;

        let load_balancer = LoadBalancer {
            logical_id: LOAD_BALANCER.to_string(),
            name: self.config.load_balancer_name(),
            internet_facing: true,
            subnets: network.public_subnet_list(),
            security_group: LOAD_BALANCER_SECURITY_GROUP.to_string(),
        };
        stack.add(load_balancer.to_resource())?;

        let listener = Listener {
            logical_id: LISTENER.to_string(),
            load_balancer: LOAD_BALANCER.to_string(),
            port: LISTENER_PORT,
            default_action: FixedResponse::new(503).with_message_body("OK"),
        };
        stack.add(listener.to_resource())?;

        let execution_role = Role::new(EXECUTION_ROLE, ECS_TASKS_PRINCIPAL);
        stack.add(execution_role.to_resource())?;
        let mut execution_policy =
            Policy::new(EXECUTION_ROLE_POLICY, EXECUTION_ROLE_POLICY, EXECUTION_ROLE);
        execution_policy.add_statement(PolicyStatement::allow_all([
            "ecr:GetAuthorizationToken",
            "ecr:BatchCheckLayerAvailability",
            "ecr:GetDownloadUrlForLayer",
            "ecr:BatchGetImage",
            "logs:CreateLogStream",
            "logs:PutLogEvents",
        ]));
        execution_policy.add_statement(PolicyStatement::allow_all(["ssm:*"]));
        stack.add(execution_policy.to_resource())?;

        stack.add(LogGroup::new(LOG_GROUP).to_resource())?;
        let log_driver = LogDriver::aws_logs(LOG_GROUP, format!("logs-{}", app));

        let mut routing_rules = Vec::with_capacity(self.config.services.len());
        let mut services = Vec::with_capacity(self.config.services.len());

        for (index, descriptor) in self.config.services.iter().enumerate() {
            let ids = ServiceResources::for_descriptor(descriptor);
            let name = descriptor.service_name.as_str();
            log::debug!("Declaring service '{}' (priority {})", name, index + 1);

            let target_group = TargetGroup {
                logical_id: ids.target_group.clone(),
                name: descriptor.target_group_name(),
                port: TARGET_GROUP_PORT,
                vpc_id: network.vpc_id.clone(),
                health_check: HealthCheck {
                    path: descriptor.health_check_path().to_string(),
                    timeout_seconds: 30,
                    interval_seconds: 60,
                    healthy_http_codes: "200-499".to_string(),
                },
                service: Some(name.to_string()),
            };
            stack.add(target_group.to_resource())?;

            let rule = RoutingRule {
                logical_id: ids.listener_rule.clone(),
                listener: LISTENER.to_string(),
                priority: index as u32 + 1,
                conditions: RoutingRule::conditions_for(
                    descriptor.host_name.as_deref(),
                    descriptor.path.as_deref(),
                ),
                target_group: ids.target_group.clone(),
                service: Some(name.to_string()),
            };
            stack.add(rule.to_resource())?;

            let mut container = ContainerDefinition::new(name, &descriptor.image_uri);
            container.add_port_mapping(PortMapping::tcp(descriptor.container_port));
            container.logging = Some(log_driver.clone());

            let mut task = TaskDefinition::fargate(
                &ids.task_definition,
                name,
                TASK_ROLE,
                EXECUTION_ROLE,
            );
            task.add_container(container);
            task.service = Some(name.to_string());
            stack.add(task.to_resource())?;

            let service_sg = SecurityGroup::new(
                &ids.security_group,
                format!("Security Group for {}", name),
                network.vpc_id.clone(),
            )
            .for_service(name);
            stack.add(service_sg.to_resource())?;
            for port in SERVICE_INGRESS_PORTS {
                for sg_rule in allow_from(
                    ids.ingress_prefix(),
                    LOAD_BALANCER_SECURITY_GROUP,
                    &ids.security_group,
                    port,
                    Some(name),
                ) {
                    stack.add(sg_rule.to_resource())?;
                }
            }

            let mut service = FargateService::new(
                &ids.service,
                descriptor.ecs_service_name(),
                cluster.cluster_arn.clone(),
                &ids.task_definition,
            );
            service.desired_count = descriptor.desired_count;
            service.subnets = network.private_subnet_list();
            service.security_groups = vec![compute_sg.group_id(), service_sg.group_id()];
            service.attach_to_target_group(name, descriptor.container_port, &ids.target_group);
            service.depends_on.push(ids.listener_rule.clone());
            service.service = Some(name.to_string());
            stack.add(service.to_resource())?;

            routing_rules.push(rule);
            services.push(ids);
        }

        stack.add_output(
            DNS_NAME_OUTPUT,
            load_balancer.dns_name(),
            Some("DNS name of the application load balancer"),
        );

        stack.validate_references().map_err(FleetError::References)?;
        for attribute in ["name", "family", "service_name"] {
            let collisions = stack.physical_name_collisions(attribute);
            if !collisions.is_empty() {
                return Err(FleetError::NameCollision(collisions));
            }
        }

        log::info!("{}", stack.summary());
        Ok(FleetStack {
            app_name: app.to_string(),
            stack,
            network,
            cluster,
            routing_rules,
            services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::load_balancer::TARGET_GROUP;
    use crate::components::routing::{LISTENER_RULE, RuleCondition};
    use crate::components::service::SERVICE;
    use crate::components::task::TASK_DEFINITION;
    use crate::network::REQUIRED_KEYS;
    use crate::parameter::StaticParameterStore;

    fn demo_config() -> FleetConfig {
        FleetConfig::new(
            "demo",
            vec![ServiceDescriptor::new("api", "repo/img:tag", 8080, 2).with_host_name("api.example.com")],
        )
    }

    fn three_services() -> FleetConfig {
        FleetConfig::new(
            "shop",
            vec![
                ServiceDescriptor::new("api", "repo/api:1", 8080, 2).with_host_name("api.example.com"),
                ServiceDescriptor::new("admin", "repo/admin:1", 80, 1)
                    .with_host_name("example.com")
                    .with_path("/admin/*"),
                ServiceDescriptor::new("web", "repo/web:1", 80, 3),
            ],
        )
    }

    async fn synthesize(config: FleetConfig) -> FleetStack {
        ServiceFleetProvisioner::new(config).synthesize().await.unwrap()
    }

    fn full_store() -> StaticParameterStore {
        REQUIRED_KEYS
            .iter()
            .map(|k| (k.to_string(), format!("value-of-{}", k)))
            .collect()
    }

    #[tokio::test]
    async fn demo_end_to_end() {
        let fleet = synthesize(demo_config()).await;
        let stack = &fleet.stack;

        let tg = stack.get("TargetGroupApi").unwrap();
        assert_eq!(tg.get("name"), Some(&Value::string("TG-api")));

        let rule = fleet.routing_rule("api").unwrap();
        assert_eq!(rule.priority, 1);
        assert_eq!(
            rule.conditions,
            vec![RuleCondition::HostHeader(vec!["api.example.com".into()])]
        );

        let task = stack.get("TaskDefinitionApi").unwrap();
        assert_eq!(task.get("family"), Some(&Value::string("api")));
        let containers = task.get("container_definitions").unwrap().as_list().unwrap();
        assert_eq!(containers.len(), 1);
        let ports = containers[0].as_map().unwrap()["port_mappings"].as_list().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].as_map().unwrap()["container_port"], Value::Int(8080));

        let service = stack.get("ServiceApi").unwrap();
        assert_eq!(service.get("service_name"), Some(&Value::string("ecs-api")));
        assert_eq!(service.get("desired_count"), Some(&Value::Int(2)));
        let lbs = service.get("load_balancers").unwrap().as_list().unwrap();
        assert_eq!(
            lbs[0].as_map().unwrap()["target_group_arn"],
            Value::Ref("TargetGroupApi".into())
        );
    }

    fn policy_statements(stack: &Stack, logical_id: &str) -> Vec<Value> {
        let document = stack.get(logical_id).unwrap().get("policy_document").unwrap();
        document.as_map().unwrap()["statement"].as_list().unwrap().to_vec()
    }

    #[tokio::test]
    async fn shared_compute_and_service_settings() {
        let fleet = synthesize(demo_config()).await;
        let stack = &fleet.stack;

        let ids = fleet.service_resources("api").unwrap();
        assert_eq!(ids.service, "ServiceApi");
        let service = stack.get(&ids.service).unwrap();
        assert_eq!(
            service.get("health_check_grace_period_seconds"),
            Some(&Value::Int(60))
        );
        assert_eq!(
            service.get("deployment_controller").unwrap().as_map().unwrap()["type"],
            Value::string("ECS")
        );
        let network = service.get("network_configuration").unwrap().as_map().unwrap();
        let awsvpc = network["awsvpc_configuration"].as_map().unwrap();
        assert_eq!(
            awsvpc["security_groups"],
            Value::List(vec![
                Value::ResourceRef(COMPUTE_SECURITY_GROUP.into(), "GroupId".into()),
                Value::ResourceRef(ids.security_group.clone(), "GroupId".into()),
            ])
        );

        let compute_sg = stack.get(COMPUTE_SECURITY_GROUP).unwrap();
        let egress = compute_sg.get("security_group_egress").unwrap().as_list().unwrap();
        assert_eq!(egress.len(), 1);
        let egress = egress[0].as_map().unwrap();
        assert_eq!(egress["ip_protocol"], Value::string("-1"));
        assert_eq!(egress["cidr_ip"], Value::string(ANY_IPV4));

        let task_statements = policy_statements(stack, TASK_ROLE_POLICY);
        assert_eq!(task_statements.len(), 1);
        let statement = task_statements[0].as_map().unwrap();
        assert_eq!(statement["effect"], Value::string("Allow"));
        assert_eq!(statement["action"], Value::strings(["ssm:*", "s3:*"]));
        assert_eq!(statement["resource"], Value::strings(["*"]));

        let execution_statements = policy_statements(stack, EXECUTION_ROLE_POLICY);
        assert_eq!(execution_statements.len(), 2);
        let pull_and_log = execution_statements[0].as_map().unwrap()["action"]
            .as_list()
            .unwrap()
            .to_vec();
        for action in [
            "ecr:GetAuthorizationToken",
            "ecr:BatchGetImage",
            "logs:CreateLogStream",
            "logs:PutLogEvents",
        ] {
            assert!(pull_and_log.contains(&Value::string(action)), "missing {}", action);
        }
        assert_eq!(
            execution_statements[1].as_map().unwrap()["action"],
            Value::strings(["ssm:*"])
        );
    }

    #[tokio::test]
    async fn one_subgraph_per_service() {
        let fleet = synthesize(three_services()).await;
        let stack = &fleet.stack;

        let summary = stack.summary();
        assert_eq!(summary.by_type[TARGET_GROUP], 3);
        assert_eq!(summary.by_type[LISTENER_RULE], 3);
        assert_eq!(summary.by_type[TASK_DEFINITION], 3);
        assert_eq!(summary.by_type[SERVICE], 3);
        // shared: compute sg, 2 roles, 2 policies, lb sg, lb, listener, log group
        // per service: tg, rule, task, sg, 4 sg rules, service
        assert_eq!(stack.len(), 9 + 3 * 9);
    }

    #[tokio::test]
    async fn priorities_follow_input_order() {
        let fleet = synthesize(three_services()).await;
        let priorities: Vec<u32> = fleet.routing_rules.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);

        let names: Vec<_> = fleet
            .routing_rules
            .iter()
            .map(|r| r.service.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["api", "admin", "web"]);
    }

    #[tokio::test]
    async fn conditions_per_routing_shape() {
        let fleet = synthesize(three_services()).await;

        let api = fleet.routing_rule("api").unwrap();
        assert_eq!(api.conditions.len(), 1);
        assert_eq!(api.conditions[0].field(), "host-header");

        let admin = fleet.routing_rule("admin").unwrap();
        assert_eq!(
            admin.conditions,
            vec![
                RuleCondition::HostHeader(vec!["example.com".into()]),
                RuleCondition::PathPattern(vec!["/admin/*".into()]),
            ]
        );

        let web = fleet.routing_rule("web").unwrap();
        assert!(web.is_catch_all());
    }

    #[tokio::test]
    async fn health_check_path_defaults_to_root() {
        let fleet = synthesize(three_services()).await;
        let path = |id: &str| fleet.stack.get(id).unwrap().get("health_check_path").cloned();

        assert_eq!(path("TargetGroupApi"), Some(Value::string("/")));
        assert_eq!(path("TargetGroupAdmin"), Some(Value::string("/admin/*")));
        assert_eq!(path("TargetGroupWeb"), Some(Value::string("/")));
    }

    #[tokio::test]
    async fn path_without_host_still_drives_health_check() {
        let config = FleetConfig::new(
            "demo",
            vec![ServiceDescriptor::new("web", "repo/web:1", 80, 1).with_path("/status")],
        );
        let fleet = synthesize(config).await;

        assert!(fleet.routing_rule("web").unwrap().is_catch_all());
        assert_eq!(
            fleet.stack.get("TargetGroupWeb").unwrap().get("health_check_path"),
            Some(&Value::string("/status"))
        );
    }

    #[tokio::test]
    async fn duplicate_service_names_are_rejected() {
        let mut config = demo_config();
        config
            .services
            .push(ServiceDescriptor::new("api", "repo/other:1", 80, 1).with_host_name("other.example.com"));

        match ServiceFleetProvisioner::new(config).synthesize().await {
            Err(FleetError::Config(ConfigError::Validation(errors))) => {
                assert!(errors[0].contains("duplicate serviceName 'api'"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn colliding_logical_ids_are_rejected() {
        let config = FleetConfig::new(
            "demo",
            vec![
                ServiceDescriptor::new("my-api", "repo/a:1", 80, 1).with_host_name("a.example.com"),
                ServiceDescriptor::new("myApi", "repo/b:1", 80, 1).with_host_name("b.example.com"),
            ],
        );
        let result = ServiceFleetProvisioner::new(config)
            .build(NetworkContext::deferred(), Value::Parameter(CLUSTER_ARN_KEY.into()));

        match result {
            Err(FleetError::Stack(StackError::DuplicateResource { logical_id, .. })) => {
                assert_eq!(logical_id, "TargetGroupMyApi");
            }
            other => panic!("Expected duplicate resource error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn deferred_mode_references_parameter_keys() {
        let fleet = synthesize(demo_config()).await;
        let keys = fleet.stack.parameter_keys();

        let mut expected: Vec<String> = REQUIRED_KEYS.iter().map(|k| k.to_string()).collect();
        // availability zones are part of the context but no resource uses them
        expected.retain(|k| !k.starts_with("/network/az"));
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(fleet.cluster.cluster_name, "cluster-demo");
    }

    #[tokio::test]
    async fn parameter_store_resolves_shared_inputs() {
        let fleet = ServiceFleetProvisioner::new(demo_config())
            .with_parameter_store(full_store())
            .synthesize()
            .await
            .unwrap();

        assert!(fleet.stack.parameter_keys().is_empty());
        let service = fleet.stack.get("ServiceApi").unwrap();
        assert_eq!(
            service.get("cluster"),
            Some(&Value::string("value-of-/ecs/clusterarn"))
        );
    }

    #[tokio::test]
    async fn missing_parameters_fail_synthesis() {
        let store = StaticParameterStore::new().with("/network/vpc_id", "vpc-1");
        let result = ServiceFleetProvisioner::new(demo_config())
            .with_parameter_store(store)
            .synthesize()
            .await;
        assert!(matches!(
            result,
            Err(FleetError::Parameter(ParameterError::Missing(_)))
        ));
    }

    #[tokio::test]
    async fn services_wait_for_their_listener_rule() {
        let fleet = synthesize(three_services()).await;
        let sorted: Vec<&str> = fleet
            .stack
            .sorted()
            .iter()
            .map(|r| r.id.name.as_str())
            .collect();

        for ids in &fleet.services {
            let rule = sorted.iter().position(|n| *n == ids.listener_rule).unwrap();
            let service = sorted.iter().position(|n| *n == ids.service).unwrap();
            assert!(rule < service, "{} must precede {}", ids.listener_rule, ids.service);
        }
    }

    #[tokio::test]
    async fn load_balancer_reaches_services_on_both_ports() {
        let fleet = synthesize(demo_config()).await;
        for port in SERVICE_INGRESS_PORTS {
            let ingress = fleet.stack.get(&format!("ServiceApiIngress{}", port)).unwrap();
            assert_eq!(
                ingress.get("source_security_group_id"),
                Some(&Value::ResourceRef(
                    LOAD_BALANCER_SECURITY_GROUP.into(),
                    "GroupId".into()
                ))
            );
            assert!(fleet.stack.get(&format!("ServiceApiEgress{}", port)).is_some());
        }
    }

    #[tokio::test]
    async fn shared_resources_and_output() {
        let fleet = synthesize(demo_config()).await;
        let stack = &fleet.stack;

        let lb = stack.get(LOAD_BALANCER).unwrap();
        assert_eq!(lb.get("name"), Some(&Value::string("alb-demo")));
        assert_eq!(lb.get("scheme"), Some(&Value::string("internet-facing")));

        let role = stack.get(TASK_ROLE).unwrap();
        assert_eq!(role.get("role_name"), Some(&Value::string("role-demoEcsTaskRole")));

        let outputs = stack.outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].name, DNS_NAME_OUTPUT);
        assert_eq!(
            outputs[0].value,
            Value::ResourceRef(LOAD_BALANCER.into(), "DNSName".into())
        );
    }
}
