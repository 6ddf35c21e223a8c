//! Application load balancer, its listener, and target groups

use crate::resource::{Resource, Value};

pub const LOAD_BALANCER: &str = "elbv2_load_balancer";
pub const LISTENER: &str = "elbv2_listener";
pub const TARGET_GROUP: &str = "elbv2_target_group";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancer {
    pub logical_id: String,
    pub name: String,
    pub internet_facing: bool,
    pub subnets: Value,
    /// Logical id of the load balancer's own security group
    pub security_group: String,
}

impl LoadBalancer {
    pub fn dns_name(&self) -> Value {
        Value::ResourceRef(self.logical_id.clone(), "DNSName".to_string())
    }

    pub fn to_resource(&self) -> Resource {
        let scheme = if self.internet_facing {
            "internet-facing"
        } else {
            "internal"
        };
        Resource::new(LOAD_BALANCER, &self.logical_id)
            .with_attribute("name", self.name.as_str())
            .with_attribute("scheme", scheme)
            .with_attribute("type", "application")
            .with_attribute("subnets", self.subnets.clone())
            .with_attribute(
                "security_groups",
                Value::List(vec![Value::ResourceRef(
                    self.security_group.clone(),
                    "GroupId".to_string(),
                )]),
            )
    }
}

/// Fixed response returned when no routing rule matches
#[derive(Debug, Clone, PartialEq)]
pub struct FixedResponse {
    pub status_code: u16,
    pub message_body: Option<String>,
}

impl FixedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            message_body: None,
        }
    }

    pub fn with_message_body(mut self, body: impl Into<String>) -> Self {
        self.message_body = Some(body.into());
        self
    }

    pub fn to_action(&self) -> Value {
        let mut config = vec![("status_code", Value::String(self.status_code.to_string()))];
        if let Some(body) = &self.message_body {
            config.push(("message_body", Value::string(body)));
        }
        Value::map([
            ("type", Value::string("fixed-response")),
            ("fixed_response_config", Value::map(config)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listener {
    pub logical_id: String,
    /// Logical id of the load balancer
    pub load_balancer: String,
    pub port: u16,
    pub default_action: FixedResponse,
}

impl Listener {
    pub fn to_resource(&self) -> Resource {
        Resource::new(LISTENER, &self.logical_id)
            .with_attribute("load_balancer_arn", Value::Ref(self.load_balancer.clone()))
            .with_attribute("port", Value::Int(self.port.into()))
            .with_attribute("protocol", "HTTP")
            .with_attribute(
                "default_actions",
                Value::List(vec![self.default_action.to_action()]),
            )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheck {
    pub path: String,
    pub timeout_seconds: u32,
    pub interval_seconds: u32,
    /// Range of HTTP codes counted as healthy, e.g. "200-499"
    pub healthy_http_codes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetGroup {
    pub logical_id: String,
    pub name: String,
    pub port: u16,
    pub vpc_id: Value,
    pub health_check: HealthCheck,
    pub service: Option<String>,
}

impl TargetGroup {
    pub fn to_resource(&self) -> Resource {
        let resource = Resource::new(TARGET_GROUP, &self.logical_id)
            .with_attribute("name", self.name.as_str())
            .with_attribute("port", Value::Int(self.port.into()))
            .with_attribute("protocol", "HTTP")
            .with_attribute("target_type", "ip")
            .with_attribute("vpc_id", self.vpc_id.clone())
            .with_attribute("health_check_path", self.health_check.path.as_str())
            .with_attribute(
                "health_check_timeout_seconds",
                Value::Int(self.health_check.timeout_seconds.into()),
            )
            .with_attribute(
                "health_check_interval_seconds",
                Value::Int(self.health_check.interval_seconds.into()),
            )
            .with_attribute(
                "matcher",
                Value::map([(
                    "http_code",
                    Value::string(&self.health_check.healthy_http_codes),
                )]),
            );

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_response_action() {
        let action = FixedResponse::new(503).with_message_body("OK").to_action();
        let action = action.as_map().unwrap();
        assert_eq!(action["type"], Value::string("fixed-response"));
        let config = action["fixed_response_config"].as_map().unwrap();
        assert_eq!(config["status_code"], Value::string("503"));
        assert_eq!(config["message_body"], Value::string("OK"));
    }

    #[test]
    fn listener_references_load_balancer() {
        let listener = Listener {
            logical_id: "Listener".into(),
            load_balancer: "LoadBalancer".into(),
            port: 80,
            default_action: FixedResponse::new(503),
        };
        let resource = listener.to_resource();
        assert_eq!(resource.get("port"), Some(&Value::Int(80)));
        assert_eq!(resource.dependencies(), vec!["LoadBalancer"]);
    }

    #[test]
    fn target_group_health_check_attributes() {
        let tg = TargetGroup {
            logical_id: "TargetGroupApi".into(),
            name: "TG-api".into(),
            port: 80,
            vpc_id: Value::Parameter("/network/vpc_id".into()),
            health_check: HealthCheck {
                path: "/health".into(),
                timeout_seconds: 30,
                interval_seconds: 60,
                healthy_http_codes: "200-499".into(),
            },
            service: Some("api".into()),
        };
        let resource = tg.to_resource();
        assert_eq!(resource.get("target_type"), Some(&Value::string("ip")));
        assert_eq!(resource.get("health_check_path"), Some(&Value::string("/health")));
        assert_eq!(resource.get("health_check_timeout_seconds"), Some(&Value::Int(30)));
        assert_eq!(resource.get("health_check_interval_seconds"), Some(&Value::Int(60)));
        assert_eq!(resource.service(), Some("api"));
    }
}
