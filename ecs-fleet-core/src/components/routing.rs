//! Listener routing rules
//!
//! Rules are evaluated by the load balancer in ascending priority. A rule
//! without conditions is a catch-all: it matches whatever the rules with a
//! lower priority number did not.

use crate::resource::{Resource, Value};

pub const LISTENER_RULE: &str = "elbv2_listener_rule";

/// Path pattern used to express "match everything" where the provider
/// insists on at least one condition
pub const MATCH_ALL_PATH: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCondition {
    HostHeader(Vec<String>),
    PathPattern(Vec<String>),
}

impl RuleCondition {
    pub fn field(&self) -> &'static str {
        match self {
            RuleCondition::HostHeader(_) => "host-header",
            RuleCondition::PathPattern(_) => "path-pattern",
        }
    }

    pub fn to_value(&self) -> Value {
        let (config_key, values) = match self {
            RuleCondition::HostHeader(values) => ("host_header_config", values),
            RuleCondition::PathPattern(values) => ("path_pattern_config", values),
        };
        Value::map([
            ("field", Value::string(self.field())),
            (
                config_key,
                Value::map([("values", Value::strings(values.iter().cloned()))]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRule {
    pub logical_id: String,
    /// Logical id of the listener
    pub listener: String,
    pub priority: u32,
    pub conditions: Vec<RuleCondition>,
    /// Logical id of the target group requests are forwarded to
    pub target_group: String,
    pub service: Option<String>,
}

impl RoutingRule {
    /// Conditions for a fleet member
    ///
    /// A host alone matches on the host header; host and path match on both.
    /// Anything else (no host) has no distinguishing condition.
    pub fn conditions_for(host_name: Option<&str>, path: Option<&str>) -> Vec<RuleCondition> {
        match (host_name, path) {
            (Some(host), None) => vec![RuleCondition::HostHeader(vec![host.to_string()])],
            (Some(host), Some(path)) => vec![
                RuleCondition::HostHeader(vec![host.to_string()]),
                RuleCondition::PathPattern(vec![path.to_string()]),
            ],
            (None, _) => Vec::new(),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn to_resource(&self) -> Resource {
        let conditions = if self.is_catch_all() {
            vec![RuleCondition::PathPattern(vec![MATCH_ALL_PATH.to_string()]).to_value()]
        } else {
            self.conditions.iter().map(RuleCondition::to_value).collect()
        };

        let forward = Value::map([
            ("type", Value::string("forward")),
            ("target_group_arn", Value::Ref(self.target_group.clone())),
        ]);

        let resource = Resource::new(LISTENER_RULE, &self.logical_id)
            .with_attribute("listener_arn", Value::Ref(self.listener.clone()))
            .with_attribute("priority", Value::Int(self.priority.into()))
            .with_attribute("conditions", Value::List(conditions))
            .with_attribute("actions", Value::List(vec![forward]));

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}
