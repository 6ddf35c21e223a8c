//! Typed building blocks that lower to [`Resource`](crate::resource::Resource)s
//!
//! Each component knows its resource type name and how to express itself as
//! snake_case attributes. Cross-resource wiring is done through logical ids.

pub mod iam;
pub mod load_balancer;
pub mod logs;
pub mod routing;
pub mod security;
pub mod service;
pub mod task;

pub use iam::{Policy, PolicyStatement, Role};
pub use load_balancer::{FixedResponse, HealthCheck, Listener, LoadBalancer, TargetGroup};
pub use logs::{LogDriver, LogGroup};
pub use routing::{RoutingRule, RuleCondition};
pub use security::{SecurityGroup, SecurityGroupRule, allow_from};
pub use service::FargateService;
pub use task::{ContainerDefinition, PortMapping, TaskDefinition};

/// Every resource type a fleet stack is built from
pub const RESOURCE_TYPES: &[&str] = &[
    security::SECURITY_GROUP,
    security::SECURITY_GROUP_INGRESS,
    security::SECURITY_GROUP_EGRESS,
    iam::ROLE,
    iam::POLICY,
    logs::LOG_GROUP,
    load_balancer::LOAD_BALANCER,
    load_balancer::LISTENER,
    load_balancer::TARGET_GROUP,
    routing::LISTENER_RULE,
    task::TASK_DEFINITION,
    service::SERVICE,
];
