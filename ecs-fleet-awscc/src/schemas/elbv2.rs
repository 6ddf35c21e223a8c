//! Elastic Load Balancing v2 schemas
//!
//! Based on CloudFormation AWS::ElasticLoadBalancingV2::{LoadBalancer,
//! Listener, TargetGroup, ListenerRule}.

use ecs_fleet_core::components::load_balancer::{LISTENER, LOAD_BALANCER, TARGET_GROUP};
use ecs_fleet_core::components::routing::LISTENER_RULE;
use ecs_fleet_core::resource::Value;
use ecs_fleet_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{AwsccSchemaConfig, document_list, enum_type, string_list};

const PROTOCOLS: &[&str] = &["HTTP", "HTTPS"];

/// Listener rule priority (1-50000)
pub fn rule_priority() -> AttributeType {
    AttributeType::Custom {
        name: "RulePriority".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) if (1..=50000).contains(n) => Ok(()),
            Value::Int(n) => Err(format!("Invalid rule priority {}: must be 1-50000", n)),
            _ => Err("Expected integer".to_string()),
        },
    }
}

pub fn load_balancer_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ElasticLoadBalancingV2::LoadBalancer",
        resource_type_name: LOAD_BALANCER,
        schema: ResourceSchema::new(LOAD_BALANCER)
            .with_description("Application, Network, or Gateway Load Balancer")
            .attribute(
                AttributeSchema::new("name", types::elb_name())
                    .with_description("The name of the load balancer.")
                    .with_provider_name("Name"),
            )
            .attribute(
                AttributeSchema::new("scheme", enum_type(&["internet-facing", "internal"]))
                    .with_provider_name("Scheme"),
            )
            .attribute(
                AttributeSchema::new("type", enum_type(&["application", "network", "gateway"]))
                    .with_provider_name("Type"),
            )
            .attribute(
                AttributeSchema::new("subnets", string_list())
                    .with_description("The IDs of the subnets. You must specify subnets from at least two Availability Zones.")
                    .with_provider_name("Subnets"),
            )
            .attribute(
                AttributeSchema::new("security_groups", string_list())
                    .with_provider_name("SecurityGroups"),
            ),
    }
}

pub fn listener_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ElasticLoadBalancingV2::Listener",
        resource_type_name: LISTENER,
        schema: ResourceSchema::new(LISTENER)
            .with_description("Listener for an Application Load Balancer")
            .attribute(
                AttributeSchema::new("load_balancer_arn", AttributeType::String)
                    .required()
                    .with_provider_name("LoadBalancerArn"),
            )
            .attribute(
                AttributeSchema::new("port", types::port())
                    .required()
                    .with_provider_name("Port"),
            )
            .attribute(
                AttributeSchema::new("protocol", enum_type(PROTOCOLS)).with_provider_name("Protocol"),
            )
            .attribute(
                AttributeSchema::new("default_actions", document_list())
                    .required()
                    .with_description("The actions for the default rule.")
                    .with_provider_name("DefaultActions"),
            ),
    }
}

pub fn target_group_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ElasticLoadBalancingV2::TargetGroup",
        resource_type_name: TARGET_GROUP,
        schema: ResourceSchema::new(TARGET_GROUP)
            .with_description("Target group routing requests to registered targets")
            .attribute(AttributeSchema::new("name", types::elb_name()).with_provider_name("Name"))
            .attribute(AttributeSchema::new("port", types::port()).with_provider_name("Port"))
            .attribute(
                AttributeSchema::new("protocol", enum_type(PROTOCOLS)).with_provider_name("Protocol"),
            )
            .attribute(
                AttributeSchema::new("target_type", enum_type(&["instance", "ip", "lambda", "alb"]))
                    .with_description("The type of target that you must specify when registering targets with this target group.")
                    .with_provider_name("TargetType"),
            )
            .attribute(
                AttributeSchema::new("vpc_id", AttributeType::String).with_provider_name("VpcId"),
            )
            .attribute(
                AttributeSchema::new("health_check_path", AttributeType::String)
                    .with_provider_name("HealthCheckPath"),
            )
            .attribute(
                AttributeSchema::new("health_check_timeout_seconds", types::positive_int())
                    .with_provider_name("HealthCheckTimeoutSeconds"),
            )
            .attribute(
                AttributeSchema::new("health_check_interval_seconds", types::positive_int())
                    .with_provider_name("HealthCheckIntervalSeconds"),
            )
            .attribute(
                AttributeSchema::new("matcher", AttributeType::Document)
                    .with_description("The HTTP codes to use when checking for a successful response from a target.")
                    .with_provider_name("Matcher"),
            ),
    }
}

pub fn listener_rule_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ElasticLoadBalancingV2::ListenerRule",
        resource_type_name: LISTENER_RULE,
        schema: ResourceSchema::new(LISTENER_RULE)
            .with_description("Listener rule evaluated in priority order")
            .attribute(
                AttributeSchema::new("listener_arn", AttributeType::String)
                    .required()
                    .with_provider_name("ListenerArn"),
            )
            .attribute(
                AttributeSchema::new("priority", rule_priority())
                    .required()
                    .with_description("The rule priority. A listener can't have multiple rules with the same priority.")
                    .with_provider_name("Priority"),
            )
            .attribute(
                AttributeSchema::new("conditions", document_list())
                    .required()
                    .with_provider_name("Conditions"),
            )
            .attribute(
                AttributeSchema::new("actions", document_list())
                    .required()
                    .with_provider_name("Actions"),
            ),
    }
}
