//! ECS task definition and service schemas

use ecs_fleet_core::components::service::SERVICE;
use ecs_fleet_core::components::task::TASK_DEFINITION;
use ecs_fleet_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{AwsccSchemaConfig, document_list, enum_type};

const LAUNCH_TYPES: &[&str] = &["EC2", "FARGATE", "EXTERNAL"];

pub fn task_definition_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ECS::TaskDefinition",
        resource_type_name: TASK_DEFINITION,
        schema: ResourceSchema::new(TASK_DEFINITION)
            .with_description("Blueprint describing the containers of a task")
            .attribute(
                AttributeSchema::new("family", AttributeType::String)
                    .with_description("The name of a family that this task definition is registered to.")
                    .with_provider_name("Family"),
            )
            .attribute(
                AttributeSchema::new("cpu", AttributeType::String)
                    .with_description("The number of cpu units used by the task.")
                    .with_provider_name("Cpu"),
            )
            .attribute(
                AttributeSchema::new("memory", AttributeType::String)
                    .with_description("The amount (in MiB) of memory used by the task.")
                    .with_provider_name("Memory"),
            )
            .attribute(
                AttributeSchema::new(
                    "network_mode",
                    enum_type(&["bridge", "host", "awsvpc", "none"]),
                )
                .with_provider_name("NetworkMode"),
            )
            .attribute(
                AttributeSchema::new(
                    "requires_compatibilities",
                    AttributeType::List(Box::new(enum_type(LAUNCH_TYPES))),
                )
                .with_provider_name("RequiresCompatibilities"),
            )
            .attribute(
                AttributeSchema::new("task_role_arn", AttributeType::String)
                    .with_provider_name("TaskRoleArn"),
            )
            .attribute(
                AttributeSchema::new("execution_role_arn", AttributeType::String)
                    .with_provider_name("ExecutionRoleArn"),
            )
            .attribute(
                AttributeSchema::new("container_definitions", document_list())
                    .with_description("A list of container definitions in JSON format that describe the different containers that make up your task.")
                    .with_provider_name("ContainerDefinitions"),
            ),
    }
}

pub fn service_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::ECS::Service",
        resource_type_name: SERVICE,
        schema: ResourceSchema::new(SERVICE)
            .with_description("Long-running set of tasks kept at a desired count")
            .attribute(
                AttributeSchema::new("service_name", AttributeType::String)
                    .with_provider_name("ServiceName"),
            )
            .attribute(
                AttributeSchema::new("cluster", AttributeType::String)
                    .with_description("The short name or full Amazon Resource Name (ARN) of the cluster on which to run your service.")
                    .with_provider_name("Cluster"),
            )
            .attribute(
                AttributeSchema::new("task_definition", AttributeType::String)
                    .with_provider_name("TaskDefinition"),
            )
            .attribute(
                AttributeSchema::new("desired_count", types::non_negative_int())
                    .with_provider_name("DesiredCount"),
            )
            .attribute(
                AttributeSchema::new("launch_type", enum_type(LAUNCH_TYPES))
                    .with_provider_name("LaunchType"),
            )
            .attribute(
                AttributeSchema::new("health_check_grace_period_seconds", types::non_negative_int())
                    .with_provider_name("HealthCheckGracePeriodSeconds"),
            )
            .attribute(
                AttributeSchema::new("deployment_controller", AttributeType::Document)
                    .with_provider_name("DeploymentController"),
            )
            .attribute(
                AttributeSchema::new("deployment_configuration", AttributeType::Document)
                    .with_provider_name("DeploymentConfiguration"),
            )
            .attribute(
                AttributeSchema::new("network_configuration", AttributeType::Document)
                    .with_provider_name("NetworkConfiguration"),
            )
            .attribute(
                AttributeSchema::new("load_balancers", document_list())
                    .with_description("A list of load balancer objects to associate with the service.")
                    .with_provider_name("LoadBalancers"),
            ),
    }
}
