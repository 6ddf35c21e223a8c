//! CloudFormation template rendering
//!
//! Turns a declared [`Stack`] into a template body. Attribute values map to
//! template values as follows:
//!
//! - `Ref(id)` -> `{"Ref": id}`
//! - `ResourceRef(id, attr)` -> `{"Fn::GetAtt": [id, attr]}`
//! - `Parameter(key)` -> `{"Ref": <parameter>}` where the parameter is of type
//!   `AWS::SSM::Parameter::Value<String>` with `key` as its default

use std::collections::HashMap;

use ecs_fleet_core::resource::{Resource, Value, logical_id_fragment};
use ecs_fleet_core::stack::Stack;
use serde_json::{Map, Number, json};

use crate::case_convert::to_property_name;
use crate::schemas::{AwsccSchemaConfig, configs};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const SSM_PARAMETER_TYPE: &str = "AWS::SSM::Parameter::Value<String>";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Unknown resource type '{resource_type}' for {logical_id}")]
    UnknownResourceType {
        logical_id: String,
        resource_type: String,
    },

    #[error("Schema validation failed:\n  {}", .0.join("\n  "))]
    Validation(Vec<String>),

    #[error("Failed to serialize template: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Renders stacks with the CloudFormation schemas
pub struct TemplateRenderer {
    configs: HashMap<&'static str, AwsccSchemaConfig>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let configs = configs()
            .into_iter()
            .map(|c| (c.resource_type_name, c))
            .collect();
        Self { configs }
    }

    fn config(&self, resource: &Resource) -> Result<&AwsccSchemaConfig, TemplateError> {
        self.configs
            .get(resource.id.resource_type.as_str())
            .ok_or_else(|| TemplateError::UnknownResourceType {
                logical_id: resource.id.name.clone(),
                resource_type: resource.id.resource_type.clone(),
            })
    }

    /// Check every resource against its schema, collecting all errors
    pub fn validate(&self, stack: &Stack) -> Result<(), TemplateError> {
        let mut errors = Vec::new();
        for resource in stack.resources() {
            let config = self.config(resource)?;
            if let Err(type_errors) = config.schema.validate(&resource.attributes) {
                errors.extend(
                    type_errors
                        .into_iter()
                        .map(|e| format!("{}: {}", resource.id, e)),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TemplateError::Validation(errors))
        }
    }

    /// Render the template body
    pub fn render(&self, stack: &Stack) -> Result<serde_json::Value, TemplateError> {
        self.validate(stack)?;

        let parameters = ParameterNames::for_keys(&stack.parameter_keys());

        let mut resources = Map::new();
        for resource in stack.resources() {
            let config = self.config(resource)?;
            resources.insert(
                resource.id.name.clone(),
                self.render_resource(resource, config, &parameters),
            );
        }

        let mut template = Map::new();
        template.insert(
            "AWSTemplateFormatVersion".to_string(),
            json!(TEMPLATE_FORMAT_VERSION),
        );
        if let Some(description) = &stack.description {
            template.insert("Description".to_string(), json!(description));
        }
        if !parameters.is_empty() {
            template.insert("Parameters".to_string(), parameters.to_json());
        }
        template.insert("Resources".to_string(), serde_json::Value::Object(resources));

        if !stack.outputs().is_empty() {
            let mut outputs = Map::new();
            for output in stack.outputs() {
                let mut entry = Map::new();
                if let Some(description) = &output.description {
                    entry.insert("Description".to_string(), json!(description));
                }
                entry.insert("Value".to_string(), render_value(&output.value, &parameters));
                outputs.insert(output.name.clone(), serde_json::Value::Object(entry));
            }
            template.insert("Outputs".to_string(), serde_json::Value::Object(outputs));
        }

        log::debug!(
            "Rendered {} resource(s), {} parameter(s)",
            stack.len(),
            parameters.len()
        );
        Ok(serde_json::Value::Object(template))
    }

    fn render_resource(
        &self,
        resource: &Resource,
        config: &AwsccSchemaConfig,
        parameters: &ParameterNames,
    ) -> serde_json::Value {
        let mut properties = Map::new();
        for (key, value) in &resource.attributes {
            if key.starts_with('_') {
                continue;
            }
            let property = config
                .schema
                .attributes
                .get(key)
                .and_then(|a| a.provider_name.clone())
                .unwrap_or_else(|| to_property_name(key));
            properties.insert(property, render_value(value, parameters));
        }

        let mut body = Map::new();
        body.insert("Type".to_string(), json!(config.aws_type_name));
        body.insert("Properties".to_string(), serde_json::Value::Object(properties));
        if !resource.depends_on.is_empty() {
            let mut depends_on = resource.depends_on.clone();
            depends_on.sort();
            depends_on.dedup();
            body.insert("DependsOn".to_string(), json!(depends_on));
        }
        serde_json::Value::Object(body)
    }
}

/// Template parameter names for parameter-store keys
///
/// "/network/vpc_id" becomes "NetworkVpcId". Keys that collapse to the same
/// name get a numeric suffix.
#[derive(Debug, Default)]
struct ParameterNames {
    names: HashMap<String, String>,
}

impl ParameterNames {
    fn for_keys(keys: &[String]) -> Self {
        let mut names = HashMap::new();
        let mut taken = std::collections::HashSet::new();
        for key in keys {
            let base = match logical_id_fragment(key) {
                fragment if fragment.is_empty() => "Parameter".to_string(),
                fragment => fragment,
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{}{}", base, suffix);
                suffix += 1;
            }
            names.insert(key.clone(), name);
        }
        Self { names }
    }

    fn name(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn to_json(&self) -> serde_json::Value {
        let mut parameters = Map::new();
        for (key, name) in &self.names {
            parameters.insert(
                name.clone(),
                json!({
                    "Type": SSM_PARAMETER_TYPE,
                    "Default": key,
                    "Description": format!("Parameter store key {}", key),
                }),
            );
        }
        serde_json::Value::Object(parameters)
    }
}

fn render_value(value: &Value, parameters: &ParameterNames) -> serde_json::Value {
    match value {
        Value::String(s) => json!(s),
        Value::Int(n) => serde_json::Value::Number(Number::from(*n)),
        Value::Bool(b) => json!(b),
        Value::List(items) => serde_json::Value::Array(
            items.iter().map(|v| render_value(v, parameters)).collect(),
        ),
        Value::Map(map) => {
            let object = map
                .iter()
                .map(|(k, v)| (to_property_name(k), render_value(v, parameters)))
                .collect();
            serde_json::Value::Object(object)
        }
        Value::Ref(name) => json!({ "Ref": name }),
        Value::ResourceRef(name, attribute) => json!({ "Fn::GetAtt": [name, attribute] }),
        Value::Parameter(key) => match parameters.name(key) {
            Some(name) => json!({ "Ref": name }),
            // Unreachable for keys collected from the stack; keep the lookup visible
            None => json!({ "Ref": key }),
        },
    }
}

/// Render a stack with the default schemas
pub fn render_template(stack: &Stack) -> Result<serde_json::Value, TemplateError> {
    TemplateRenderer::new().render(stack)
}

/// Pretty-printed template body
pub fn to_json_string(template: &serde_json::Value) -> Result<String, TemplateError> {
    Ok(serde_json::to_string_pretty(template)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecs_fleet_core::config::{FleetConfig, ServiceDescriptor};
    use ecs_fleet_core::parameter::StaticParameterStore;
    use ecs_fleet_core::network::REQUIRED_KEYS;
    use ecs_fleet_core::provisioner::ServiceFleetProvisioner;

    fn demo_config() -> FleetConfig {
        FleetConfig::new(
            "demo",
            vec![
                ServiceDescriptor::new("api", "repo/img:tag", 8080, 2)
                    .with_host_name("api.example.com"),
                ServiceDescriptor::new("web", "repo/web:1", 80, 1),
            ],
        )
    }

    async fn demo_template() -> serde_json::Value {
        let fleet = ServiceFleetProvisioner::new(demo_config())
            .synthesize()
            .await
            .unwrap();
        render_template(&fleet.stack).unwrap()
    }

    #[tokio::test]
    async fn renders_resource_types_and_properties() {
        let template = demo_template().await;
        let resources = &template["Resources"];

        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(
            resources["TargetGroupApi"]["Type"],
            "AWS::ElasticLoadBalancingV2::TargetGroup"
        );
        assert_eq!(resources["TargetGroupApi"]["Properties"]["Name"], "TG-api");
        assert_eq!(
            resources["TargetGroupApi"]["Properties"]["Matcher"]["HttpCode"],
            "200-499"
        );
        assert_eq!(resources["ServiceApi"]["Properties"]["DesiredCount"], 2);
        assert_eq!(resources["ServiceApi"]["DependsOn"], json!(["ListenerRuleApi"]));
        assert!(resources["ServiceApi"]["Properties"].get("_service").is_none());
    }

    #[tokio::test]
    async fn renders_references() {
        let template = demo_template().await;
        let service = &template["Resources"]["ServiceApi"]["Properties"];

        assert_eq!(service["TaskDefinition"], json!({ "Ref": "TaskDefinitionApi" }));
        assert_eq!(service["Cluster"], json!({ "Ref": "EcsClusterarn" }));
        assert_eq!(
            service["LoadBalancers"][0]["TargetGroupArn"],
            json!({ "Ref": "TargetGroupApi" })
        );
        assert_eq!(
            service["NetworkConfiguration"]["AwsvpcConfiguration"]["SecurityGroups"][0],
            json!({ "Fn::GetAtt": ["SecurityGroupEcsFargate", "GroupId"] })
        );
    }

    #[tokio::test]
    async fn deferred_lookups_become_ssm_parameters() {
        let template = demo_template().await;
        let parameters = template["Parameters"].as_object().unwrap();

        assert_eq!(parameters.len(), 6);
        assert_eq!(parameters["NetworkVpcId"]["Type"], SSM_PARAMETER_TYPE);
        assert_eq!(parameters["NetworkVpcId"]["Default"], "/network/vpc_id");
        assert_eq!(
            template["Resources"]["LoadBalancer"]["Properties"]["Subnets"],
            json!([{ "Ref": "NetworkPubsub1" }, { "Ref": "NetworkPubsub2" }])
        );
    }

    #[tokio::test]
    async fn resolved_stack_has_no_parameters() {
        let store: StaticParameterStore = REQUIRED_KEYS
            .iter()
            .map(|k| (k.to_string(), format!("value-of-{}", k)))
            .collect();
        let fleet = ServiceFleetProvisioner::new(demo_config())
            .with_parameter_store(store)
            .synthesize()
            .await
            .unwrap();
        let template = render_template(&fleet.stack).unwrap();

        assert!(template.get("Parameters").is_none());
        assert_eq!(
            template["Resources"]["TargetGroupApi"]["Properties"]["VpcId"],
            "value-of-/network/vpc_id"
        );
    }

    #[tokio::test]
    async fn nested_keys_are_converted() {
        let template = demo_template().await;
        let resources = &template["Resources"];

        let conditions = &resources["ListenerRuleApi"]["Properties"]["Conditions"];
        assert_eq!(
            conditions,
            &json!([{ "Field": "host-header", "HostHeaderConfig": { "Values": ["api.example.com"] } }])
        );

        let catch_all = &resources["ListenerRuleWeb"]["Properties"];
        assert_eq!(catch_all["Priority"], 2);
        assert_eq!(
            catch_all["Conditions"],
            json!([{ "Field": "path-pattern", "PathPatternConfig": { "Values": ["*"] } }])
        );

        let container = &resources["TaskDefinitionApi"]["Properties"]["ContainerDefinitions"][0];
        let options = &container["LogConfiguration"]["Options"];
        assert_eq!(options["awslogs-stream-prefix"], "logs-demo");
        assert_eq!(options["awslogs-group"], json!({ "Ref": "LogGroup" }));
        assert_eq!(container["PortMappings"][0]["ContainerPort"], 8080);

        let default_action = &resources["Listener"]["Properties"]["DefaultActions"][0];
        assert_eq!(default_action["FixedResponseConfig"]["StatusCode"], "503");
    }

    #[tokio::test]
    async fn output_exposes_load_balancer_dns() {
        let template = demo_template().await;
        assert_eq!(
            template["Outputs"]["LoadBalancerDnsName"]["Value"],
            json!({ "Fn::GetAtt": ["LoadBalancer", "DNSName"] })
        );
    }

    #[test]
    fn unknown_resource_type_is_rejected() {
        let mut stack = Stack::new();
        stack
            .add(Resource::new("s3_bucket", "Bucket").with_attribute("bucket_name", "b"))
            .unwrap();
        match render_template(&stack) {
            Err(TemplateError::UnknownResourceType { resource_type, .. }) => {
                assert_eq!(resource_type, "s3_bucket");
            }
            other => panic!("Expected unknown resource type, got {:?}", other),
        }
    }

    #[test]
    fn schema_errors_are_collected() {
        let mut stack = Stack::new();
        stack
            .add(
                Resource::new("elbv2_target_group", "TargetGroupA")
                    .with_attribute("port", Value::Int(0))
                    .with_attribute("protocol", "FTP"),
            )
            .unwrap();
        match render_template(&stack) {
            Err(TemplateError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn colliding_parameter_names_get_suffixes() {
        let names = ParameterNames::for_keys(&["/a/b_c".to_string(), "/a/b-c".to_string()]);
        assert_eq!(names.name("/a/b_c"), Some("ABC"));
        assert_eq!(names.name("/a/b-c"), Some("ABC2"));
    }
}
