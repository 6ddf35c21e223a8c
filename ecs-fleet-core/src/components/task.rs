//! Fargate task definitions and their containers

use crate::components::logs::LogDriver;
use crate::resource::{Resource, Value};

pub const TASK_DEFINITION: &str = "ecs_task_definition";

/// TCP port exposed by a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub container_port: u16,
}

impl PortMapping {
    pub fn tcp(container_port: u16) -> Self {
        Self { container_port }
    }

    pub fn to_value(&self) -> Value {
        Value::map([
            ("container_port", Value::Int(self.container_port.into())),
            ("protocol", Value::string("tcp")),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDefinition {
    pub name: String,
    /// Image pulled from a registry, e.g. `repo/img:tag`
    pub image: String,
    pub cpu: u32,
    pub memory_mib: u32,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub logging: Option<LogDriver>,
}

impl ContainerDefinition {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            cpu: 256,
            memory_mib: 256,
            essential: true,
            port_mappings: Vec::new(),
            logging: None,
        }
    }

    pub fn add_port_mapping(&mut self, mapping: PortMapping) {
        self.port_mappings.push(mapping);
    }

    pub fn to_value(&self) -> Value {
        let mut entries = vec![
            ("name", Value::string(&self.name)),
            ("image", Value::string(&self.image)),
            ("cpu", Value::Int(self.cpu.into())),
            ("memory", Value::Int(self.memory_mib.into())),
            ("essential", Value::Bool(self.essential)),
        ];
        if !self.port_mappings.is_empty() {
            entries.push((
                "port_mappings",
                Value::List(self.port_mappings.iter().map(PortMapping::to_value).collect()),
            ));
        }
        if let Some(logging) = &self.logging {
            entries.push(("log_configuration", logging.to_value()));
        }
        Value::map(entries)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub logical_id: String,
    pub family: String,
    /// Task-level CPU units
    pub cpu: u32,
    /// Task-level memory in MiB
    pub memory_mib: u32,
    /// Logical id of the role the containers run as
    pub task_role: String,
    /// Logical id of the role the agent uses to pull images and ship logs
    pub execution_role: String,
    pub containers: Vec<ContainerDefinition>,
    pub service: Option<String>,
}

impl TaskDefinition {
    /// Fargate task with the platform's smallest size (256 CPU units, 512 MiB)
    pub fn fargate(
        logical_id: impl Into<String>,
        family: impl Into<String>,
        task_role: impl Into<String>,
        execution_role: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            family: family.into(),
            cpu: 256,
            memory_mib: 512,
            task_role: task_role.into(),
            execution_role: execution_role.into(),
            containers: Vec::new(),
            service: None,
        }
    }

    pub fn add_container(&mut self, container: ContainerDefinition) {
        self.containers.push(container);
    }

    pub fn to_resource(&self) -> Resource {
        let resource = Resource::new(TASK_DEFINITION, &self.logical_id)
            .with_attribute("family", self.family.as_str())
            .with_attribute("cpu", self.cpu.to_string())
            .with_attribute("memory", self.memory_mib.to_string())
            .with_attribute("network_mode", "awsvpc")
            .with_attribute("requires_compatibilities", Value::strings(["FARGATE"]))
            .with_attribute(
                "task_role_arn",
                Value::ResourceRef(self.task_role.clone(), "Arn".to_string()),
            )
            .with_attribute(
                "execution_role_arn",
                Value::ResourceRef(self.execution_role.clone(), "Arn".to_string()),
            )
            .with_attribute(
                "container_definitions",
                Value::List(
                    self.containers
                        .iter()
                        .map(ContainerDefinition::to_value)
                        .collect(),
                ),
            );

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}
