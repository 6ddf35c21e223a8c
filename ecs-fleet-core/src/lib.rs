//! ECS Fleet Core
//!
//! Declares an ECS Fargate service fleet behind an Application Load Balancer
//! as a resource graph that a provisioning engine can apply.

pub mod components;
pub mod config;
pub mod network;
pub mod parameter;
pub mod provisioner;
pub mod resource;
pub mod schema;
pub mod stack;

pub use config::{ConfigError, FleetConfig, ServiceDescriptor};
pub use parameter::{ParameterError, ParameterStore, StaticParameterStore};
pub use provisioner::{FleetError, FleetStack, ServiceFleetProvisioner};
pub use stack::{Stack, StackError};
