//! Shared network and cluster identifiers
//!
//! Both are published by other stacks under fixed parameter-store keys.
//! A context is either deferred (every field is a `Value::Parameter` resolved
//! by the provisioning engine at apply time) or resolved up front through a
//! `ParameterStore`.

use std::collections::HashMap;

use crate::parameter::{ParameterResult, ParameterStore};
use crate::resource::Value;

pub const VPC_ID_KEY: &str = "/network/vpc_id";
pub const AZ1_KEY: &str = "/network/az1";
pub const AZ2_KEY: &str = "/network/az2";
pub const PUBLIC_SUBNET1_KEY: &str = "/network/pubsub1";
pub const PUBLIC_SUBNET2_KEY: &str = "/network/pubsub2";
pub const PRIVATE_SUBNET1_KEY: &str = "/network/prisub1";
pub const PRIVATE_SUBNET2_KEY: &str = "/network/prisub2";
pub const CLUSTER_ARN_KEY: &str = "/ecs/clusterarn";

/// Every parameter-store key a fleet depends on, in lookup order
pub const REQUIRED_KEYS: [&str; 8] = [
    VPC_ID_KEY,
    AZ1_KEY,
    AZ2_KEY,
    PUBLIC_SUBNET1_KEY,
    PUBLIC_SUBNET2_KEY,
    PRIVATE_SUBNET1_KEY,
    PRIVATE_SUBNET2_KEY,
    CLUSTER_ARN_KEY,
];

/// VPC layout the fleet is placed into
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkContext {
    pub vpc_id: Value,
    pub availability_zones: [Value; 2],
    pub public_subnets: [Value; 2],
    pub private_subnets: [Value; 2],
}

impl NetworkContext {
    /// Context whose values are looked up by the provisioning engine
    pub fn deferred() -> Self {
        Self::from_lookup(|key| Value::Parameter(key.to_string()))
    }

    /// Context built from already-resolved values
    ///
    /// Keys absent from `values` stay deferred.
    pub fn from_values(values: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| match values.get(key) {
            Some(v) => Value::String(v.clone()),
            None => Value::Parameter(key.to_string()),
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Value) -> Self {
        Self {
            vpc_id: lookup(VPC_ID_KEY),
            availability_zones: [lookup(AZ1_KEY), lookup(AZ2_KEY)],
            public_subnets: [lookup(PUBLIC_SUBNET1_KEY), lookup(PUBLIC_SUBNET2_KEY)],
            private_subnets: [lookup(PRIVATE_SUBNET1_KEY), lookup(PRIVATE_SUBNET2_KEY)],
        }
    }

    pub fn public_subnet_list(&self) -> Value {
        Value::List(self.public_subnets.to_vec())
    }

    pub fn private_subnet_list(&self) -> Value {
        Value::List(self.private_subnets.to_vec())
    }
}

/// Existing ECS cluster the services run in
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReference {
    pub cluster_arn: Value,
    /// Derived name, `cluster-<appName>`
    pub cluster_name: String,
    /// Logical id of the shared compute security group
    pub security_group: String,
}

impl ClusterReference {
    pub fn new(app_name: &str, cluster_arn: Value, security_group: impl Into<String>) -> Self {
        Self {
            cluster_arn,
            cluster_name: format!("cluster-{}", app_name),
            security_group: security_group.into(),
        }
    }
}

/// Resolve every required key through `store`
///
/// Fails with all missing keys at once.
pub async fn resolve_shared_parameters(
    store: &dyn ParameterStore,
) -> ParameterResult<HashMap<String, String>> {
    let keys: Vec<String> = REQUIRED_KEYS.iter().map(|k| k.to_string()).collect();
    log::info!(
        "Resolving {} shared parameter(s) from '{}' store",
        keys.len(),
        store.name()
    );
    store.get_all(&keys).await
}
