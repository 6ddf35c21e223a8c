//! Resource - Representing declared resources and their attribute values

use std::collections::HashMap;

/// Internal attribute tagging the fleet member a resource was declared for
pub const SERVICE_TAG: &str = "_service";

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource type (e.g., "elbv2_target_group", "ecs_service")
    pub resource_type: String,
    /// Logical id of the resource within the stack (e.g., "TargetGroupApi")
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
    /// Reference to another resource's attribute (logical_id, attribute_name)
    ResourceRef(String, String),
    /// Reference to a resource's primary identifier, or to a pseudo parameter
    /// such as `AWS::Region`
    Ref(String),
    /// Value looked up by key from the parameter store
    Parameter(String),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Build a map value from key/value pairs
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Collect logical ids this value refers to
    pub fn collect_refs(&self, out: &mut Vec<String>) {
        match self {
            Value::ResourceRef(name, _) | Value::Ref(name) => {
                // Pseudo parameters are not resources
                if !name.starts_with("AWS::") {
                    out.push(name.clone());
                }
            }
            Value::List(items) => items.iter().for_each(|v| v.collect_refs(out)),
            Value::Map(map) => map.values().for_each(|v| v.collect_refs(out)),
            _ => {}
        }
    }

    /// Collect parameter-store keys this value looks up
    pub fn collect_parameters(&self, out: &mut Vec<String>) {
        match self {
            Value::Parameter(key) => out.push(key.clone()),
            Value::List(items) => items.iter().for_each(|v| v.collect_parameters(out)),
            Value::Map(map) => map.values().for_each(|v| v.collect_parameters(out)),
            _ => {}
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Declared resource
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: ResourceId,
    pub attributes: HashMap<String, Value>,
    /// Explicit ordering dependencies (logical ids) on top of the ones implied by references
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set an attribute only when a value is present
    pub fn with_optional(self, key: impl Into<String>, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.with_attribute(key, v),
            None => self,
        }
    }

    pub fn with_dependency(mut self, logical_id: impl Into<String>) -> Self {
        self.depends_on.push(logical_id.into());
        self
    }

    /// Tag the resource with the fleet member it belongs to
    pub fn for_service(self, service_name: &str) -> Self {
        self.with_attribute(SERVICE_TAG, service_name)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Fleet member this resource belongs to, `None` for shared resources
    pub fn service(&self) -> Option<&str> {
        self.attributes.get(SERVICE_TAG).and_then(Value::as_str)
    }

    /// Logical ids this resource depends on, explicit and implied
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps = Vec::new();
        for (key, value) in &self.attributes {
            if !key.starts_with('_') {
                value.collect_refs(&mut deps);
            }
        }
        deps.extend(self.depends_on.iter().cloned());
        deps.sort();
        deps.dedup();
        deps
    }
}

/// Convert an arbitrary name into a logical-id fragment
/// e.g., "my-api" -> "MyApi", "orders_v2" -> "OrdersV2"
pub fn logical_id_fragment(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}
