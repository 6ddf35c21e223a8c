//! Stack - The declared resource graph
//!
//! A Stack is an insertion-ordered set of resources keyed by logical id.
//! Nothing is provisioned from here; the graph is handed to the provisioning
//! engine as a template.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::resource::{Resource, ResourceId, Value};

/// Errors raised while assembling a stack
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("Duplicate resource '{logical_id}' ({existing} and {new})")]
    DuplicateResource {
        logical_id: String,
        existing: String,
        new: String,
    },

    #[error("{from} references unknown resource '{target}'")]
    DanglingReference { from: ResourceId, target: String },
}

/// Value exported from the stack once it is applied
#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub name: String,
    pub description: Option<String>,
    pub value: Value,
}

/// Declared resource graph
#[derive(Debug, Clone, Default)]
pub struct Stack {
    pub description: Option<String>,
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
    outputs: Vec<StackOutput>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, rejecting a logical id that is already taken
    pub fn add(&mut self, resource: Resource) -> Result<(), StackError> {
        if let Some(&existing) = self.index.get(&resource.id.name) {
            return Err(StackError::DuplicateResource {
                logical_id: resource.id.name.clone(),
                existing: self.resources[existing].id.to_string(),
                new: resource.id.to_string(),
            });
        }
        log::debug!("Declared {}", resource.id);
        self.index
            .insert(resource.id.name.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    pub fn add_output(
        &mut self,
        name: impl Into<String>,
        value: Value,
        description: Option<&str>,
    ) {
        self.outputs.push(StackOutput {
            name: name.into(),
            description: description.map(str::to_string),
            value,
        });
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.index.get(logical_id).map(|&i| &self.resources[i])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Fail on references to logical ids that are not part of the stack
    pub fn validate_references(&self) -> Result<(), Vec<StackError>> {
        let mut errors = Vec::new();
        for resource in &self.resources {
            for target in resource.dependencies() {
                if !self.index.contains_key(&target) {
                    errors.push(StackError::DanglingReference {
                        from: resource.id.clone(),
                        target,
                    });
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Physical names used by more than one resource of the same type
    ///
    /// Returns `(resource_type, physical_name)` pairs.
    pub fn physical_name_collisions(&self, name_attribute: &str) -> Vec<(String, String)> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut collisions = Vec::new();
        for resource in &self.resources {
            if let Some(Value::String(name)) = resource.get(name_attribute) {
                let key = (resource.id.resource_type.clone(), name.clone());
                if !seen.insert(key.clone()) && !collisions.contains(&key) {
                    collisions.push(key);
                }
            }
        }
        collisions
    }

    /// Sort resources topologically, dependencies first
    ///
    /// Declaration order is kept wherever dependencies allow it. Cycles are
    /// broken at the revisit rather than rejected.
    pub fn sorted(&self) -> Vec<&Resource> {
        let mut sorted = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut visiting: HashSet<&str> = HashSet::new();

        fn visit<'a>(
            resource: &'a Resource,
            stack: &'a Stack,
            visited: &mut HashSet<&'a str>,
            visiting: &mut HashSet<&'a str>,
            sorted: &mut Vec<&'a Resource>,
        ) {
            let name = resource.id.name.as_str();
            if visited.contains(name) || visiting.contains(name) {
                return;
            }

            visiting.insert(name);
            for dep in resource.dependencies() {
                if let Some(dep_resource) = stack.get(&dep) {
                    visit(dep_resource, stack, visited, visiting, sorted);
                }
            }
            visiting.remove(name);
            visited.insert(name);
            sorted.push(resource);
        }

        for resource in &self.resources {
            visit(resource, self, &mut visited, &mut visiting, &mut sorted);
        }

        sorted
    }

    /// Group resource indices by fleet member
    pub fn group_by_service(&self) -> BTreeMap<ResourceGroup, Vec<usize>> {
        let mut groups: BTreeMap<ResourceGroup, Vec<usize>> = BTreeMap::new();
        for (idx, resource) in self.resources.iter().enumerate() {
            let group = match resource.service() {
                Some(name) => ResourceGroup::Service(name.to_string()),
                None => ResourceGroup::Shared,
            };
            groups.entry(group).or_default().push(idx);
        }
        groups
    }

    /// Distinct parameter-store keys referenced anywhere in the stack
    pub fn parameter_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for resource in &self.resources {
            for value in resource.attributes.values() {
                value.collect_parameters(&mut keys);
            }
        }
        for output in &self.outputs {
            output.value.collect_parameters(&mut keys);
        }
        keys.sort();
        keys.dedup();
        keys
    }

    /// Generate a summary of the stack for display
    pub fn summary(&self) -> StackSummary {
        let mut summary = StackSummary::default();
        for resource in &self.resources {
            *summary
                .by_type
                .entry(resource.id.resource_type.clone())
                .or_default() += 1;
        }
        summary.total = self.resources.len();
        summary
    }
}

/// Resources declared for one fleet member, or shared by all of them
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceGroup {
    Shared,
    Service(String),
}

#[derive(Debug, Default)]
pub struct StackSummary {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl std::fmt::Display for StackSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types: Vec<String> = self
            .by_type
            .iter()
            .map(|(t, n)| format!("{} {}", n, t))
            .collect();
        write!(f, "Stack: {} resources ({})", self.total, types.join(", "))
    }
}
