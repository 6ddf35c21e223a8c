//! Security groups and the rules connecting them

use crate::resource::{Resource, Value};

pub const SECURITY_GROUP: &str = "ec2_security_group";
pub const SECURITY_GROUP_INGRESS: &str = "ec2_security_group_ingress";
pub const SECURITY_GROUP_EGRESS: &str = "ec2_security_group_egress";

pub const ANY_IPV4: &str = "0.0.0.0/0";

/// Inline rule admitting traffic from a CIDR range
#[derive(Debug, Clone, PartialEq)]
pub struct CidrIngress {
    pub cidr: String,
    pub port: u16,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityGroup {
    pub logical_id: String,
    pub description: String,
    pub vpc_id: Value,
    pub allow_all_outbound: bool,
    pub ingress: Vec<CidrIngress>,
    pub service: Option<String>,
}

impl SecurityGroup {
    pub fn new(logical_id: impl Into<String>, description: impl Into<String>, vpc_id: Value) -> Self {
        Self {
            logical_id: logical_id.into(),
            description: description.into(),
            vpc_id,
            allow_all_outbound: true,
            ingress: Vec::new(),
            service: None,
        }
    }

    pub fn with_allow_all_outbound(mut self, allow: bool) -> Self {
        self.allow_all_outbound = allow;
        self
    }

    pub fn with_ingress_from_cidr(mut self, cidr: &str, port: u16) -> Self {
        let description = if cidr == ANY_IPV4 {
            format!("Allow from anyone on port {}", port)
        } else {
            format!("Allow from {} on port {}", cidr, port)
        };
        self.ingress.push(CidrIngress {
            cidr: cidr.to_string(),
            port,
            description,
        });
        self
    }

    pub fn for_service(mut self, service_name: &str) -> Self {
        self.service = Some(service_name.to_string());
        self
    }

    /// `GroupId` of this security group
    pub fn group_id(&self) -> Value {
        Value::ResourceRef(self.logical_id.clone(), "GroupId".to_string())
    }

    fn egress_rules(&self) -> Value {
        if self.allow_all_outbound {
            Value::List(vec![Value::map([
                ("cidr_ip", Value::string(ANY_IPV4)),
                ("description", Value::string("Allow all outbound traffic by default")),
                ("ip_protocol", Value::string("-1")),
            ])])
        } else {
            // A group without egress rules allows everything, so block with an
            // unroutable ICMP rule until explicit egress rules are attached
            Value::List(vec![Value::map([
                ("cidr_ip", Value::string("255.255.255.255/32")),
                ("description", Value::string("Disallow all traffic")),
                ("from_port", Value::Int(252)),
                ("ip_protocol", Value::string("icmp")),
                ("to_port", Value::Int(86)),
            ])])
        }
    }

    pub fn to_resource(&self) -> Resource {
        let mut resource = Resource::new(SECURITY_GROUP, &self.logical_id)
            .with_attribute("group_description", self.description.as_str())
            .with_attribute("vpc_id", self.vpc_id.clone())
            .with_attribute("security_group_egress", self.egress_rules());

        if !self.ingress.is_empty() {
            let rules = self
                .ingress
                .iter()
                .map(|rule| {
                    Value::map([
                        ("cidr_ip", Value::string(&rule.cidr)),
                        ("description", Value::string(&rule.description)),
                        ("from_port", Value::Int(rule.port.into())),
                        ("ip_protocol", Value::string("tcp")),
                        ("to_port", Value::Int(rule.port.into())),
                    ])
                })
                .collect();
            resource = resource.with_attribute("security_group_ingress", Value::List(rules));
        }

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ingress,
    Egress,
}

/// Standalone TCP rule between two security groups
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityGroupRule {
    pub logical_id: String,
    pub direction: Direction,
    /// Logical id of the group the rule is attached to
    pub group: String,
    /// Logical id of the group on the other side
    pub peer: String,
    pub port: u16,
    pub description: String,
    pub service: Option<String>,
}

impl SecurityGroupRule {
    pub fn to_resource(&self) -> Resource {
        let group_id = Value::ResourceRef(self.group.clone(), "GroupId".to_string());
        let peer_id = Value::ResourceRef(self.peer.clone(), "GroupId".to_string());

        let resource = match self.direction {
            Direction::Ingress => Resource::new(SECURITY_GROUP_INGRESS, &self.logical_id)
                .with_attribute("source_security_group_id", peer_id),
            Direction::Egress => Resource::new(SECURITY_GROUP_EGRESS, &self.logical_id)
                .with_attribute("destination_security_group_id", peer_id),
        }
        .with_attribute("group_id", group_id)
        .with_attribute("ip_protocol", "tcp")
        .with_attribute("from_port", Value::Int(self.port.into()))
        .with_attribute("to_port", Value::Int(self.port.into()))
        .with_attribute("description", self.description.as_str());

        match &self.service {
            Some(name) => resource.for_service(name),
            None => resource,
        }
    }
}

/// Rules letting `source` reach `target` on a TCP port
///
/// Yields the ingress rule on `target` and the matching egress rule on
/// `source`, named `<prefix>Ingress<port>` and `<prefix>Egress<port>`.
pub fn allow_from(
    prefix: &str,
    source: &str,
    target: &str,
    port: u16,
    service: Option<&str>,
) -> [SecurityGroupRule; 2] {
    let description = format!("Load balancer to target on port {}", port);
    [
        SecurityGroupRule {
            logical_id: format!("{}Ingress{}", prefix, port),
            direction: Direction::Ingress,
            group: target.to_string(),
            peer: source.to_string(),
            port,
            description: description.clone(),
            service: service.map(str::to_string),
        },
        SecurityGroupRule {
            logical_id: format!("{}Egress{}", prefix, port),
            direction: Direction::Egress,
            group: source.to_string(),
            peer: target.to_string(),
            port,
            description,
            service: service.map(str::to_string),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissive_group_allows_all_outbound() {
        let sg = SecurityGroup::new("Compute", "Security Group for Fargate", Value::string("vpc-1"));
        let resource = sg.to_resource();
        let egress = resource.get("security_group_egress").unwrap().as_list().unwrap();
        assert_eq!(egress.len(), 1);
        assert_eq!(egress[0].as_map().unwrap()["ip_protocol"], Value::string("-1"));
        assert!(resource.get("security_group_ingress").is_none());
    }

    #[test]
    fn restricted_group_blocks_outbound() {
        let sg = SecurityGroup::new("Alb", "ALB", Value::string("vpc-1"))
            .with_allow_all_outbound(false)
            .with_ingress_from_cidr(ANY_IPV4, 80);
        let resource = sg.to_resource();
        let egress = resource.get("security_group_egress").unwrap().as_list().unwrap();
        assert_eq!(egress[0].as_map().unwrap()["cidr_ip"], Value::string("255.255.255.255/32"));

        let ingress = resource.get("security_group_ingress").unwrap().as_list().unwrap();
        let rule = ingress[0].as_map().unwrap();
        assert_eq!(rule["from_port"], Value::Int(80));
        assert_eq!(rule["description"], Value::string("Allow from anyone on port 80"));
    }

    #[test]
    fn allow_from_pairs_ingress_and_egress() {
        let [ingress, egress] = allow_from("ServiceApi", "AlbSg", "ServiceSgApi", 8080, Some("api"));

        let ingress = ingress.to_resource();
        assert_eq!(ingress.id.resource_type, SECURITY_GROUP_INGRESS);
        assert_eq!(ingress.id.name, "ServiceApiIngress8080");
        assert_eq!(
            ingress.get("group_id"),
            Some(&Value::ResourceRef("ServiceSgApi".into(), "GroupId".into()))
        );
        assert_eq!(
            ingress.get("source_security_group_id"),
            Some(&Value::ResourceRef("AlbSg".into(), "GroupId".into()))
        );
        assert_eq!(ingress.service(), Some("api"));

        let egress = egress.to_resource();
        assert_eq!(egress.id.resource_type, SECURITY_GROUP_EGRESS);
        assert_eq!(
            egress.get("destination_security_group_id"),
            Some(&Value::ResourceRef("ServiceSgApi".into(), "GroupId".into()))
        );
    }
}
