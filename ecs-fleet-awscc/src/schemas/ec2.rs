//! Security group schemas
//!
//! Based on CloudFormation AWS::EC2::SecurityGroup, AWS::EC2::SecurityGroupIngress
//! and AWS::EC2::SecurityGroupEgress.

use ecs_fleet_core::components::security::{
    SECURITY_GROUP, SECURITY_GROUP_EGRESS, SECURITY_GROUP_INGRESS,
};
use ecs_fleet_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{AwsccSchemaConfig, document_list, enum_type};

const IP_PROTOCOLS: &[&str] = &["tcp", "udp", "icmp", "icmpv6", "-1"];

pub fn security_group_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::SecurityGroup",
        resource_type_name: SECURITY_GROUP,
        schema: ResourceSchema::new(SECURITY_GROUP)
            .with_description("Security group in a VPC")
            .attribute(
                AttributeSchema::new("group_description", AttributeType::String)
                    .required()
                    .with_description("A description for the security group.")
                    .with_provider_name("GroupDescription"),
            )
            .attribute(
                AttributeSchema::new("vpc_id", AttributeType::String)
                    .required()
                    .with_provider_name("VpcId"),
            )
            .attribute(
                AttributeSchema::new("security_group_egress", document_list())
                    .with_description("[VPC only] The outbound rules associated with the security group.")
                    .with_provider_name("SecurityGroupEgress"),
            )
            .attribute(
                AttributeSchema::new("security_group_ingress", document_list())
                    .with_description("The inbound rules associated with the security group.")
                    .with_provider_name("SecurityGroupIngress"),
            ),
    }
}

/// Common attributes of standalone ingress/egress rules
fn rule_schema(resource_type: &str, peer_attribute: &str, peer_provider_name: &str) -> ResourceSchema {
    ResourceSchema::new(resource_type)
        .attribute(
            AttributeSchema::new("group_id", AttributeType::String)
                .required()
                .with_provider_name("GroupId"),
        )
        .attribute(
            AttributeSchema::new("ip_protocol", enum_type(IP_PROTOCOLS))
                .required()
                .with_provider_name("IpProtocol"),
        )
        .attribute(
            AttributeSchema::new("from_port", types::port()).with_provider_name("FromPort"),
        )
        .attribute(AttributeSchema::new("to_port", types::port()).with_provider_name("ToPort"))
        .attribute(
            AttributeSchema::new("description", AttributeType::String)
                .with_provider_name("Description"),
        )
        .attribute(AttributeSchema::new("cidr_ip", types::cidr()).with_provider_name("CidrIp"))
        .attribute(
            AttributeSchema::new(peer_attribute, AttributeType::String)
                .with_provider_name(peer_provider_name),
        )
}

pub fn security_group_ingress_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::SecurityGroupIngress",
        resource_type_name: SECURITY_GROUP_INGRESS,
        schema: rule_schema(
            SECURITY_GROUP_INGRESS,
            "source_security_group_id",
            "SourceSecurityGroupId",
        )
        .with_description("Inbound rule attached to a security group"),
    }
}

pub fn security_group_egress_config() -> AwsccSchemaConfig {
    AwsccSchemaConfig {
        aws_type_name: "AWS::EC2::SecurityGroupEgress",
        resource_type_name: SECURITY_GROUP_EGRESS,
        schema: rule_schema(
            SECURITY_GROUP_EGRESS,
            "destination_security_group_id",
            "DestinationSecurityGroupId",
        )
        .with_description("Outbound rule attached to a security group"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecs_fleet_core::components::security::allow_from;
    use ecs_fleet_core::resource::Value;

    #[test]
    fn generated_rules_validate() {
        let [ingress, egress] = allow_from("ServiceApi", "AlbSg", "ApiSg", 8080, Some("api"));
        let ingress = ingress.to_resource();
        let egress = egress.to_resource();

        assert!(security_group_ingress_config().schema.validate(&ingress.attributes).is_ok());
        assert!(security_group_egress_config().schema.validate(&egress.attributes).is_ok());
    }

    #[test]
    fn egress_peer_is_not_an_ingress_attribute() {
        let egress = allow_from("ServiceApi", "AlbSg", "ApiSg", 80, None)[1].to_resource();
        let errors = security_group_ingress_config()
            .schema
            .validate(&egress.attributes)
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("destination_security_group_id"));
    }

    #[test]
    fn group_requires_description() {
        let attributes = [("vpc_id".to_string(), Value::string("vpc-1"))].into();
        let errors = security_group_config().schema.validate(&attributes).unwrap_err();
        assert!(errors[0].to_string().contains("group_description"));
    }
}
