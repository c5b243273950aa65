//! DynamoDB table declaration.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::construct::{self, RESOURCE};
use crate::error::{ConstructError, Result};
use crate::intrinsics;
use crate::template::Resource;

/// DynamoDB scalar attribute types usable as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
    Binary,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "S",
            AttributeType::Number => "N",
            AttributeType::Binary => "B",
        }
    }
}

impl FromStr for AttributeType {
    type Err = ConstructError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "S" | "s" | "string" => Ok(AttributeType::String),
            "N" | "n" | "number" => Ok(AttributeType::Number),
            "B" | "b" | "binary" => Ok(AttributeType::Binary),
            other => Err(ConstructError::InvalidAttributeType(other.to_string())),
        }
    }
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    /// A string-typed key attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: AttributeType::String,
        }
    }
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    Provisioned {
        read_capacity: u32,
        write_capacity: u32,
    },
    PayPerRequest,
}

impl Default for BillingMode {
    fn default() -> Self {
        BillingMode::Provisioned {
            read_capacity: 5,
            write_capacity: 5,
        }
    }
}

/// What happens to a resource, and its data, when the stack is torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemovalPolicy {
    /// Keep the resource (and its data) in the account.
    #[default]
    Retain,
    /// Delete the resource, even if it still holds data.
    Destroy,
}

impl RemovalPolicy {
    /// The `DeletionPolicy` value written to the template.
    pub fn cfn_value(&self) -> &'static str {
        match self {
            RemovalPolicy::Retain => "Retain",
            RemovalPolicy::Destroy => "Delete",
        }
    }
}

impl FromStr for RemovalPolicy {
    type Err = ConstructError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "retain" => Ok(RemovalPolicy::Retain),
            "destroy" | "delete" => Ok(RemovalPolicy::Destroy),
            _ => Err(ConstructError::InvalidRemovalPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalPolicy::Retain => write!(f, "retain"),
            RemovalPolicy::Destroy => write!(f, "destroy"),
        }
    }
}

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub id: String,
    /// Physical table name. Generated by CloudFormation when `None`.
    pub table_name: Option<String>,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
    pub removal_policy: RemovalPolicy,
}

impl TableConfig {
    pub fn new(id: impl Into<String>, partition_key: KeyAttribute) -> Self {
        Self {
            id: id.into(),
            table_name: None,
            partition_key,
            billing_mode: BillingMode::default(),
            removal_policy: RemovalPolicy::default(),
        }
    }

    /// Sets the physical table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = Some(name.to_string());
        self
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    pub fn with_billing_mode(mut self, mode: BillingMode) -> Self {
        self.billing_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        construct::validate_id(&self.id)?;
        if self.partition_key.name.trim().is_empty() {
            return Err(ConstructError::EmptyKeyName);
        }
        Ok(())
    }

    pub fn logical_id(&self) -> String {
        construct::logical_id(&[&self.id, RESOURCE])
    }

    /// A handle other constructs use to reference this table.
    pub fn reference(&self) -> TableRef {
        TableRef {
            id: self.id.clone(),
            logical_id: self.logical_id(),
            partition_key: self.partition_key.name.clone(),
        }
    }

    /// Renders the `AWS::DynamoDB::Table` resource.
    pub fn to_resource(&self) -> Resource {
        let key = &self.partition_key;
        let key_schema = json!([{ "AttributeName": key.name, "KeyType": "HASH" }]);
        let attribute_definitions = json!([{
            "AttributeName": key.name,
            "AttributeType": key.attribute_type.as_str(),
        }]);
        let mut resource = Resource::new("AWS::DynamoDB::Table")
            .with_property("KeySchema", key_schema)
            .with_property("AttributeDefinitions", attribute_definitions)
            .with_removal(self.removal_policy.cfn_value());

        resource = match self.billing_mode {
            BillingMode::Provisioned {
                read_capacity,
                write_capacity,
            } => {
                let throughput = json!({
                    "ReadCapacityUnits": read_capacity,
                    "WriteCapacityUnits": write_capacity,
                });
                resource.with_property("ProvisionedThroughput", throughput)
            }
            BillingMode::PayPerRequest => {
                resource.with_property("BillingMode", json!("PAY_PER_REQUEST"))
            }
        };

        if let Some(name) = &self.table_name {
            resource = resource.with_property("TableName", json!(name));
        }

        resource
    }
}

/// Reference to a table declared in a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub id: String,
    pub logical_id: String,
    pub partition_key: String,
}

impl TableRef {
    /// The table name, resolved at deploy time.
    pub fn table_name(&self) -> Value {
        intrinsics::reference(&self.logical_id)
    }

    pub fn table_arn(&self) -> Value {
        intrinsics::get_att(&self.logical_id, "Arn")
    }
}
