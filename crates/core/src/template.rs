//! The synthesized CloudFormation template.
//!
//! All maps are `BTreeMap`s (and `serde_json`'s default map is sorted too),
//! so serializing the same template always produces the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FORMAT_VERSION: &str = "2010-09-09";

/// A complete CloudFormation template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

/// A single entry of the `Resources` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

/// A template parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,
    pub description: String,
}

/// A template output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    pub fn new(description: Option<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Returns resources of the given type, keyed by logical id.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: Map::new(),
            depends_on: Vec::new(),
            update_replace_policy: None,
            deletion_policy: None,
        }
    }

    /// Sets a property.
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Adds a dependency, keeping the list sorted and unique.
    pub fn with_dependency(mut self, logical_id: impl Into<String>) -> Self {
        let logical_id = logical_id.into();
        if let Err(position) = self.depends_on.binary_search(&logical_id) {
            self.depends_on.insert(position, logical_id);
        }
        self
    }

    /// Sets both the deletion and update-replace policies.
    pub fn with_removal(mut self, policy: &str) -> Self {
        self.update_replace_policy = Some(policy.to_string());
        self.deletion_policy = Some(policy.to_string());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_sections_are_omitted() {
        let template = Template::new(None);
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(
            value,
            json!({"AWSTemplateFormatVersion": "2010-09-09", "Resources": {}})
        );
    }

    #[test]
    fn test_dependencies_are_sorted_and_unique() {
        let resource = Resource::new("AWS::Lambda::Function")
            .with_dependency("RoleB")
            .with_dependency("PolicyA")
            .with_dependency("RoleB");
        assert_eq!(resource.depends_on, vec!["PolicyA", "RoleB"]);
    }

    #[test]
    fn test_resource_serializes_pascal_case() {
        let resource = Resource::new("AWS::DynamoDB::Table")
            .with_property("TableName", json!("tripsTemp"))
            .with_removal("Delete");
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            value,
            json!({
                "Type": "AWS::DynamoDB::Table",
                "Properties": {"TableName": "tripsTemp"},
                "UpdateReplacePolicy": "Delete",
                "DeletionPolicy": "Delete"
            })
        );
    }

    #[test]
    fn test_json_round_trip_preserves_template() {
        let mut template = Template::new(Some("trips".to_string()));
        template.resources.insert(
            "Trips".to_string(),
            Resource::new("AWS::DynamoDB::Table").with_removal("Retain"),
        );
        let json = template.to_json_pretty().unwrap();
        assert!(json.ends_with('\n'));
        assert_eq!(Template::from_json_str(&json).unwrap(), template);
    }
}
