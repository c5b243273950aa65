//! Lambda function declarations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::assets::AssetSource;
use crate::construct::{self, RESOURCE};
use crate::dynamodb::TableRef;
use crate::error::{ConstructError, Result};
use crate::iam;
use crate::intrinsics;
use crate::template::Resource;

/// Environment variable holding the table name.
pub const TABLE_NAME_ENV: &str = "TABLE_NAME";

/// Environment variable holding the partition key attribute name.
pub const PRIMARY_KEY_ENV: &str = "PRIMARY_KEY";

/// Supported execution runtimes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Runtime {
    #[default]
    Nodejs14,
    Nodejs18,
    Nodejs20,
    Python312,
    ProvidedAl2023,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Nodejs14 => "nodejs14.x",
            Runtime::Nodejs18 => "nodejs18.x",
            Runtime::Nodejs20 => "nodejs20.x",
            Runtime::Python312 => "python3.12",
            Runtime::ProvidedAl2023 => "provided.al2023",
        }
    }
}

impl FromStr for Runtime {
    type Err = ConstructError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nodejs14.x" => Ok(Runtime::Nodejs14),
            "nodejs18.x" => Ok(Runtime::Nodejs18),
            "nodejs20.x" => Ok(Runtime::Nodejs20),
            "python3.12" => Ok(Runtime::Python312),
            "provided.al2023" => Ok(Runtime::ProvidedAl2023),
            other => Err(ConstructError::InvalidRuntime(other.to_string())),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the function code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A local directory uploaded as a zip asset.
    Asset(AssetSource),
    /// Source inlined into the template (`ZipFile`).
    Inline(String),
}

impl Code {
    pub fn asset(&self) -> Option<&AssetSource> {
        match self {
            Code::Asset(asset) => Some(asset),
            Code::Inline(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Code::Asset(asset) => json!({
                "S3Bucket": asset.s3_bucket(),
                "S3Key": asset.s3_key(),
            }),
            Code::Inline(source) => json!({ "ZipFile": source }),
        }
    }
}

/// A Lambda function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionConfig {
    pub id: String,
    pub runtime: Runtime,
    pub code: Code,
    /// Entry point, e.g. `get-trips.handler`.
    pub handler: String,
    pub environment: BTreeMap<String, Value>,
    pub description: Option<String>,
}

impl FunctionConfig {
    pub fn new(id: impl Into<String>, handler: impl Into<String>, code: Code) -> Self {
        Self {
            id: id.into(),
            runtime: Runtime::default(),
            code,
            handler: handler.into(),
            environment: BTreeMap::new(),
            description: None,
        }
    }

    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_environment(mut self, name: &str, value: Value) -> Self {
        self.environment.insert(name.to_string(), value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        construct::validate_id(&self.id)?;
        if self.handler.trim().is_empty() {
            return Err(ConstructError::EmptyEntryPoint);
        }
        Ok(())
    }

    pub fn reference(&self) -> FunctionRef {
        FunctionRef {
            id: self.id.clone(),
            logical_id: construct::logical_id(&[&self.id, RESOURCE]),
            role_logical_id: construct::logical_id(&[&self.id, iam::SERVICE_ROLE, RESOURCE]),
            policy_logical_id: construct::logical_id(&[
                &self.id,
                iam::SERVICE_ROLE,
                iam::DEFAULT_POLICY,
                RESOURCE,
            ]),
            handler: self.handler.clone(),
        }
    }

    /// Renders the `AWS::Lambda::Function` resource.
    ///
    /// `has_policy` adds a dependency on the role's default policy so the
    /// function is only created once its grants are in place.
    pub fn to_resource(&self, has_policy: bool) -> Resource {
        let reference = self.reference();
        let mut resource = Resource::new("AWS::Lambda::Function")
            .with_property("Code", self.code.to_value())
            .with_property(
                "Role",
                intrinsics::get_att(&reference.role_logical_id, "Arn"),
            )
            .with_property("Handler", json!(self.handler))
            .with_property("Runtime", json!(self.runtime.as_str()))
            .with_dependency(reference.role_logical_id.clone());

        if !self.environment.is_empty() {
            let variables: Map<String, Value> = self
                .environment
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            resource = resource.with_property("Environment", json!({ "Variables": variables }));
        }

        if let Some(description) = &self.description {
            resource = resource.with_property("Description", json!(description));
        }

        if has_policy {
            resource = resource.with_dependency(reference.policy_logical_id);
        }

        resource
    }
}

/// Builds a table-backed request handler.
///
/// Every handler of the trips API has the same shape: default runtime, the
/// shared code asset, and `TABLE_NAME`/`PRIMARY_KEY` pointing at the table.
pub fn make_handler(id: &str, entry_point: &str, table: &TableRef, code: Code) -> FunctionConfig {
    FunctionConfig::new(id, entry_point, code)
        .with_environment(TABLE_NAME_ENV, table.table_name())
        .with_environment(PRIMARY_KEY_ENV, json!(table.partition_key))
}

/// Reference to a function declared in a stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FunctionRef {
    pub id: String,
    pub logical_id: String,
    pub role_logical_id: String,
    pub policy_logical_id: String,
    pub handler: String,
}

impl FunctionRef {
    pub fn arn(&self) -> Value {
        intrinsics::get_att(&self.logical_id, "Arn")
    }
}
