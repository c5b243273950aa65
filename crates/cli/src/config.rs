//! Stack configuration from the environment.

use std::env;
use std::path::{Path, PathBuf};

use tripstack_core::dynamodb::RemovalPolicy;
use tripstack_core::lambda::{Code, Runtime};
use tripstack_core::trips::{DEFAULT_PARTITION_KEY, DEFAULT_STACK_NAME, DEFAULT_TABLE_NAME};
use tripstack_core::TripsStackProps;

use crate::error::{CliError, Result};

/// Stack configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stack name (default: "TripsStack")
    pub stack_name: String,
    /// Physical table name (default: "tripsTemp")
    pub table_name: String,
    /// Partition key attribute (default: "myPk")
    pub partition_key: String,
    /// Table removal policy (default: retain)
    pub removal_policy: RemovalPolicy,
    /// Handler runtime (default: nodejs14.x)
    pub runtime: Runtime,
    /// Directory holding the handler code (default: "lambda")
    pub asset_dir: PathBuf,
    /// Directory the template is written to (default: "stack.out")
    pub out_dir: PathBuf,
    /// Literal deployment region; the `AWS::Region` pseudo parameter when unset.
    pub region: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TRIPSTACK_STACK_NAME` - Stack name (default: "TripsStack")
    /// - `TRIPSTACK_TABLE_NAME` - Table name (default: "tripsTemp")
    /// - `TRIPSTACK_PARTITION_KEY` - Partition key (default: "myPk")
    /// - `TRIPSTACK_REMOVAL_POLICY` - `retain` or `destroy` (default: retain)
    /// - `TRIPSTACK_RUNTIME` - Handler runtime (default: "nodejs14.x")
    /// - `TRIPSTACK_ASSET_DIR` - Handler code directory (default: "lambda")
    /// - `TRIPSTACK_OUT_DIR` - Output directory (default: "stack.out")
    /// - `AWS_REGION` - Deployment region (default: unset)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let removal_policy: RemovalPolicy = match lookup("TRIPSTACK_REMOVAL_POLICY") {
            Some(value) => value.parse().map_err(|e| CliError::InvalidConfig {
                name: "TRIPSTACK_REMOVAL_POLICY",
                value: value.clone(),
                reason: format!("{}", e),
            })?,
            None => RemovalPolicy::default(),
        };
        let runtime: Runtime = match lookup("TRIPSTACK_RUNTIME") {
            Some(value) => value.parse().map_err(|e| CliError::InvalidConfig {
                name: "TRIPSTACK_RUNTIME",
                value: value.clone(),
                reason: format!("{}", e),
            })?,
            None => Runtime::default(),
        };

        Ok(Self {
            stack_name: lookup("TRIPSTACK_STACK_NAME")
                .unwrap_or_else(|| DEFAULT_STACK_NAME.to_string()),
            table_name: lookup("TRIPSTACK_TABLE_NAME")
                .unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            partition_key: lookup("TRIPSTACK_PARTITION_KEY")
                .unwrap_or_else(|| DEFAULT_PARTITION_KEY.to_string()),
            removal_policy,
            runtime,
            asset_dir: lookup("TRIPSTACK_ASSET_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("lambda")),
            out_dir: lookup("TRIPSTACK_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("stack.out")),
            region: lookup("AWS_REGION").filter(|region| !region.is_empty()),
        })
    }

    /// Path of the synthesized template inside the output directory.
    pub fn template_path(&self) -> PathBuf {
        template_path_in(&self.out_dir, &self.stack_name)
    }

    /// Path of the asset manifest inside the output directory.
    pub fn asset_manifest_path(&self) -> PathBuf {
        self.out_dir.join("assets.json")
    }

    /// Stack properties for the given handler code.
    pub fn stack_props(&self, code: Code) -> TripsStackProps {
        TripsStackProps::new(code)
            .with_stack_name(&self.stack_name)
            .with_table_name(&self.table_name)
            .with_partition_key(&self.partition_key)
            .with_removal_policy(self.removal_policy)
            .with_runtime(self.runtime)
            .with_region(self.region.clone())
    }
}

/// Path of the template for `stack_name` inside `out_dir`.
pub fn template_path_in(out_dir: &Path, stack_name: &str) -> PathBuf {
    out_dir.join(format!("{}.template.json", stack_name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tripstack_core::assets::AssetSource;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.stack_name, "TripsStack");
        assert_eq!(config.table_name, "tripsTemp");
        assert_eq!(config.partition_key, "myPk");
        assert_eq!(config.removal_policy, RemovalPolicy::Retain);
        assert_eq!(config.runtime, Runtime::Nodejs14);
        assert_eq!(config.asset_dir, PathBuf::from("lambda"));
        assert_eq!(config.region, None);
        assert_eq!(
            config.template_path(),
            PathBuf::from("stack.out/TripsStack.template.json")
        );
    }

    #[test]
    fn test_destroy_must_be_requested() {
        let vars = lookup(&[("TRIPSTACK_REMOVAL_POLICY", "destroy")]);
        let config = Config::from_lookup(vars).unwrap();
        assert_eq!(config.removal_policy, RemovalPolicy::Destroy);
    }

    #[test]
    fn test_invalid_removal_policy_is_an_error() {
        let vars = lookup(&[("TRIPSTACK_REMOVAL_POLICY", "snapshot")]);
        let result = Config::from_lookup(vars);
        assert!(matches!(
            result,
            Err(CliError::InvalidConfig {
                name: "TRIPSTACK_REMOVAL_POLICY",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_region_is_ignored() {
        let config = Config::from_lookup(lookup(&[("AWS_REGION", "")])).unwrap();
        assert_eq!(config.region, None);
    }

    #[test]
    fn test_stack_props_carry_overrides() {
        let vars = lookup(&[
            ("TRIPSTACK_STACK_NAME", "Staging"),
            ("TRIPSTACK_PARTITION_KEY", "tripId"),
            ("TRIPSTACK_RUNTIME", "nodejs20.x"),
            ("AWS_REGION", "eu-west-1"),
        ]);
        let config = Config::from_lookup(vars).unwrap();
        let props = config.stack_props(Code::Asset(AssetSource::new("lambda", "abc")));
        assert_eq!(props.stack_name, "Staging");
        assert_eq!(props.partition_key, "tripId");
        assert_eq!(props.region.as_deref(), Some("eu-west-1"));
        assert_eq!(props.removal_policy, RemovalPolicy::Retain);
        assert_eq!(props.runtime, Runtime::Nodejs20);
    }

    #[test]
    fn test_template_path_follows_out_dir() {
        assert_eq!(
            template_path_in(Path::new("build"), "Staging"),
            PathBuf::from("build/Staging.template.json")
        );
    }
}
