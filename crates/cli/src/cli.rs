//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::error::{CliError, Result};

/// Synthesize and inspect the trips service infrastructure.
#[derive(Debug, Parser)]
#[command(name = "tripstack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output with colors.
    #[default]
    Pretty,
}

/// Flags overriding the environment configuration.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Stack name.
    #[arg(long, global = true)]
    pub stack_name: Option<String>,

    /// Physical table name.
    #[arg(long, global = true)]
    pub table_name: Option<String>,

    /// Partition key attribute name.
    #[arg(long, global = true)]
    pub partition_key: Option<String>,

    /// Table removal policy: `retain` or `destroy`.
    #[arg(long, global = true)]
    pub removal_policy: Option<String>,

    /// Handler runtime, e.g. `nodejs20.x`.
    #[arg(long, global = true)]
    pub runtime: Option<String>,

    /// Directory holding the handler code.
    #[arg(long, global = true)]
    pub asset_dir: Option<PathBuf>,

    /// Literal deployment region.
    #[arg(long, global = true)]
    pub region: Option<String>,
}

impl Overrides {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(stack_name) = self.stack_name {
            config.stack_name = stack_name;
        }
        if let Some(table_name) = self.table_name {
            config.table_name = table_name;
        }
        if let Some(partition_key) = self.partition_key {
            config.partition_key = partition_key;
        }
        if let Some(policy) = self.removal_policy {
            config.removal_policy = policy.parse().map_err(|e| CliError::InvalidConfig {
                name: "--removal-policy",
                value: policy.clone(),
                reason: format!("{}", e),
            })?;
        }
        if let Some(runtime) = self.runtime {
            config.runtime = runtime.parse().map_err(|e| CliError::InvalidConfig {
                name: "--runtime",
                value: runtime.clone(),
                reason: format!("{}", e),
            })?;
        }
        if let Some(asset_dir) = self.asset_dir {
            config.asset_dir = asset_dir;
        }
        if let Some(region) = self.region {
            config.region = Some(region).filter(|r| !r.is_empty());
        }
        Ok(config)
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the template and asset manifest.
    Synth {
        /// Output directory (defaults to TRIPSTACK_OUT_DIR or "stack.out").
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the template to stdout instead of writing files.
        #[arg(long)]
        stdout: bool,
    },
    /// Print the HTTP routing table.
    Routes,
    /// Show what deploying the synthesized template would change.
    Plan {
        /// Previously deployed template to compare against.
        #[arg(long)]
        against: Option<PathBuf>,

        /// Directory of the previous synth (defaults to TRIPSTACK_OUT_DIR or "stack.out").
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show what tearing the stack down would delete or retain.
    DestroyPlan,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripstack_core::dynamodb::RemovalPolicy;
    use tripstack_core::lambda::Runtime;

    fn defaults() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn test_parse_synth_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tripstack",
            "synth",
            "--stdout",
            "--format",
            "json",
            "--partition-key",
            "tripId",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Synth { stdout: true, .. }));
        assert_eq!(cli.overrides.partition_key.as_deref(), Some("tripId"));
    }

    #[test]
    fn test_parse_destroy_plan() {
        let cli = Cli::try_parse_from(["tripstack", "destroy-plan"]).unwrap();
        assert!(matches!(cli.command, Commands::DestroyPlan));
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_parse_plan_with_out_dir() {
        let args = ["tripstack", "plan", "--out", "build"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Commands::Plan { against, out } = cli.command else {
            panic!("expected the plan command");
        };
        assert_eq!(against, None);
        assert_eq!(out, Some(PathBuf::from("build")));
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let overrides = Overrides {
            stack_name: Some("Staging".to_string()),
            removal_policy: Some("destroy".to_string()),
            ..Default::default()
        };
        let config = overrides.apply(defaults()).unwrap();
        assert_eq!(config.stack_name, "Staging");
        assert_eq!(config.removal_policy, RemovalPolicy::Destroy);
        assert_eq!(config.table_name, "tripsTemp");
        assert_eq!(config.runtime, Runtime::Nodejs14);
    }

    #[test]
    fn test_runtime_flag_overrides_environment() {
        let overrides = Overrides {
            runtime: Some("nodejs20.x".to_string()),
            ..Default::default()
        };
        let config = overrides.apply(defaults()).unwrap();
        assert_eq!(config.runtime, Runtime::Nodejs20);

        let overrides = Overrides {
            runtime: Some("cobol".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(defaults()),
            Err(CliError::InvalidConfig {
                name: "--runtime",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_removal_policy_flag() {
        let overrides = Overrides {
            removal_policy: Some("forever".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            overrides.apply(defaults()),
            Err(CliError::InvalidConfig {
                name: "--removal-policy",
                ..
            })
        ));
    }
}
