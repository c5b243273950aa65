//! Command handlers (Imperative Shell).
//!
//! Every handler builds the stack from configuration, hands it to the pure
//! core, and only then touches the filesystem or the terminal.

use std::fs;
use std::path::Path;

use tripstack_core::construct;
use tripstack_core::lambda::Code;
use tripstack_core::plan::{self, StackPlan};
use tripstack_core::{trips_stack, Stack, Template};

use crate::assets;
use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::{template_path_in, Config};
use crate::error::{CliError, Result};
use crate::output::{json, pretty, RouteRow, SynthSummary};
use crate::prelude::*;

/// A declared stack and its rendered template.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub stack: Stack,
    pub template: Template,
}

/// Fingerprints the handler code and declares the trips stack.
pub fn synthesize(config: &Config) -> Result<Synthesis> {
    let asset = assets::asset_source(&config.asset_dir)?;
    let stack = trips_stack(&config.stack_props(Code::Asset(asset)))?;
    let template = stack.synth();
    Ok(Synthesis { stack, template })
}

/// Writes the template and asset manifest into `out_dir`.
///
/// The template is named after the stack, so the stack name must be a valid
/// CloudFormation name before anything is written.
pub fn write_outputs(synthesis: &Synthesis, out_dir: &Path) -> Result<SynthSummary> {
    let stack_name = &synthesis.stack.name;
    construct::validate_stack_name(stack_name)?;
    fs::create_dir_all(out_dir)?;

    let template_path = template_path_in(out_dir, stack_name);
    fs::write(&template_path, synthesis.template.to_json_pretty()?)?;

    let manifest_path = out_dir.join("assets.json");
    let mut manifest = serde_json::to_string_pretty(&synthesis.stack.asset_manifest())?;
    manifest.push('\n');
    fs::write(&manifest_path, manifest)?;

    tracing::info!(
        template = %template_path.display(),
        resources = synthesis.template.resources.len(),
        "wrote template"
    );

    Ok(SynthSummary {
        stack_name: stack_name.clone(),
        template_path,
        asset_manifest_path: manifest_path,
        resources: synthesis.template.resources.len(),
        parameters: synthesis.template.parameters.len(),
        outputs: synthesis.template.outputs.len(),
    })
}

/// Reads a previously synthesized template.
pub fn read_template(path: &Path) -> Result<Template> {
    let contents = fs::read_to_string(path)?;
    Template::from_json_str(&contents).map_err(|source| CliError::InvalidTemplate {
        path: path.to_path_buf(),
        source,
    })
}

/// Plans against `against`, or the last template written to `out_dir` when
/// no file is given.
pub fn plan_against(
    synthesis: &Synthesis,
    out_dir: &Path,
    against: Option<&Path>,
) -> Result<StackPlan> {
    let stack_name = &synthesis.stack.name;
    let current = match against {
        Some(path) => Some(read_template(path)?),
        None => {
            let previous = template_path_in(out_dir, stack_name);
            if previous.exists() {
                tracing::debug!(path = %previous.display(), "comparing with previous synth");
                Some(read_template(&previous)?)
            } else {
                None
            }
        }
    };
    let desired = &synthesis.template;
    Ok(plan::calculate_plan(stack_name, current.as_ref(), desired))
}

/// Runs the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.overrides.apply(Config::from_env()?)?;
    let synthesis = synthesize(&config)?;

    match cli.command {
        Commands::Synth { out, stdout } => {
            if stdout {
                print!("{}", synthesis.template.to_json_pretty()?);
                return Ok(());
            }
            let out_dir = out.unwrap_or_else(|| config.out_dir.clone());
            let summary = write_outputs(&synthesis, &out_dir)?;
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_json(&summary)?),
                OutputFormat::Pretty if !cli.quiet => {
                    aprintln!("{}", p_g("Synthesized:"));
                    aprintln!("{}", pretty::format_synth_summary(&summary));
                }
                OutputFormat::Pretty => {}
            }
        }
        Commands::Routes => {
            let routes = synthesis.stack.routes();
            let rows: Vec<RouteRow> = routes.iter().map(RouteRow::from).collect();
            match cli.format {
                OutputFormat::Json => println!("{}", json::format_json(&rows)?),
                OutputFormat::Pretty => aprintln!("{}", pretty::format_routes(&rows)),
            }
        }
        Commands::Plan { against, out } => {
            let out_dir = out.unwrap_or_else(|| config.out_dir.clone());
            let plan = plan_against(&synthesis, &out_dir, against.as_deref())?;
            match cli.format {
                OutputFormat::Json => {
                    let value = json::plan_value(&plan);
                    println!("{}", json::format_json(&value)?)
                }
                OutputFormat::Pretty => {
                    if matches!(plan, StackPlan::NoChanges { .. }) {
                        aprintln!("{}", p_g("Infrastructure is up to date."));
                        return Ok(());
                    }
                    aprintln!("{}", p_c("Deploy Plan:"));
                    for line in plan::format_plan(&plan) {
                        aprintln!("  {}", paint_plan_line(&line));
                    }
                }
            }
        }
        Commands::DestroyPlan => {
            let plan = plan::calculate_destroy_plan(&config.stack_name, &synthesis.template);
            match cli.format {
                OutputFormat::Json => {
                    let value = json::destroy_plan_value(&plan);
                    println!("{}", json::format_json(&value)?)
                }
                OutputFormat::Pretty => {
                    aprintln!("{}", p_y("Destroy Plan:"));
                    for line in plan::format_destroy_plan(&plan) {
                        aprintln!("  {}", paint_plan_line(&line));
                    }
                    if !plan.retained.is_empty() && !cli.quiet {
                        aprintln!();
                        aprintln!(
                            "{} retained resources stay in the account after teardown.",
                            p_b("Note:")
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
