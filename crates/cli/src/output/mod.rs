//! Output formatting functions.

pub mod json;
pub mod pretty;

use std::path::PathBuf;

use serde::Serialize;
use tripstack_core::apigateway::{Route, RouteTarget};

/// One line of the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    pub method: String,
    pub path: String,
    /// Function id, or `MOCK` for static responders.
    pub target: String,
}

impl From<&Route> for RouteRow {
    fn from(route: &Route) -> Self {
        let target = match &route.target {
            RouteTarget::Function(function) => function.id.clone(),
            RouteTarget::Mock(_) => "MOCK".to_string(),
        };
        Self {
            method: route.method.to_string(),
            path: route.path.clone(),
            target,
        }
    }
}

/// What `synth` produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthSummary {
    pub stack_name: String,
    pub template_path: PathBuf,
    pub asset_manifest_path: PathBuf,
    pub resources: usize,
    pub parameters: usize,
    pub outputs: usize,
}
