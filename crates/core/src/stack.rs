//! The stack: owner of every construct and entry point of synthesis.

use std::collections::{BTreeMap, BTreeSet};

use crate::apigateway::{RestApi, Route};
use crate::assets::{AssetManifestEntry, AssetSource};
use crate::construct;
use crate::dynamodb::{TableConfig, TableRef};
use crate::error::{ConstructError, Result};
use crate::iam::{self, Grant, PolicyStatement};
use crate::lambda::{FunctionConfig, FunctionRef};
use crate::template::Template;

#[derive(Debug, Clone, PartialEq)]
struct FunctionEntry {
    config: FunctionConfig,
    statements: Vec<PolicyStatement>,
}

/// A deployable unit of resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    pub name: String,
    pub description: Option<String>,
    /// Literal region, or the `AWS::Region` pseudo parameter when `None`.
    pub region: Option<String>,
    ids: BTreeSet<String>,
    tables: Vec<TableConfig>,
    functions: Vec<FunctionEntry>,
    grants: Vec<Grant>,
    apis: Vec<RestApi>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            region: None,
            ids: BTreeSet::new(),
            tables: Vec::new(),
            functions: Vec::new(),
            grants: Vec::new(),
            apis: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    fn claim_id(&mut self, id: &str) -> Result<()> {
        construct::validate_id(id)?;
        if !self.ids.insert(id.to_string()) {
            return Err(ConstructError::DuplicateId {
                stack: self.name.clone(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn add_table(&mut self, config: TableConfig) -> Result<TableRef> {
        config.validate()?;
        self.claim_id(&config.id)?;
        let reference = config.reference();
        tracing::debug!(
            stack = %self.name,
            table = %config.id,
            removal_policy = %config.removal_policy,
            "declared table"
        );
        self.tables.push(config);
        Ok(reference)
    }

    pub fn add_function(&mut self, config: FunctionConfig) -> Result<FunctionRef> {
        config.validate()?;
        self.claim_id(&config.id)?;
        let reference = config.reference();
        tracing::debug!(
            stack = %self.name,
            function = %config.id,
            handler = %config.handler,
            "declared function"
        );
        self.functions.push(FunctionEntry {
            config,
            statements: Vec::new(),
        });
        Ok(reference)
    }

    /// Grants `function` read and write access to the data in `table`.
    ///
    /// Granting the same access twice leaves the stack unchanged.
    pub fn grant_read_write_data(
        &mut self,
        table: &TableRef,
        function: &FunctionRef,
    ) -> Result<()> {
        if !self.tables.iter().any(|t| t.id == table.id) {
            return Err(ConstructError::UnknownTable(table.id.clone()));
        }
        let grant = Grant::read_write_data(function, table);
        let entry = self
            .functions
            .iter_mut()
            .find(|entry| entry.config.id == function.id)
            .ok_or_else(|| ConstructError::UnknownFunction(function.id.clone()))?;

        if entry.statements.contains(&grant.statement) {
            tracing::debug!(function = %function.id, table = %table.id, "grant already present");
            return Ok(());
        }
        entry.statements.push(grant.statement.clone());
        self.grants.push(grant);
        Ok(())
    }

    /// Adds a REST API. Every Lambda integration must target a function of
    /// this stack.
    pub fn add_rest_api(&mut self, api: RestApi) -> Result<()> {
        for function in api.functions() {
            if !self.has_function(&function.id) {
                return Err(ConstructError::UnknownFunction(function.id.clone()));
            }
        }
        self.claim_id(&api.id)?;
        tracing::debug!(stack = %self.name, api = %api.id, "declared REST API");
        self.apis.push(api);
        Ok(())
    }

    fn has_function(&self, id: &str) -> bool {
        self.functions.iter().any(|entry| entry.config.id == id)
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn rest_apis(&self) -> &[RestApi] {
        &self.apis
    }

    /// Every route of every API in the stack.
    pub fn routes(&self) -> Vec<Route> {
        self.apis.iter().flat_map(RestApi::routes).collect()
    }

    /// Distinct code assets, ordered by fingerprint.
    pub fn assets(&self) -> Vec<&AssetSource> {
        let unique: BTreeMap<&str, &AssetSource> = self
            .functions
            .iter()
            .filter_map(|entry| entry.config.code.asset())
            .map(|asset| (asset.fingerprint.as_str(), asset))
            .collect();
        unique.into_values().collect()
    }

    pub fn asset_manifest(&self) -> Vec<AssetManifestEntry> {
        self.assets()
            .into_iter()
            .map(AssetSource::manifest_entry)
            .collect()
    }

    /// Renders the stack into a template.
    ///
    /// Pure and deterministic: the same stack always yields the same
    /// template, and the template always serializes to the same bytes.
    pub fn synth(&self) -> Template {
        let mut template = Template::new(self.description.clone());
        let region = self.region.as_deref();

        for asset in self.assets() {
            template.parameters.extend(asset.parameters());
        }

        for table in &self.tables {
            template
                .resources
                .insert(table.logical_id(), table.to_resource());
        }

        for entry in &self.functions {
            let reference = entry.config.reference();
            let has_policy = !entry.statements.is_empty();
            template.resources.insert(
                reference.role_logical_id.clone(),
                iam::lambda_role_resource(),
            );
            if has_policy {
                template.resources.insert(
                    reference.policy_logical_id.clone(),
                    iam::role_policy_resource(&reference, &entry.statements),
                );
            }
            template.resources.insert(
                reference.logical_id.clone(),
                entry.config.to_resource(has_policy),
            );
        }

        for api in &self.apis {
            template.resources.extend(api.to_resources(region));
            let (output_id, output) = api.endpoint_output(region);
            template.outputs.insert(output_id, output);
        }

        tracing::debug!(
            stack = %self.name,
            resources = template.resources.len(),
            parameters = template.parameters.len(),
            "synthesized template"
        );
        template
    }
}
