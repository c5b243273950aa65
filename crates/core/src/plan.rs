//! Pure functions for calculating stack change plans (Functional Core).

use crate::template::Template;

/// A resource touched by a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceChange {
    pub logical_id: String,
    pub resource_type: String,
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackPlan {
    /// No previous template, every resource will be created.
    CreateStack {
        stack_name: String,
        resources: Vec<ResourceChange>,
    },
    /// Previous template differs from the desired one.
    Update {
        stack_name: String,
        added: Vec<ResourceChange>,
        removed: Vec<ResourceChange>,
        modified: Vec<ResourceChange>,
        outputs_changed: bool,
        /// `Description` or `AWSTemplateFormatVersion` differ.
        metadata_changed: bool,
    },
    /// Templates are identical.
    NoChanges { stack_name: String },
}

/// What tearing a stack down does to each resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyPlan {
    pub stack_name: String,
    pub deleted: Vec<ResourceChange>,
    pub retained: Vec<ResourceChange>,
}

fn change(logical_id: &str, resource_type: &str) -> ResourceChange {
    ResourceChange {
        logical_id: logical_id.to_string(),
        resource_type: resource_type.to_string(),
    }
}

/// Pure function: Calculate what changes are needed to reach desired state.
pub fn calculate_plan(
    stack_name: &str,
    current: Option<&Template>,
    desired: &Template,
) -> StackPlan {
    let Some(current) = current else {
        return StackPlan::CreateStack {
            stack_name: stack_name.to_string(),
            resources: desired
                .resources
                .iter()
                .map(|(id, r)| change(id, &r.resource_type))
                .collect(),
        };
    };

    if current == desired {
        return StackPlan::NoChanges {
            stack_name: stack_name.to_string(),
        };
    }

    let added = desired
        .resources
        .iter()
        .filter(|(id, _)| !current.resources.contains_key(*id))
        .map(|(id, r)| change(id, &r.resource_type))
        .collect();

    let removed = current
        .resources
        .iter()
        .filter(|(id, _)| !desired.resources.contains_key(*id))
        .map(|(id, r)| change(id, &r.resource_type))
        .collect();

    let modified = desired
        .resources
        .iter()
        .filter(|(id, r)| current.resources.get(*id).is_some_and(|old| old != *r))
        .map(|(id, r)| change(id, &r.resource_type))
        .collect();

    StackPlan::Update {
        stack_name: stack_name.to_string(),
        added,
        removed,
        modified,
        outputs_changed: current.outputs != desired.outputs
            || current.parameters != desired.parameters,
        metadata_changed: current.description != desired.description
            || current.format_version != desired.format_version,
    }
}

/// Pure function: Calculate destroy plan from the deletion policies.
pub fn calculate_destroy_plan(stack_name: &str, template: &Template) -> DestroyPlan {
    let (retained, deleted) = template
        .resources
        .iter()
        .map(|(id, r)| (change(id, &r.resource_type), r.deletion_policy.as_deref()))
        .partition::<Vec<_>, _>(|(_, policy)| *policy == Some("Retain"));

    DestroyPlan {
        stack_name: stack_name.to_string(),
        deleted: deleted.into_iter().map(|(c, _)| c).collect(),
        retained: retained.into_iter().map(|(c, _)| c).collect(),
    }
}

/// Pure function: Format a stack plan for display.
pub fn format_plan(plan: &StackPlan) -> Vec<String> {
    match plan {
        StackPlan::CreateStack {
            stack_name,
            resources,
        } => {
            let mut lines = vec![format!("+ Create stack: {}", stack_name)];
            for resource in resources {
                lines.push(format!(
                    "  + {} ({})",
                    resource.logical_id, resource.resource_type
                ));
            }
            lines
        }
        StackPlan::Update {
            stack_name,
            added,
            removed,
            modified,
            outputs_changed,
            metadata_changed,
        } => {
            let mut lines = vec![format!("~ Update stack: {}", stack_name)];
            for resource in added {
                lines.push(format!(
                    "  + {} ({})",
                    resource.logical_id, resource.resource_type
                ));
            }
            for resource in modified {
                lines.push(format!(
                    "  ~ {} ({})",
                    resource.logical_id, resource.resource_type
                ));
            }
            for resource in removed {
                lines.push(format!(
                    "  - {} ({})",
                    resource.logical_id, resource.resource_type
                ));
            }
            if *outputs_changed {
                lines.push("  ~ Parameters/Outputs".to_string());
            }
            if *metadata_changed {
                lines.push("  ~ Description/Format version".to_string());
            }
            lines
        }
        StackPlan::NoChanges { stack_name } => {
            vec![format!("= Stack '{}' is up to date", stack_name)]
        }
    }
}

/// Pure function: Format a destroy plan for display.
pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    let mut lines = vec![format!("- Destroy stack: {}", plan.stack_name)];
    for resource in &plan.deleted {
        let warning = if resource.resource_type == "AWS::DynamoDB::Table" {
            " (ALL DATA WILL BE LOST)"
        } else {
            ""
        };
        lines.push(format!(
            "  - {} ({}){}",
            resource.logical_id, resource.resource_type, warning
        ));
    }
    for resource in &plan.retained {
        lines.push(format!(
            "  = {} ({}) retained",
            resource.logical_id, resource.resource_type
        ));
    }
    lines
}
