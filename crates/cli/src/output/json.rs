//! JSON output formatting.

use serde::Serialize;
use serde_json::{json, Value};
use tripstack_core::plan::{DestroyPlan, ResourceChange, StackPlan};

/// Format a value as JSON.
pub fn format_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

fn changes(resources: &[ResourceChange]) -> Value {
    resources
        .iter()
        .map(|r| json!({"logicalId": r.logical_id, "type": r.resource_type}))
        .collect()
}

/// JSON view of a deploy plan.
pub fn plan_value(plan: &StackPlan) -> Value {
    match plan {
        StackPlan::CreateStack {
            stack_name,
            resources,
        } => json!({
            "stackName": stack_name,
            "action": "create",
            "added": changes(resources),
        }),
        StackPlan::Update {
            stack_name,
            added,
            removed,
            modified,
            outputs_changed,
            metadata_changed,
        } => json!({
            "stackName": stack_name,
            "action": "update",
            "added": changes(added),
            "modified": changes(modified),
            "removed": changes(removed),
            "outputsChanged": outputs_changed,
            "metadataChanged": metadata_changed,
        }),
        StackPlan::NoChanges { stack_name } => json!({
            "stackName": stack_name,
            "action": "none",
        }),
    }
}

/// JSON view of a destroy plan.
pub fn destroy_plan_value(plan: &DestroyPlan) -> Value {
    json!({
        "stackName": plan.stack_name,
        "deleted": changes(&plan.deleted),
        "retained": changes(&plan.retained),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, resource_type: &str) -> ResourceChange {
        ResourceChange {
            logical_id: id.to_string(),
            resource_type: resource_type.to_string(),
        }
    }

    #[test]
    fn test_no_changes_plan() {
        let plan = StackPlan::NoChanges {
            stack_name: "TripsStack".to_string(),
        };
        assert_eq!(
            format_json(&plan_value(&plan)).unwrap(),
            r#"{"action":"none","stackName":"TripsStack"}"#
        );
    }

    #[test]
    fn test_update_plan_reports_metadata_changes() {
        let plan = StackPlan::Update {
            stack_name: "TripsStack".to_string(),
            added: vec![],
            removed: vec![],
            modified: vec![change("Trips", "AWS::DynamoDB::Table")],
            outputs_changed: false,
            metadata_changed: true,
        };
        let value = plan_value(&plan);
        assert_eq!(value["action"], "update");
        assert_eq!(value["metadataChanged"], true);
        assert_eq!(value["modified"][0]["logicalId"], "Trips");
    }

    #[test]
    fn test_destroy_plan_lists_retained_table() {
        let plan = DestroyPlan {
            stack_name: "TripsStack".to_string(),
            deleted: vec![change("GetTripsHandler", "AWS::Lambda::Function")],
            retained: vec![change("Trips", "AWS::DynamoDB::Table")],
        };
        let value = destroy_plan_value(&plan);
        assert_eq!(value["retained"][0]["logicalId"], "Trips");
        assert_eq!(value["deleted"][0]["type"], "AWS::Lambda::Function");
    }
}
