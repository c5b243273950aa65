//! CloudFormation intrinsic functions and pseudo parameters as JSON values.

use serde_json::{json, Value};

/// `{"Ref": logical_id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Join": [separator, parts]}`
pub fn join(separator: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// `{"Fn::Select": [index, list]}`
pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// `{"Fn::Split": [delimiter, source]}`
pub fn split(delimiter: &str, source: Value) -> Value {
    json!({ "Fn::Split": [delimiter, source] })
}

pub fn aws_partition() -> Value {
    reference("AWS::Partition")
}

pub fn aws_account_id() -> Value {
    reference("AWS::AccountId")
}

pub fn aws_url_suffix() -> Value {
    reference("AWS::URLSuffix")
}

pub fn aws_no_value() -> Value {
    reference("AWS::NoValue")
}

/// The deployment region: a literal when configured, else `AWS::Region`.
pub fn region(configured: Option<&str>) -> Value {
    match configured {
        Some(region) => Value::String(region.to_string()),
        None => reference("AWS::Region"),
    }
}

/// `arn:<partition>:iam::aws:policy/<name>` for an AWS managed policy.
pub fn managed_policy_arn(name: &str) -> Value {
    join(
        "",
        vec![
            Value::String("arn:".to_string()),
            aws_partition(),
            Value::String(format!(":iam::aws:policy/{}", name)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference() {
        assert_eq!(reference("Trips"), json!({"Ref": "Trips"}));
    }

    #[test]
    fn test_get_att() {
        assert_eq!(
            get_att("Trips", "Arn"),
            json!({"Fn::GetAtt": ["Trips", "Arn"]})
        );
    }

    #[test]
    fn test_region_literal_or_pseudo() {
        assert_eq!(region(Some("eu-west-1")), json!("eu-west-1"));
        assert_eq!(region(None), json!({"Ref": "AWS::Region"}));
    }

    #[test]
    fn test_split_select() {
        let value = select(1, split("||", reference("Key")));
        assert_eq!(
            value,
            json!({"Fn::Select": [1, {"Fn::Split": ["||", {"Ref": "Key"}]}]})
        );
    }
}
