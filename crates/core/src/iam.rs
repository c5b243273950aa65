//! Execution roles and permission grants.
//!
//! A grant is an edge `(function, table, actions)` in the resource graph.
//! It is rendered as a statement in the policy attached to the function's
//! execution role; there is no runtime check in this layer.

use serde_json::{json, Value};

use crate::dynamodb::TableRef;
use crate::intrinsics;
use crate::lambda::FunctionRef;
use crate::template::Resource;

pub const SERVICE_ROLE: &str = "ServiceRole";
pub const DEFAULT_POLICY: &str = "DefaultPolicy";

const LAMBDA_BASIC_EXECUTION: &str = "service-role/AWSLambdaBasicExecutionRole";

pub const TABLE_READ_ACTIONS: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:GetItem",
    "dynamodb:Scan",
    "dynamodb:ConditionCheckItem",
];

pub const TABLE_WRITE_ACTIONS: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
    "dynamodb:DeleteItem",
];

const TABLE_DESCRIBE_ACTIONS: &[&str] = &["dynamodb:DescribeTable"];

/// An `Allow` policy statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    pub actions: Vec<String>,
    pub resources: Vec<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: &[&str], resources: Vec<Value>) -> Self {
        Self {
            actions: actions.iter().map(|action| action.to_string()).collect(),
            resources,
        }
    }

    pub fn to_value(&self) -> Value {
        let resource = match self.resources.as_slice() {
            [single] => single.clone(),
            many => Value::Array(many.to_vec()),
        };
        json!({
            "Action": self.actions,
            "Effect": "Allow",
            "Resource": resource,
        })
    }

    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Statement granting read and write access to a table's data.
///
/// The second resource stands in for the table's indexes; the trips table
/// has none, so it renders as `AWS::NoValue`.
pub fn read_write_data_statement(table: &TableRef) -> PolicyStatement {
    let actions: Vec<&str> = TABLE_READ_ACTIONS
        .iter()
        .chain(TABLE_WRITE_ACTIONS)
        .chain(TABLE_DESCRIBE_ACTIONS)
        .copied()
        .collect();
    let resources = vec![table.table_arn(), intrinsics::aws_no_value()];
    PolicyStatement::allow(&actions, resources)
}

/// A permission edge from a function to a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub function: FunctionRef,
    pub table: TableRef,
    pub statement: PolicyStatement,
}

impl Grant {
    pub fn read_write_data(function: &FunctionRef, table: &TableRef) -> Self {
        Self {
            function: function.clone(),
            table: table.clone(),
            statement: read_write_data_statement(table),
        }
    }
}

/// The execution role assumed by a Lambda function.
pub fn lambda_role_resource() -> Resource {
    Resource::new("AWS::IAM::Role")
        .with_property(
            "AssumeRolePolicyDocument",
            json!({
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                }],
                "Version": "2012-10-17",
            }),
        )
        .with_property(
            "ManagedPolicyArns",
            json!([intrinsics::managed_policy_arn(LAMBDA_BASIC_EXECUTION)]),
        )
}

/// The default policy attached to a function's role, holding its grants.
pub fn role_policy_resource(function: &FunctionRef, statements: &[PolicyStatement]) -> Resource {
    let statements: Vec<Value> = statements.iter().map(PolicyStatement::to_value).collect();
    Resource::new("AWS::IAM::Policy")
        .with_property(
            "PolicyDocument",
            json!({ "Statement": statements, "Version": "2012-10-17" }),
        )
        .with_property("PolicyName", json!(function.policy_logical_id))
        .with_property(
            "Roles",
            json!([intrinsics::reference(&function.role_logical_id)]),
        )
}
