//! Method integrations: Lambda proxy and static mocks.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::intrinsics;
use crate::lambda::FunctionRef;

/// What a method forwards requests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integration {
    /// Proxy the request to a Lambda function.
    Lambda(FunctionRef),
    /// Answer with a static response without invoking anything.
    Mock(MockIntegration),
}

impl Integration {
    pub fn lambda(function: &FunctionRef) -> Self {
        Integration::Lambda(function.clone())
    }

    pub fn function(&self) -> Option<&FunctionRef> {
        match self {
            Integration::Lambda(function) => Some(function),
            Integration::Mock(_) => None,
        }
    }

    pub(crate) fn to_value(&self, region: Option<&str>) -> Value {
        match self {
            Integration::Lambda(function) => json!({
                "IntegrationHttpMethod": "POST",
                "Type": "AWS_PROXY",
                "Uri": intrinsics::join("", vec![
                    json!("arn:"),
                    intrinsics::aws_partition(),
                    json!(":apigateway:"),
                    intrinsics::region(region),
                    json!(":lambda:path/2015-03-31/functions/"),
                    function.arn(),
                    json!("/invocations"),
                ]),
            }),
            Integration::Mock(mock) => mock.to_value(),
        }
    }
}

/// How unmapped request content types are handled by a mock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassthroughBehavior {
    WhenNoMatch,
    #[default]
    Never,
    WhenNoTemplates,
}

impl PassthroughBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassthroughBehavior::WhenNoMatch => "WHEN_NO_MATCH",
            PassthroughBehavior::Never => "NEVER",
            PassthroughBehavior::WhenNoTemplates => "WHEN_NO_TEMPLATES",
        }
    }
}

/// A response the integration produces, with header mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationResponse {
    pub status_code: String,
    /// `method.response.header.X` -> quoted literal, e.g. `'*'`.
    pub response_parameters: BTreeMap<String, String>,
}

/// A static integration answered by API Gateway itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockIntegration {
    pub integration_responses: Vec<IntegrationResponse>,
    pub passthrough_behavior: PassthroughBehavior,
    pub request_templates: BTreeMap<String, String>,
}

impl MockIntegration {
    fn to_value(&self) -> Value {
        let responses: Vec<Value> = self
            .integration_responses
            .iter()
            .map(|response| {
                json!({
                    "ResponseParameters": response.response_parameters,
                    "StatusCode": response.status_code,
                })
            })
            .collect();
        json!({
            "IntegrationResponses": responses,
            "PassthroughBehavior": self.passthrough_behavior.as_str(),
            "RequestTemplates": self.request_templates,
            "Type": "MOCK",
        })
    }

    /// Headers the mock returns for `status_code`, with the
    /// `method.response.header.` prefix and the literal quotes removed.
    pub fn response_headers(&self, status_code: &str) -> BTreeMap<String, String> {
        self.integration_responses
            .iter()
            .filter(|response| response.status_code == status_code)
            .flat_map(|response| response.response_parameters.iter())
            .filter_map(|(name, value)| {
                let header = name.strip_prefix(METHOD_RESPONSE_HEADER)?;
                Some((header.to_string(), value.trim_matches('\'').to_string()))
            })
            .collect()
    }
}

/// Prefix of method response header mappings.
pub const METHOD_RESPONSE_HEADER: &str = "method.response.header.";

/// A response declared on the method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodResponse {
    pub status_code: String,
    /// Header mapping -> required.
    pub response_parameters: BTreeMap<String, bool>,
}

impl MethodResponse {
    pub(crate) fn to_value(&self) -> Value {
        json!({
            "ResponseParameters": self.response_parameters,
            "StatusCode": self.status_code,
        })
    }
}

/// Extra method settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodOptions {
    pub method_responses: Vec<MethodResponse>,
}
