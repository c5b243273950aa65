//! Static CORS preflight responder.

use std::collections::BTreeMap;

use super::integration::{
    Integration, IntegrationResponse, MethodOptions, MethodResponse, MockIntegration,
    PassthroughBehavior, METHOD_RESPONSE_HEADER,
};
use super::{HttpMethod, ResourceId, RestApi};
use crate::error::Result;

pub const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent";
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_CREDENTIALS: &str = "false";
pub const ALLOW_METHODS: &str = "OPTIONS,GET,PUT,POST,DELETE";

/// The four CORS headers and their values, in response order.
pub fn cors_headers() -> [(&'static str, &'static str); 4] {
    [
        ("Access-Control-Allow-Headers", ALLOW_HEADERS),
        ("Access-Control-Allow-Origin", ALLOW_ORIGIN),
        ("Access-Control-Allow-Credentials", ALLOW_CREDENTIALS),
        ("Access-Control-Allow-Methods", ALLOW_METHODS),
    ]
}

/// The mock integration answering preflight requests.
pub fn cors_mock_integration() -> MockIntegration {
    let response_parameters = cors_headers()
        .iter()
        .map(|(header, value)| {
            (
                format!("{}{}", METHOD_RESPONSE_HEADER, header),
                format!("'{}'", value),
            )
        })
        .collect();

    MockIntegration {
        integration_responses: vec![IntegrationResponse {
            status_code: "200".to_string(),
            response_parameters,
        }],
        passthrough_behavior: PassthroughBehavior::Never,
        request_templates: BTreeMap::from([(
            "application/json".to_string(),
            "{\"statusCode\": 200}".to_string(),
        )]),
    }
}

fn cors_method_options() -> MethodOptions {
    MethodOptions {
        method_responses: vec![MethodResponse {
            status_code: "200".to_string(),
            response_parameters: cors_headers()
                .iter()
                .map(|(header, _)| (format!("{}{}", METHOD_RESPONSE_HEADER, header), true))
                .collect(),
        }],
    }
}

/// Attaches an OPTIONS method returning the static CORS headers.
///
/// Works on any resource of any API; it does not touch handlers or tables.
pub fn add_cors_options(api: &mut RestApi, resource: ResourceId) -> Result<()> {
    api.add_method(
        resource,
        HttpMethod::Options,
        Integration::Mock(cors_mock_integration()),
        cors_method_options(),
    )
}
