//! API Gateway REST API declaration.
//!
//! The API is a tree of resources rooted at `/`. Each resource may carry
//! one method per HTTP verb. Synthesis renders the tree together with the
//! deployment, the `prod` stage, the CloudWatch logging role and the
//! invoke permissions every Lambda-backed method needs.

mod cors;
mod integration;
mod routes;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::construct::{self, DEFAULT, RESOURCE};
use crate::error::{ConstructError, Result};
use crate::intrinsics;
use crate::lambda::FunctionRef;
use crate::template::{Output, Resource};

pub use cors::{
    add_cors_options, cors_headers, cors_mock_integration, ALLOW_CREDENTIALS, ALLOW_HEADERS,
    ALLOW_METHODS, ALLOW_ORIGIN,
};
pub use integration::{
    Integration, IntegrationResponse, MethodOptions, MethodResponse, MockIntegration,
    PassthroughBehavior, METHOD_RESPONSE_HEADER,
};
pub use routes::{ResolvedRoute, Route, RouteTarget};

pub const DEFAULT_STAGE: &str = "prod";

const TEST_INVOKE_STAGE: &str = "test-invoke-stage";
const PUSH_TO_CLOUDWATCH: &str = "service-role/AmazonAPIGatewayPushToCloudWatchLogs";

/// HTTP verbs a method can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Any,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Any => "ANY",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ConstructError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ANY" => Ok(HttpMethod::Any),
            "DELETE" => Ok(HttpMethod::Delete),
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "PATCH" => Ok(HttpMethod::Patch),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(ConstructError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a resource inside a [`RestApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceId(usize);

/// A method bound to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub http_method: HttpMethod,
    pub integration: Integration,
    pub options: MethodOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ApiResource {
    /// `None` for the root.
    path_part: Option<String>,
    parent: Option<ResourceId>,
    children: Vec<ResourceId>,
    methods: BTreeMap<HttpMethod, Method>,
}

/// A REST API and its resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApi {
    pub id: String,
    pub name: String,
    pub stage_name: String,
    /// Create the account-level role that lets API Gateway write logs.
    pub cloud_watch_role: bool,
    resources: Vec<ApiResource>,
}

impl RestApi {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stage_name: DEFAULT_STAGE.to_string(),
            cloud_watch_role: true,
            resources: vec![ApiResource {
                path_part: None,
                parent: None,
                children: Vec::new(),
                methods: BTreeMap::new(),
            }],
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = stage_name.into();
        self
    }

    pub fn without_cloud_watch_role(mut self) -> Self {
        self.cloud_watch_role = false;
        self
    }

    /// The `/` resource.
    pub fn root(&self) -> ResourceId {
        ResourceId(0)
    }

    /// Adds a child resource under `parent`.
    ///
    /// `path_part` is a literal segment (`trips`) or a path parameter
    /// (`{id}`, `{proxy+}`).
    pub fn add_resource(&mut self, parent: ResourceId, path_part: &str) -> Result<ResourceId> {
        validate_path_part(path_part)?;
        let parent_resource = self.get(parent)?;
        let duplicate = parent_resource
            .children
            .iter()
            .any(|child| self.resources[child.0].path_part.as_deref() == Some(path_part));
        if duplicate {
            return Err(ConstructError::DuplicatePathPart {
                parent: self.path(parent),
                path_part: path_part.to_string(),
            });
        }

        let id = ResourceId(self.resources.len());
        self.resources.push(ApiResource {
            path_part: Some(path_part.to_string()),
            parent: Some(parent),
            children: Vec::new(),
            methods: BTreeMap::new(),
        });
        self.resources[parent.0].children.push(id);
        tracing::debug!(api = %self.id, path = %self.path(id), "added API resource");
        Ok(id)
    }

    /// Binds `http_method` on `resource` to an integration.
    pub fn add_method(
        &mut self,
        resource: ResourceId,
        http_method: HttpMethod,
        integration: Integration,
        options: MethodOptions,
    ) -> Result<()> {
        self.get(resource)?;
        if self.resources[resource.0].methods.contains_key(&http_method) {
            return Err(ConstructError::DuplicateMethod {
                path: self.path(resource),
                method: http_method.to_string(),
            });
        }
        self.resources[resource.0].methods.insert(
            http_method,
            Method {
                http_method,
                integration,
                options,
            },
        );
        tracing::debug!(
            api = %self.id,
            path = %self.path(resource),
            method = %http_method,
            "added API method"
        );
        Ok(())
    }

    pub fn method(&self, resource: ResourceId, http_method: HttpMethod) -> Option<&Method> {
        self.resources
            .get(resource.0)
            .and_then(|r| r.methods.get(&http_method))
    }

    /// The request path of a resource, e.g. `/trips/{id}`.
    pub fn path(&self, resource: ResourceId) -> String {
        let parts = self.path_parts(resource);
        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        }
    }

    /// Functions referenced by Lambda integrations anywhere in the tree.
    pub fn functions(&self) -> Vec<&FunctionRef> {
        self.resources
            .iter()
            .flat_map(|resource| resource.methods.values())
            .filter_map(|method| method.integration.function())
            .collect()
    }

    pub fn logical_id(&self) -> String {
        construct::logical_id(&[&self.id, RESOURCE])
    }

    fn get(&self, resource: ResourceId) -> Result<&ApiResource> {
        self.resources
            .get(resource.0)
            .ok_or(ConstructError::UnknownResource)
    }

    fn path_parts(&self, resource: ResourceId) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut current = Some(resource);
        while let Some(id) = current {
            let Some(node) = self.resources.get(id.0) else {
                break;
            };
            if let Some(part) = &node.path_part {
                parts.push(part.as_str());
            }
            current = node.parent;
        }
        parts.reverse();
        parts
    }

    fn construct_path(&self, resource: ResourceId) -> Vec<&str> {
        let mut path = vec![self.id.as_str(), DEFAULT];
        path.extend(self.path_parts(resource));
        path
    }

    fn resource_logical_id(&self, resource: ResourceId) -> Option<String> {
        if resource == self.root() {
            return None;
        }
        let mut path = self.construct_path(resource);
        path.push(RESOURCE);
        Some(construct::logical_id(&path))
    }

    fn method_logical_id(&self, resource: ResourceId, http_method: HttpMethod) -> String {
        let mut path = self.construct_path(resource);
        path.extend([http_method.as_str(), RESOURCE]);
        construct::logical_id(&path)
    }

    fn permission_logical_id(
        &self,
        resource: ResourceId,
        http_method: HttpMethod,
        suffix: &str,
    ) -> String {
        let mut path = self.construct_path(resource);
        path.extend([http_method.as_str(), suffix]);
        construct::logical_id(&path)
    }

    fn resource_id_value(&self, resource: ResourceId) -> Value {
        match self.resource_logical_id(resource) {
            Some(logical_id) => intrinsics::reference(&logical_id),
            None => intrinsics::get_att(&self.logical_id(), "RootResourceId"),
        }
    }

    fn stage_logical_id(&self) -> String {
        construct::logical_id(&[
            &self.id,
            &format!("DeploymentStage.{}", self.stage_name),
            RESOURCE,
        ])
    }

    fn cloud_watch_role_logical_id(&self) -> String {
        construct::logical_id(&[&self.id, "CloudWatchRole", RESOURCE])
    }

    fn account_logical_id(&self) -> String {
        construct::logical_id(&[&self.id, "Account"])
    }

    pub fn endpoint_output_id(&self) -> String {
        construct::logical_id(&[&self.id, "Endpoint"])
    }

    /// `https://<api>.execute-api.<region>.<suffix>/<stage>/`
    pub fn url(&self, region: Option<&str>) -> Value {
        intrinsics::join(
            "",
            vec![
                json!("https://"),
                intrinsics::reference(&self.logical_id()),
                json!(".execute-api."),
                intrinsics::region(region),
                json!("."),
                intrinsics::aws_url_suffix(),
                json!("/"),
                intrinsics::reference(&self.stage_logical_id()),
                json!("/"),
            ],
        )
    }

    pub fn endpoint_output(&self, region: Option<&str>) -> (String, Output) {
        (
            self.endpoint_output_id(),
            Output {
                value: self.url(region),
                description: Some(format!("Endpoint of the {} API", self.name)),
            },
        )
    }

    /// Renders every resource of the API, keyed by logical id.
    pub fn to_resources(&self, region: Option<&str>) -> Vec<(String, Resource)> {
        let api_logical_id = self.logical_id();
        let api = Resource::new("AWS::ApiGateway::RestApi")
            .with_property("Name", json!(self.name));
        let mut rendered = vec![(api_logical_id.clone(), api)];
        let mut deployment_dependencies = Vec::new();

        for index in 0..self.resources.len() {
            let id = ResourceId(index);
            let node = &self.resources[index];

            if let (Some(logical_id), Some(parent), Some(path_part)) =
                (self.resource_logical_id(id), node.parent, &node.path_part)
            {
                rendered.push((
                    logical_id.clone(),
                    Resource::new("AWS::ApiGateway::Resource")
                        .with_property("ParentId", self.resource_id_value(parent))
                        .with_property("PathPart", json!(path_part))
                        .with_property("RestApiId", intrinsics::reference(&api_logical_id)),
                ));
                deployment_dependencies.push(logical_id);
            }

            for method in node.methods.values() {
                let method_logical_id = self.method_logical_id(id, method.http_method);
                let method_resource = self.method_resource(id, method, region);
                rendered.push((method_logical_id.clone(), method_resource));
                deployment_dependencies.push(method_logical_id);

                if let Integration::Lambda(function) = &method.integration {
                    let permissions =
                        self.invoke_permissions(id, method.http_method, function, region);
                    rendered.extend(permissions);
                }
            }
        }

        let rendered_json = serde_json::to_string(&rendered).unwrap_or_default();
        let deployment_hash = construct::short_hash(rendered_json.as_bytes());
        let deployment_logical_id = format!(
            "{}{}",
            construct::logical_id(&[&self.id, "Deployment", RESOURCE]),
            deployment_hash
        );

        let mut deployment = Resource::new("AWS::ApiGateway::Deployment")
            .with_property("RestApiId", intrinsics::reference(&api_logical_id))
            .with_property(
                "Description",
                json!("Automatically created by the RestApi construct"),
            );
        for dependency in deployment_dependencies {
            deployment = deployment.with_dependency(dependency);
        }

        let mut stage = Resource::new("AWS::ApiGateway::Stage")
            .with_property("RestApiId", intrinsics::reference(&api_logical_id))
            .with_property(
                "DeploymentId",
                intrinsics::reference(&deployment_logical_id),
            )
            .with_property("StageName", json!(self.stage_name));

        if self.cloud_watch_role {
            let role_logical_id = self.cloud_watch_role_logical_id();
            let account_logical_id = self.account_logical_id();
            rendered.push((
                role_logical_id.clone(),
                Resource::new("AWS::IAM::Role")
                    .with_property(
                        "AssumeRolePolicyDocument",
                        json!({
                            "Statement": [{
                                "Action": "sts:AssumeRole",
                                "Effect": "Allow",
                                "Principal": { "Service": "apigateway.amazonaws.com" },
                            }],
                            "Version": "2012-10-17",
                        }),
                    )
                    .with_property(
                        "ManagedPolicyArns",
                        json!([intrinsics::managed_policy_arn(PUSH_TO_CLOUDWATCH)]),
                    ),
            ));
            rendered.push((
                account_logical_id.clone(),
                Resource::new("AWS::ApiGateway::Account")
                    .with_property(
                        "CloudWatchRoleArn",
                        intrinsics::get_att(&role_logical_id, "Arn"),
                    )
                    .with_dependency(api_logical_id.clone()),
            ));
            stage = stage.with_dependency(account_logical_id);
        }

        rendered.push((deployment_logical_id, deployment));
        rendered.push((self.stage_logical_id(), stage));
        rendered
    }

    fn method_resource(
        &self,
        resource: ResourceId,
        method: &Method,
        region: Option<&str>,
    ) -> Resource {
        let mut rendered = Resource::new("AWS::ApiGateway::Method")
            .with_property("HttpMethod", json!(method.http_method.as_str()))
            .with_property("ResourceId", self.resource_id_value(resource))
            .with_property("RestApiId", intrinsics::reference(&self.logical_id()))
            .with_property("AuthorizationType", json!("NONE"))
            .with_property("Integration", method.integration.to_value(region));

        if !method.options.method_responses.is_empty() {
            let responses: Vec<Value> = method
                .options
                .method_responses
                .iter()
                .map(MethodResponse::to_value)
                .collect();
            rendered = rendered.with_property("MethodResponses", json!(responses));
        }

        rendered
    }

    /// Permissions letting the stage, and the console's test invocations,
    /// call `function` through this method.
    fn invoke_permissions(
        &self,
        resource: ResourceId,
        http_method: HttpMethod,
        function: &FunctionRef,
        region: Option<&str>,
    ) -> Vec<(String, Resource)> {
        // Path parameters are matched by wildcards in execute-api ARNs.
        let arn_path: String = self
            .path_parts(resource)
            .into_iter()
            .map(|part| if part.starts_with('{') { "*" } else { part })
            .fold(String::new(), |mut acc, part| {
                acc.push('/');
                acc.push_str(part);
                acc
            });
        let arn_path = if arn_path.is_empty() {
            "/".to_string()
        } else {
            arn_path
        };

        let source_arn = |stage: Value| {
            intrinsics::join(
                "",
                vec![
                    json!("arn:"),
                    intrinsics::aws_partition(),
                    json!(":execute-api:"),
                    intrinsics::region(region),
                    json!(":"),
                    intrinsics::aws_account_id(),
                    json!(":"),
                    intrinsics::reference(&self.logical_id()),
                    json!("/"),
                    stage,
                    json!(format!("/{}{}", http_method.as_str(), arn_path)),
                ],
            )
        };

        let permission = |source: Value| {
            Resource::new("AWS::Lambda::Permission")
                .with_property("Action", json!("lambda:InvokeFunction"))
                .with_property("FunctionName", function.arn())
                .with_property("Principal", json!("apigateway.amazonaws.com"))
                .with_property("SourceArn", source)
        };

        vec![
            (
                self.permission_logical_id(resource, http_method, "ApiPermission"),
                permission(source_arn(intrinsics::reference(&self.stage_logical_id()))),
            ),
            (
                self.permission_logical_id(resource, http_method, "ApiPermissionTest"),
                permission(source_arn(json!(TEST_INVOKE_STAGE))),
            ),
        ]
    }
}

fn validate_path_part(path_part: &str) -> Result<()> {
    let invalid = || ConstructError::InvalidPathPart(path_part.to_string());
    if path_part.is_empty() || path_part.contains('/') {
        return Err(invalid());
    }
    let opens = path_part.starts_with('{');
    let closes = path_part.ends_with('}');
    if opens != closes {
        return Err(invalid());
    }
    construct::validate_id(path_part).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSource;
    use crate::lambda::{Code, FunctionConfig};

    fn function(id: &str) -> FunctionRef {
        FunctionConfig::new(
            id,
            "index.handler",
            Code::Asset(AssetSource::new("lambda", "abc123")),
        )
        .reference()
    }

    fn trips_api() -> (RestApi, ResourceId, ResourceId) {
        let mut api = RestApi::new("tripsApi", "Trips Service");
        let trips = api.add_resource(api.root(), "trips").unwrap();
        let single = api.add_resource(trips, "{id}").unwrap();
        api.add_method(
            trips,
            HttpMethod::Get,
            Integration::lambda(&function("GetTripsHandler")),
            MethodOptions::default(),
        )
        .unwrap();
        api.add_method(
            single,
            HttpMethod::Get,
            Integration::lambda(&function("GetTripDetailsHandler")),
            MethodOptions::default(),
        )
        .unwrap();
        (api, trips, single)
    }

    fn rendered(api: &RestApi) -> BTreeMap<String, Resource> {
        api.to_resources(None).into_iter().collect()
    }

    #[test]
    fn test_paths() {
        let (api, trips, single) = trips_api();
        assert_eq!(api.path(api.root()), "/");
        assert_eq!(api.path(trips), "/trips");
        assert_eq!(api.path(single), "/trips/{id}");
    }

    #[test]
    fn test_duplicate_path_part_is_rejected() {
        let (mut api, _, _) = trips_api();
        let root = api.root();
        assert_eq!(
            api.add_resource(root, "trips"),
            Err(ConstructError::DuplicatePathPart {
                parent: "/".to_string(),
                path_part: "trips".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_path_parts_are_rejected() {
        let mut api = RestApi::new("api", "Api");
        let root = api.root();
        for part in ["", "a/b", "{id", "id}", "{}"] {
            assert!(api.add_resource(root, part).is_err(), "accepted {part:?}");
        }
    }

    #[test]
    fn test_duplicate_method_is_rejected() {
        let (mut api, trips, _) = trips_api();
        let result = api.add_method(
            trips,
            HttpMethod::Get,
            Integration::lambda(&function("Other")),
            MethodOptions::default(),
        );
        assert!(matches!(result, Err(ConstructError::DuplicateMethod { .. })));
    }

    #[test]
    fn test_unknown_resource_is_rejected() {
        let mut api = RestApi::new("api", "Api");
        let result = api.add_resource(ResourceId(7), "x");
        assert_eq!(result, Err(ConstructError::UnknownResource));
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("get".parse(), Ok(HttpMethod::Get));
        assert_eq!("OPTIONS".parse(), Ok(HttpMethod::Options));
        assert!("FETCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_rendered_resource_types() {
        let (api, _, _) = trips_api();
        let resources = rendered(&api);
        let count = |resource_type: &str| {
            resources
                .values()
                .filter(|r| r.resource_type == resource_type)
                .count()
        };
        assert_eq!(count("AWS::ApiGateway::RestApi"), 1);
        assert_eq!(count("AWS::ApiGateway::Resource"), 2);
        assert_eq!(count("AWS::ApiGateway::Method"), 2);
        assert_eq!(count("AWS::Lambda::Permission"), 4);
        assert_eq!(count("AWS::ApiGateway::Deployment"), 1);
        assert_eq!(count("AWS::ApiGateway::Stage"), 1);
        assert_eq!(count("AWS::ApiGateway::Account"), 1);
    }

    #[test]
    fn test_child_resource_points_at_parent() {
        let (api, trips, single) = trips_api();
        let resources = rendered(&api);
        let trips_id = api.resource_logical_id(trips).unwrap();
        let single_resource = &resources[&api.resource_logical_id(single).unwrap()];
        assert_eq!(
            single_resource.property("ParentId"),
            Some(&json!({"Ref": trips_id}))
        );
        assert_eq!(
            resources[&trips_id].property("ParentId"),
            Some(&json!({"Fn::GetAtt": [api.logical_id(), "RootResourceId"]}))
        );
    }

    #[test]
    fn test_permission_arn_uses_wildcard_for_path_parameters() {
        let (api, _, single) = trips_api();
        let resources = rendered(&api);
        let permission =
            &resources[&api.permission_logical_id(single, HttpMethod::Get, "ApiPermissionTest")];
        let parts = permission.property("SourceArn").unwrap()["Fn::Join"][1]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(parts[9], json!("test-invoke-stage"));
        assert_eq!(parts[10], json!("/GET/trips/*"));
    }

    #[test]
    fn test_deployment_id_changes_with_methods() {
        let (api, trips, _) = trips_api();
        let deployment_id = |api: &RestApi| {
            rendered(api)
                .into_iter()
                .find(|(_, r)| r.resource_type == "AWS::ApiGateway::Deployment")
                .map(|(id, _)| id)
                .unwrap()
        };
        let before = deployment_id(&api);
        let mut changed = api.clone();
        add_cors_options(&mut changed, trips).unwrap();
        assert_ne!(before, deployment_id(&changed));
        assert_eq!(before, deployment_id(&api));
    }

    #[test]
    fn test_without_cloud_watch_role() {
        let (api, _, _) = trips_api();
        let resources = rendered(&api.without_cloud_watch_role());
        assert!(!resources
            .values()
            .any(|r| r.resource_type == "AWS::ApiGateway::Account"));
    }

    #[test]
    fn test_functions_lists_lambda_targets() {
        let (api, _, _) = trips_api();
        let ids: Vec<&str> = api.functions().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["GetTripsHandler", "GetTripDetailsHandler"]);
    }
}
