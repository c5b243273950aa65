//! The trips service stack: one table, three handlers, one REST API.

use crate::apigateway::{add_cors_options, HttpMethod, Integration, MethodOptions, RestApi};
use crate::construct;
use crate::dynamodb::{KeyAttribute, RemovalPolicy, TableConfig};
use crate::error::Result;
use crate::lambda::{make_handler, Code, Runtime};
use crate::stack::Stack;

pub const DEFAULT_STACK_NAME: &str = "TripsStack";
pub const DEFAULT_TABLE_NAME: &str = "tripsTemp";
pub const DEFAULT_PARTITION_KEY: &str = "myPk";
pub const DEFAULT_API_NAME: &str = "Trips Service";

pub const TABLE_ID: &str = "Trips";
pub const API_ID: &str = "tripsApi";

pub const CREATE_PREFERENCES_HANDLER: &str = "TripPreferencesHandler";
pub const LIST_TRIPS_HANDLER: &str = "GetTripsHandler";
pub const TRIP_DETAILS_HANDLER: &str = "GetTripDetailsHandler";

/// Settings for [`trips_stack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripsStackProps {
    pub stack_name: String,
    pub table_name: String,
    pub partition_key: String,
    /// Defaults to [`RemovalPolicy::Retain`]; `Destroy` deletes all trip
    /// data on teardown.
    pub removal_policy: RemovalPolicy,
    pub runtime: Runtime,
    pub code: Code,
    pub api_name: String,
    pub region: Option<String>,
}

impl TripsStackProps {
    pub fn new(code: Code) -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
            removal_policy: RemovalPolicy::default(),
            runtime: Runtime::default(),
            code,
            api_name: DEFAULT_API_NAME.to_string(),
            region: None,
        }
    }

    pub fn with_stack_name(mut self, name: impl Into<String>) -> Self {
        self.stack_name = name.into();
        self
    }

    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = key.into();
        self
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    pub fn with_runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }
}

/// Declares the trips stack.
///
/// Construction order follows the dependencies: the table, then the
/// handlers that read its name, then the grants between them, then the API
/// routing to the handlers.
pub fn trips_stack(props: &TripsStackProps) -> Result<Stack> {
    construct::validate_stack_name(&props.stack_name)?;
    let mut stack = Stack::new(&props.stack_name)
        .with_description("Trips service: DynamoDB table, Lambda handlers and REST API")
        .with_region(props.region.clone());

    if props.removal_policy == RemovalPolicy::Destroy {
        tracing::warn!(
            table = %props.table_name,
            "table removal policy is destroy: tearing down the stack deletes all trip data"
        );
    }

    let table = stack.add_table(
        TableConfig::new(TABLE_ID, KeyAttribute::string(&props.partition_key))
            .with_table_name(&props.table_name)
            .with_removal_policy(props.removal_policy),
    )?;

    let handler = |id: &str, entry_point: &str| {
        make_handler(id, entry_point, &table, props.code.clone())
            .with_runtime(props.runtime)
    };
    let create_preferences = stack.add_function(
        handler(CREATE_PREFERENCES_HANDLER, "trip-preferences.handler")
            .with_description("Stores the trip preferences of a traveller"),
    )?;
    let list_trips = stack.add_function(
        handler(LIST_TRIPS_HANDLER, "get-trips.handler")
            .with_description("Lists all trips"),
    )?;
    let trip_details = stack.add_function(
        handler(TRIP_DETAILS_HANDLER, "get-trip-details.handler")
            .with_description("Returns a single trip by id"),
    )?;

    for function in [&create_preferences, &list_trips, &trip_details] {
        stack.grant_read_write_data(&table, function)?;
    }

    let mut api = RestApi::new(API_ID, &props.api_name);
    let trips = api.add_resource(api.root(), "trips")?;
    api.add_method(
        trips,
        HttpMethod::Get,
        Integration::lambda(&list_trips),
        MethodOptions::default(),
    )?;
    api.add_method(
        trips,
        HttpMethod::Post,
        Integration::lambda(&create_preferences),
        MethodOptions::default(),
    )?;
    add_cors_options(&mut api, trips)?;

    let single_trip = api.add_resource(trips, "{id}")?;
    api.add_method(
        single_trip,
        HttpMethod::Get,
        Integration::lambda(&trip_details),
        MethodOptions::default(),
    )?;
    stack.add_rest_api(api)?;

    tracing::info!(stack = %stack.name, routes = stack.routes().len(), "declared trips stack");
    Ok(stack)
}
