// Explicit route table: every endpoint with its parameter schema, checked
// before the handler runs.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tracing::debug;

use crate::connector::Connector;
use crate::error::{GatewayError, GatewayResult};
use crate::handlers;

pub type Handler = fn(Arc<Connector>, Params) -> BoxFuture<'static, GatewayResult<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Number,
    Boolean,
    Text,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Query,
    Body,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub source: ParamSource,
    pub required: bool,
}

const fn query(name: &'static str, kind: ParamKind, required: bool) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        source: ParamSource::Query,
        required,
    }
}

const fn body(name: &'static str, kind: ParamKind, required: bool) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        source: ParamSource::Body,
        required,
    }
}

pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub handler: Handler,
}

const KIND: ParamSpec = query("kind", ParamKind::Text, false);
const ROOM: ParamSpec = query("room", ParamKind::Integer, true);

pub static ROUTES: &[Route] = &[
    Route {
        method: Method::Get,
        path: "/get-rooms-name",
        description: "Loanable rooms (or materials)",
        params: &[KIND],
        handler: handlers::rooms_name,
    },
    Route {
        method: Method::Get,
        path: "/get-dates-dispo",
        description: "Upcoming loans of a room and its family",
        params: &[ROOM, query("delai", ParamKind::Integer, true), KIND],
        handler: handlers::dates_dispo,
    },
    Route {
        method: Method::Get,
        path: "/generate-day-availability",
        description: "Day slots with their availability",
        params: &[
            ROOM,
            query("start", ParamKind::Integer, true),
            query("end", ParamKind::Integer, true),
            KIND,
        ],
        handler: handlers::day_availability,
    },
    Route {
        method: Method::Get,
        path: "/generate-hour-availability",
        description: "Hour slots with their availability",
        params: &[
            ROOM,
            query("start", ParamKind::Integer, true),
            query("end", ParamKind::Integer, true),
            KIND,
        ],
        handler: handlers::hour_availability,
    },
    Route {
        method: Method::Post,
        path: "/bookings-room",
        description: "Book a room for the given intervals",
        params: &[
            ROOM,
            query("nombre_personne_prevue", ParamKind::Integer, true),
            query("nombre_personne_reel", ParamKind::Integer, true),
            query("id_tier", ParamKind::Integer, true),
            KIND,
            body("booking_dates", ParamKind::Array, true),
        ],
        handler: handlers::bookings_room,
    },
    Route {
        method: Method::Get,
        path: "/get-natures",
        description: "Active thematics sorted by label",
        params: &[
            query("primary_only", ParamKind::Boolean, false),
            query("secondary_only", ParamKind::Boolean, false),
            query("parent_id", ParamKind::Integer, false),
        ],
        handler: handlers::natures,
    },
    Route {
        method: Method::Get,
        path: "/test",
        description: "ATAL connectivity probe",
        params: &[],
        handler: handlers::test_connection,
    },
    Route {
        method: Method::Post,
        path: "/create-work-request",
        description: "Create a works request",
        params: &[
            body("atal_requester_id", ParamKind::Integer, true),
            body("atal_object", ParamKind::Text, true),
            body("atal_description", ParamKind::Text, true),
            body("atal_recipient_id", ParamKind::Integer, true),
            body("atal_requesting_department_id", ParamKind::Integer, true),
            body("atal_request_type", ParamKind::Integer, true),
            body("atal_localization", ParamKind::Text, true),
            body("atal_longitude", ParamKind::Number, true),
            body("atal_latitude", ParamKind::Number, true),
            body("atal_operator", ParamKind::Text, false),
            body("atal_desired_date", ParamKind::Text, false),
            body("atal_request_date", ParamKind::Text, false),
            body("atal_patrimony_id", ParamKind::Integer, false),
        ],
        handler: handlers::create_work_request,
    },
    Route {
        method: Method::Get,
        path: "/third-parties",
        description: "ATAL third parties, optionally by e-mail",
        params: &[query("email", ParamKind::Text, false)],
        handler: handlers::third_parties,
    },
];

/// Query string and JSON body of one incoming request.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl Params {
    pub fn new(query: HashMap<String, String>, body: Option<Value>) -> Self {
        Self { query, body }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn integer(&self, name: &str) -> GatewayResult<i64> {
        self.optional_integer(name)?
            .ok_or_else(|| missing(name))
    }

    pub fn optional_integer(&self, name: &str) -> GatewayResult<Option<i64>> {
        self.text(name)
            .map(|value| parse_integer(name, value))
            .transpose()
    }

    // Absent booleans read as false
    pub fn boolean(&self, name: &str) -> GatewayResult<bool> {
        self.text(name)
            .map(|value| parse_boolean(name, value))
            .transpose()
            .map(|value| value.unwrap_or(false))
    }

    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body
            .as_ref()
            .and_then(|body| body.get(name))
            .filter(|value| !value.is_null())
    }

    pub fn body(&self) -> GatewayResult<&Value> {
        self.body
            .as_ref()
            .ok_or_else(|| GatewayError::validation("request body is required"))
    }
}

fn missing(name: &str) -> GatewayError {
    GatewayError::validation(format!("missing required parameter: {}", name))
}

fn wrong_type(name: &str, expected: &str) -> GatewayError {
    GatewayError::validation(format!("parameter {} must be {}", name, expected))
}

fn parse_integer(name: &str, value: &str) -> GatewayResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| wrong_type(name, "an integer"))
}

fn parse_boolean(name: &str, value: &str) -> GatewayResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(wrong_type(name, "a boolean")),
    }
}

fn check_query_value(spec: &ParamSpec, value: &str) -> GatewayResult<()> {
    match spec.kind {
        ParamKind::Integer => parse_integer(spec.name, value).map(|_| ()),
        ParamKind::Number => value
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| wrong_type(spec.name, "a number")),
        ParamKind::Boolean => parse_boolean(spec.name, value).map(|_| ()),
        ParamKind::Text => Ok(()),
        ParamKind::Array => Err(wrong_type(spec.name, "sent in the request body")),
    }
}

fn check_body_value(spec: &ParamSpec, value: &Value) -> GatewayResult<()> {
    let ok = match spec.kind {
        ParamKind::Integer => value.is_i64(),
        ParamKind::Number => value.is_number(),
        ParamKind::Boolean => value.is_boolean(),
        ParamKind::Text => value.is_string(),
        ParamKind::Array => value.is_array(),
    };
    if ok {
        Ok(())
    } else {
        let expected = match spec.kind {
            ParamKind::Integer => "an integer",
            ParamKind::Number => "a number",
            ParamKind::Boolean => "a boolean",
            ParamKind::Text => "a string",
            ParamKind::Array => "a list",
        };
        Err(wrong_type(spec.name, expected))
    }
}

pub fn validate(specs: &[ParamSpec], params: &Params) -> GatewayResult<()> {
    for spec in specs {
        match spec.source {
            ParamSource::Query => match params.text(spec.name) {
                Some(value) => check_query_value(spec, value)?,
                None if spec.required => return Err(missing(spec.name)),
                None => {}
            },
            ParamSource::Body => match params.body_field(spec.name) {
                Some(value) => check_body_value(spec, value)?,
                None if spec.required => return Err(missing(spec.name)),
                None => {}
            },
        }
    }
    Ok(())
}

pub async fn dispatch(route: &'static Route, connector: Arc<Connector>, params: Params) -> Response {
    debug!(path = route.path, "Dispatching");
    let result = match validate(route.params, &params) {
        Ok(()) => (route.handler)(connector, params).await,
        Err(error) => Err(error),
    };
    match result {
        Ok(data) => Json(json!({ "err": 0, "data": data })).into_response(),
        Err(error) => error.into_response(),
    }
}

fn parse_body(bytes: &Bytes) -> GatewayResult<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| GatewayError::validation(format!("request body is not valid JSON: {}", e)))
}

type QueryString = Result<Query<HashMap<String, String>>, QueryRejection>;

fn parse_query(query: QueryString) -> GatewayResult<HashMap<String, String>> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| {
            GatewayError::validation(format!("invalid query string: {}", rejection.body_text()))
        })
}

async fn respond(
    route: &'static Route,
    connector: Arc<Connector>,
    params: GatewayResult<Params>,
) -> Response {
    match params {
        Ok(params) => dispatch(route, connector, params).await,
        Err(error) => error.into_response(),
    }
}

pub fn router(connector: Arc<Connector>) -> Router {
    let mut router = Router::new();
    for route in ROUTES {
        let method_router = match route.method {
            Method::Get => get(
                move |State(connector): State<Arc<Connector>>, query: QueryString| async move {
                    let params = parse_query(query).map(|query| Params::new(query, None));
                    respond(route, connector, params).await
                },
            ),
            Method::Post => post(
                move |State(connector): State<Arc<Connector>>,
                      query: QueryString,
                      bytes: Bytes| async move {
                    let params = parse_query(query)
                        .and_then(|query| Ok(Params::new(query, parse_body(&bytes)?)));
                    respond(route, connector, params).await
                },
            ),
        };
        router = router.route(route.path, method_router);
    }
    router.with_state(connector)
}
