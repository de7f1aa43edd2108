// One handler per route; parameters are already validated against the route
// table when these run.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::atal::ResourceKind;
use crate::booking::BookingParty;
use crate::connector::Connector;
use crate::error::{GatewayError, GatewayResult};
use crate::merge::merge;
use crate::model::{BookingInterval, Granularity, ReservationEntry, ResourceEntry, ThematicEntry};
use crate::routes::Params;
use crate::thematic::ThematicFilter;

type Reply = BoxFuture<'static, GatewayResult<Value>>;

fn to_data<T: Serialize>(data: T) -> GatewayResult<Value> {
    serde_json::to_value(data).map_err(|e| GatewayError::encoding("response", e))
}

// Rooms unless told otherwise
fn resource_kind(params: &Params) -> GatewayResult<ResourceKind> {
    match params.text("kind") {
        None => Ok(ResourceKind::default()),
        Some(value) => ResourceKind::parse(value)
            .ok_or_else(|| GatewayError::validation(format!("unknown resource kind: {}", value))),
    }
}

pub fn rooms_name(connector: Arc<Connector>, params: Params) -> Reply {
    async move {
        let kind = resource_kind(&params)?;
        let resources = connector.resolver.loanable(kind, None).await?;
        let entries: Vec<ResourceEntry> = resources.into_iter().map(ResourceEntry::from).collect();
        to_data(entries)
    }
    .boxed()
}

pub fn dates_dispo(connector: Arc<Connector>, params: Params) -> Reply {
    async move {
        let kind = resource_kind(&params)?;
        let reservations = connector
            .availability
            .upcoming_reservations(kind, params.integer("room")?, params.integer("delai")?)
            .await?;
        let entries: Vec<ReservationEntry> = reservations
            .into_iter()
            .map(ReservationEntry::from)
            .collect();
        to_data(entries)
    }
    .boxed()
}

async fn availability(
    connector: Arc<Connector>,
    params: Params,
    granularity: Granularity,
) -> GatewayResult<Value> {
    let kind = resource_kind(&params)?;
    let slots = connector
        .availability
        .compute_free_slots(
            kind,
            params.integer("room")?,
            params.integer("start")?,
            params.integer("end")?,
            granularity,
        )
        .await?;
    to_data(slots)
}

pub fn day_availability(connector: Arc<Connector>, params: Params) -> Reply {
    availability(connector, params, Granularity::Day).boxed()
}

pub fn hour_availability(connector: Arc<Connector>, params: Params) -> Reply {
    availability(connector, params, Granularity::Hour).boxed()
}

pub fn bookings_room(connector: Arc<Connector>, params: Params) -> Reply {
    async move {
        let kind = resource_kind(&params)?;
        let resource_id = params.integer("room")?;
        let party = BookingParty {
            people_planned: params.integer("nombre_personne_prevue")?,
            people_actual: params.integer("nombre_personne_reel")?,
            third_party_id: params.integer("id_tier")?,
        };

        let raw = params
            .body_field("booking_dates")
            .cloned()
            .ok_or_else(|| GatewayError::validation("missing required parameter: booking_dates"))?;
        let requested: Vec<BookingInterval> = serde_json::from_value(raw)
            .map_err(|e| GatewayError::validation(format!("invalid booking_dates: {}", e)))?;

        let merged = merge(&requested)?;
        let created = connector
            .bookings
            .book(kind, resource_id, &merged, party)
            .await?;
        to_data(created)
    }
    .boxed()
}

pub fn natures(connector: Arc<Connector>, params: Params) -> Reply {
    async move {
        let filter = ThematicFilter {
            primary_only: params.boolean("primary_only")?,
            secondary_only: params.boolean("secondary_only")?,
            parent_id: params.optional_integer("parent_id")?,
        };
        let thematics = connector.thematics.list_thematics(filter).await?;
        let entries: Vec<ThematicEntry> = thematics.into_iter().map(ThematicEntry::from).collect();
        to_data(entries)
    }
    .boxed()
}

pub fn test_connection(connector: Arc<Connector>, _params: Params) -> Reply {
    async move { connector.test_connection().await.map(Value::String) }.boxed()
}

pub fn create_work_request(connector: Arc<Connector>, params: Params) -> Reply {
    async move {
        let body = params.body()?;
        connector.work_requests.create(body).await
    }
    .boxed()
}

pub fn third_parties(connector: Arc<Connector>, params: Params) -> Reply {
    async move { connector.third_parties(params.text("email")).await }.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotConfig;
    use crate::facility_api::mock_api::MockFacilityApi;
    use crate::routes::router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(api: &Arc<MockFacilityApi>) -> Router {
        router(Arc::new(Connector::new(api.clone(), SlotConfig::default())))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_unencodable_data_is_an_internal_error() {
        // Non-string map keys have no JSON form
        let data = std::collections::HashMap::from([((1, 2), "x")]);
        match to_data(data) {
            Err(error @ GatewayError::Internal(_)) => {
                assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("Expected internal error, got {:?}", other),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn family_of_room_12(api: &MockFacilityApi) {
        api.on_get("/api/Rooms/12", json!({"Id": 12, "Name": "Salle du conseil", "ParentId": null}))
            .on_get("/api/Rooms", json!([]))
            .on_get("/api/RoomLoans", json!([]));
    }

    #[tokio::test]
    async fn test_rooms_name_lists_loanable_rooms() {
        let api = Arc::new(MockFacilityApi::new());
        api.on_get(
            "/api/Rooms",
            json!([
                {"Id": 12, "Name": "Salle du conseil", "ParentId": null, "IsLoanable": true},
                {"Id": 13, "Name": "Salle du conseil A", "ParentId": 12, "IsLoanable": true}
            ]),
        );

        let (status, payload) = call(app(&api), get("/get-rooms-name")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            payload["data"],
            json!([
                {"id": 12, "text": "Salle du conseil", "parent_id": null},
                {"id": 13, "text": "Salle du conseil A", "parent_id": 12}
            ])
        );
        assert_eq!(api.calls()[0].filter(), Some("IsLoanable eq true"));
    }

    #[tokio::test]
    async fn test_material_kind_switches_collections() {
        let api = Arc::new(MockFacilityApi::new());
        api.on_get("/api/Materials", json!([{"Id": 40, "Name": "Projecteur"}]));

        let (status, payload) = call(app(&api), get("/get-rooms-name?kind=material")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"][0]["text"], "Projecteur");
        assert_eq!(api.calls()[0].path, "/api/Materials");
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let api = Arc::new(MockFacilityApi::new());

        let (status, payload) = call(app(&api), get("/get-rooms-name?kind=vehicle")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["err_desc"], "Validation error: unknown resource kind: vehicle");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_day_availability_returns_one_slot_per_day() {
        let api = Arc::new(MockFacilityApi::new());
        family_of_room_12(&api);

        let (status, payload) =
            call(app(&api), get("/generate-day-availability?room=12&start=1&end=3")).await;
        assert_eq!(status, StatusCode::OK);
        let slots = payload["data"].as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|slot| slot["disabled"] == false));
    }

    #[tokio::test]
    async fn test_hour_availability_uses_opening_hours() {
        let api = Arc::new(MockFacilityApi::new());
        family_of_room_12(&api);

        let (status, payload) =
            call(app(&api), get("/generate-hour-availability?room=12&start=0&end=0")).await;
        assert_eq!(status, StatusCode::OK);
        let slots = payload["data"].as_array().unwrap();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0]["start_time"], "08:00");
        assert_eq!(slots[9]["end_time"], "17:59");
    }

    #[tokio::test]
    async fn test_oversized_window_is_rejected_before_calling_atal() {
        let api = Arc::new(MockFacilityApi::new());
        family_of_room_12(&api);

        let (status, payload) =
            call(app(&api), get("/generate-hour-availability?room=12&start=0&end=1000000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload["err_desc"],
            "Validation error: availability window spans 1000000 days, at most 366 allowed"
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dates_dispo_requires_delay() {
        let api = Arc::new(MockFacilityApi::new());

        let (status, payload) = call(app(&api), get("/get-dates-dispo?room=12")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["err_desc"], "Validation error: missing required parameter: delai");
    }

    #[tokio::test]
    async fn test_remote_failure_surfaces_as_bad_gateway() {
        let api = Arc::new(MockFacilityApi::new());
        api.fail_next_requests(1);

        let (status, payload) = call(app(&api), get("/get-natures")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(payload["err_class"], "RemoteServiceError");
    }

    #[tokio::test]
    async fn test_bookings_merge_contiguous_intervals() {
        let api = Arc::new(MockFacilityApi::new());
        let body = json!({
            "booking_dates": [
                {"start_date": "2024-01-01", "start_time": "08:00", "end_date": "2024-01-01", "end_time": "08:59"},
                {"start_date": "2024-01-01", "start_time": "09:00", "end_date": "2024-01-01", "end_time": "09:59"},
                {"start_date": "2024-01-01", "start_time": "14:00", "end_date": "2024-01-01", "end_time": "14:59"}
            ]
        });
        let request = Request::post(
            "/bookings-room?room=12&nombre_personne_prevue=20&nombre_personne_reel=18&id_tier=501",
        )
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

        let (status, payload) = call(app(&api), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["data"], json!([{"Id": 1000}, {"Id": 1001}]));

        let posts = api.posts();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|call| call.path == "/api/RoomLoans"));
        let first = posts[0].body.as_ref().unwrap();
        assert_eq!(first["StartDate"], "2024-01-01T08:00:00");
        assert_eq!(first["EndDate"], "2024-01-01T09:59:00");
        assert_eq!(first["RequesterId"], 501);
    }

    #[tokio::test]
    async fn test_bookings_reject_empty_list() {
        let api = Arc::new(MockFacilityApi::new());
        let request = Request::post(
            "/bookings-room?room=12&nombre_personne_prevue=2&nombre_personne_reel=2&id_tier=1",
        )
        .body(Body::from(r#"{"booking_dates": []}"#))
        .unwrap();

        let (status, _) = call(app(&api), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_natures_sorted_with_text_label() {
        let api = Arc::new(MockFacilityApi::new());
        api.on_get(
            "/api/Thematics",
            json!([
                {"Id": 2, "Label": "Voirie", "CompleteLabel": "Voirie", "ParentId": null, "IsArchived": false},
                {"Id": 1, "Label": "Eclairage", "CompleteLabel": "Eclairage", "ParentId": null, "IsArchived": false}
            ]),
        );

        let (_, payload) = call(app(&api), get("/get-natures?primary_only=true")).await;
        assert_eq!(payload["data"][0]["id"], 1);
        assert_eq!(payload["data"][0]["text"], "Eclairage");
        assert_eq!(payload["data"][1]["id"], 2);
    }
}
