
use super::*;
use crate::availability;
use crate::data_store::store_mock::StoreMock;
use crate::web::AppState;
use actix_web::{http, test, web, App};
use chrono::{DateTime, Utc};
use roomres_api_types::{
    AvailabilityInfo, LoginResponse, RegisterResponse, Reservation, Room, RoomStatus,
    RoomStatusInfo,
};
use std::sync::Arc;

const APP_SECRET: &str = "123456";

fn get_test_state() -> (AppState, Arc<StoreMock>) {
    let data_store_mock = Arc::new(StoreMock::default());
    sample_data::fill_sample_data(&data_store_mock);
    let state = AppState {
        store: data_store_mock.clone(),
        secret: APP_SECRET.to_string(),
        timezone: chrono_tz::UTC,
        session_max_age: std::time::Duration::from_secs(24 * 3600),
    };
    (state, data_store_mock)
}

fn bearer_header(user_id: crate::data_store::UserId) -> (http::header::HeaderName, String) {
    (
        http::header::AUTHORIZATION,
        format!("Bearer {}", SessionToken::new(user_id).as_string(APP_SECRET)),
    )
}

#[actix_web::test]
async fn test_index() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::get().uri("/api").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
}

#[actix_web::test]
async fn test_missing_authentication() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/rooms").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["httpCode"], 401);

    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header((http::header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/reservations")
        .append_header((http::header::AUTHORIZATION, "Bearer "))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_invalid_session_token() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header((http::header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::FORBIDDEN);

    let foreign_token = SessionToken::new(sample_data::USER_ID).as_string("other secret");
    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header((
            http::header::AUTHORIZATION,
            format!("Bearer {}", foreign_token),
        ))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::FORBIDDEN);

    // Session of a user, who does not exist
    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header(bearer_header(99))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_list_rooms() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let rooms: Vec<Room> = test::read_body_json(res).await;
    assert_eq!(rooms.len(), 6);
    assert_eq!(
        rooms.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert_eq!(rooms[2].room_type, "Suite");
    assert_eq!(rooms[2].capacity, 4);

    let req = test::TestRequest::get()
        .uri("/api/rooms/4")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/rooms/7")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_and_list_reservation() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 3,
            "startTime": "2025-03-12T14:00:00Z",
            "endTime": "2025-03-14T10:00:00Z",
            "guestName": "Ioana Stan",
            "notes": "Late check-in"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);
    let created: Reservation = test::read_body_json(res).await;
    assert_eq!(created.room_id, 3);
    assert_eq!(created.guest_name.as_deref(), Some("Ioana Stan"));

    let req = test::TestRequest::get()
        .uri("/api/reservations?roomId=3")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let reservations: Vec<Reservation> = test::read_body_json(res).await;
    assert_eq!(reservations, vec![created.clone()]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/reservations/{}", created.id))
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let reservation: Reservation = test::read_body_json(res).await;
    assert_eq!(reservation, created);
}

#[actix_web::test]
async fn test_list_reservations_filtered() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let reservations: Vec<Reservation> = test::read_body_json(res).await;
    // Chronological order
    assert_eq!(
        reservations.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![3, 1, 2]
    );

    let req = test::TestRequest::get()
        .uri("/api/reservations?roomId=1&after=2025-03-10T12:00:00Z")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let reservations: Vec<Reservation> = test::read_body_json(res).await;
    assert_eq!(
        reservations.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![2]
    );

    let req = test::TestRequest::get()
        .uri("/api/reservations?after=yesterday")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_reservation_conflicts() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    // Overlaps with reservation 1 (10:00-12:00)
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 1,
            "startTime": "2025-03-10T11:00:00Z",
            "endTime": "2025-03-10T13:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CONFLICT);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert!(body["message"].as_str().unwrap().contains('1'));

    // Contains reservations 1 and 2
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 1,
            "startTime": "2025-03-10T08:00:00Z",
            "endTime": "2025-03-10T18:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CONFLICT);
    assert_eq!(store.data.lock().unwrap().reservations.len(), 3);

    // Touching both reservations, in between
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 1,
            "startTime": "2025-03-10T12:00:00Z",
            "endTime": "2025-03-10T14:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);

    // Same interval in another room
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 4,
            "startTime": "2025-03-10T11:00:00Z",
            "endTime": "2025-03-10T13:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);
    assert_eq!(store.data.lock().unwrap().reservations.len(), 5);
}

#[actix_web::test]
async fn test_create_reservation_invalid() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    // Inverted interval
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 5,
            "startTime": "2025-03-10T13:00:00Z",
            "endTime": "2025-03-10T11:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    // Zero-length interval
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 5,
            "startTime": "2025-03-10T13:00:00Z",
            "endTime": "2025-03-10T13:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown room
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 42,
            "startTime": "2025-03-10T11:00:00Z",
            "endTime": "2025-03-10T13:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    // Missing field
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 5,
            "startTime": "2025-03-10T11:00:00Z",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(store.data.lock().unwrap().reservations.len(), 3);
}

#[actix_web::test]
async fn test_update_reservation() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    // Only change the guest name
    let req = test::TestRequest::put()
        .uri("/api/reservations/1")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"guestName": "Ana Popescu-Ionescu"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let updated: Reservation = test::read_body_json(res).await;
    assert_eq!(updated.id, 1);
    assert_eq!(updated.room_id, 1);
    assert_eq!(
        updated.start_time,
        "2025-03-10T10:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );
    assert_eq!(
        updated.end_time,
        "2025-03-10T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );
    assert_eq!(updated.guest_name.as_deref(), Some("Ana Popescu-Ionescu"));

    // Extending the reservation overlaps with itself, which is not a conflict
    let req = test::TestRequest::put()
        .uri("/api/reservations/1")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"endTime": "2025-03-10T13:00:00Z"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);

    // But it must not overlap with reservation 2
    let req = test::TestRequest::put()
        .uri("/api/reservations/1")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"endTime": "2025-03-10T15:00:00Z"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CONFLICT);

    // The merged interval is checked
    let req = test::TestRequest::put()
        .uri("/api/reservations/1")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"startTime": "2025-03-10T13:30:00Z"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    // Moving to another room
    let req = test::TestRequest::put()
        .uri("/api/reservations/1")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"roomId": 6}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let updated: Reservation = test::read_body_json(res).await;
    assert_eq!(updated.room_id, 6);
    assert_eq!(
        updated.end_time,
        "2025-03-10T13:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );

    let req = test::TestRequest::put()
        .uri("/api/reservations/17")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({"notes": "nothing"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_reservation() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::delete()
        .uri("/api/reservations/2")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NO_CONTENT);
    assert!(store
        .data
        .lock()
        .unwrap()
        .reservations
        .iter()
        .all(|r| r.id != 2));

    let req = test::TestRequest::delete()
        .uri("/api/reservations/2")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/reservations/2")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_room_availability() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/api/rooms/1/availability?start=2025-03-10T11:00:00Z&end=2025-03-10T15:00:00Z")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let info: AvailabilityInfo = test::read_body_json(res).await;
    assert!(!info.available);
    assert_eq!(info.conflicting, vec![1, 2]);

    let req = test::TestRequest::get()
        .uri("/api/rooms/1/availability?start=2025-03-10T11:00:00Z&end=2025-03-10T12:00:00Z&excludeReservationId=1")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let info: AvailabilityInfo = test::read_body_json(res).await;
    assert!(info.available);
    assert!(info.conflicting.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/rooms/1/availability?start=2025-03-10T12:00:00Z&end=2025-03-10T11:00:00Z")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get()
        .uri("/api/rooms/9/availability?start=2025-03-10T11:00:00Z&end=2025-03-10T12:00:00Z")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_room_status() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/api/rooms/status?date=2025-03-10")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let status_list: Vec<RoomStatusInfo> = test::read_body_json(res).await;
    assert_eq!(status_list.len(), 6);
    let status_of =
        |room_id| status_list.iter().find(|s| s.room_id == room_id).unwrap().status;
    assert_eq!(status_of(1), RoomStatus::Occupied);
    // Reservation from 23:00 the day before until 01:00
    assert_eq!(status_of(2), RoomStatus::Occupied);
    assert_eq!(status_of(3), RoomStatus::Free);

    let req = test::TestRequest::get()
        .uri("/api/rooms/status?date=2025-03-11")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    let status_list: Vec<RoomStatusInfo> = test::read_body_json(res).await;
    assert!(status_list.iter().all(|s| s.status == RoomStatus::Free));
}

#[actix_web::test]
async fn test_toggle_room_status() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/rooms/5/toggleStatus")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let info: RoomStatusInfo = test::read_body_json(res).await;
    assert_eq!(info.status, RoomStatus::Occupied);
    {
        let data = store.data.lock().unwrap();
        let block = data.reservations.iter().find(|r| r.room_id == 5).unwrap();
        let today = availability::current_date(&chrono_tz::UTC);
        assert_eq!(
            (block.start_time, block.end_time),
            availability::day_window(today, &chrono_tz::UTC)
        );
        assert_eq!(block.guest_name.as_deref(), Some("Manually marked"));
    }

    let req = test::TestRequest::post()
        .uri("/api/rooms/5/toggleStatus")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let info: RoomStatusInfo = test::read_body_json(res).await;
    assert_eq!(info.status, RoomStatus::Free);
    assert!(store
        .data
        .lock()
        .unwrap()
        .reservations
        .iter()
        .all(|r| r.room_id != 5));
}

#[actix_web::test]
async fn test_toggle_room_status_with_regular_reservation() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let now = Utc::now();
    let req = test::TestRequest::post()
        .uri("/api/reservations")
        .append_header(bearer_header(sample_data::USER_ID))
        .set_json(serde_json::json!({
            "roomId": 6,
            "startTime": now,
            "endTime": now + chrono::Duration::minutes(30),
            "guestName": "Radu Marin",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/rooms/6/toggleStatus")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CONFLICT);
    assert_eq!(
        store
            .data
            .lock()
            .unwrap()
            .reservations
            .iter()
            .filter(|r| r.room_id == 6)
            .count(),
        1
    );
}

#[actix_web::test]
async fn test_register_and_login() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({"email": "new@example.com", "password": "secret99"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CREATED);
    let registered: RegisterResponse = test::read_body_json(res).await;
    assert_eq!(registered.id, 3);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({"email": "new@example.com", "password": "other123"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({"email": "new.example.com", "password": "secret99"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({"email": "new@example.com", "password": "wrong"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
    let wrong_password_body = test::read_body(res).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({"email": "nobody@example.com", "password": "secret99"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::UNAUTHORIZED);
    assert_eq!(test::read_body(res).await, wrong_password_body);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({"email": "new@example.com", "password": "secret99"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let login: LoginResponse = test::read_body_json(res).await;
    assert_eq!(login.user.id, 3);
    assert_eq!(login.user.email, "new@example.com");
    assert_eq!(login.user.role, roomres_api_types::UserRole::User);

    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header((
            http::header::AUTHORIZATION,
            format!("Bearer {}", login.token),
        ))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
}

#[actix_web::test]
async fn test_login_sample_user() {
    let (state, _store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({
            "email": sample_data::USER_EMAIL,
            "password": sample_data::USER_PASSWORD,
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let login: LoginResponse = test::read_body_json(res).await;
    assert_eq!(login.user.id, sample_data::USER_ID);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({
            "email": sample_data::ADMIN_EMAIL,
            "password": "admin123",
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::OK);
    let login: LoginResponse = test::read_body_json(res).await;
    assert_eq!(login.user.id, sample_data::ADMIN_USER_ID);
    assert_eq!(login.user.role, roomres_api_types::UserRole::Admin);
}

#[actix_web::test]
async fn test_store_errors() {
    let (state, store) = get_test_state();
    let app = test::init_service(
        App::new()
            .configure(configure_app)
            .app_data(web::Data::new(state.clone())),
    )
    .await;

    store.data.lock().unwrap().next_error = Some(StoreError::TransactionConflict);
    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::SERVICE_UNAVAILABLE);

    store.data.lock().unwrap().next_error =
        Some(StoreError::ConnectionError("connection refused".to_owned()));
    let req = test::TestRequest::get()
        .uri("/api/rooms")
        .append_header(bearer_header(sample_data::USER_ID))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["httpCode"], 500);
}
