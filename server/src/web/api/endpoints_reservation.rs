use crate::data_store::{ReservationFilter, ReservationId, RoomId};
use crate::web::api::{
    auth_token_for_session, session_token_from_header, APIError, BearerAuthorization,
};
use crate::web::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Deserialize;

/// Query parameters of the reservation list, mapped to a [ReservationFilter]
#[derive(Deserialize)]
struct ReservationFilterAsQuery {
    #[serde(rename = "roomId")]
    room_id: Option<RoomId>,
    after: Option<DateTime<Utc>>,
    before: Option<DateTime<Utc>>,
}

impl From<ReservationFilterAsQuery> for ReservationFilter {
    fn from(value: ReservationFilterAsQuery) -> Self {
        ReservationFilter {
            room_id: value.room_id,
            after: value.after,
            before: value.before,
        }
    }
}

#[get("/reservations")]
async fn list_reservations(
    query: web::Query<ReservationFilterAsQuery>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_header(bearer_header, &state)?;
    let reservations: Vec<roomres_api_types::Reservation> =
        web::block(move || -> Result<_, APIError> {
            let mut store = state.store.get_facade()?;
            let auth = auth_token_for_session(store.as_mut(), &session_token)?;
            Ok(store.get_reservations_filtered(&auth, query.into_inner().into())?)
        })
        .await??
        .into_iter()
        .map(|r| r.into())
        .collect();

    Ok(web::Json(reservations))
}

#[get("/reservations/{reservation_id}")]
async fn get_reservation(
    path: web::Path<ReservationId>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let reservation_id = path.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    let reservation: roomres_api_types::Reservation = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        Ok(store.get_reservation(&auth, reservation_id)?)
    })
    .await??
    .into();
    Ok(web::Json(reservation))
}

#[post("/reservations")]
async fn create_reservation(
    data: web::Json<roomres_api_types::NewReservation>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_header(bearer_header, &state)?;
    let reservation = data.into_inner();
    let created: roomres_api_types::Reservation = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        let created = store.create_reservation(&auth, reservation.into())?;
        debug!(
            "Created reservation {} for room {} by user {:?}",
            created.id,
            created.room_id,
            auth.user_id()
        );
        Ok(created)
    })
    .await??
    .into();

    Ok(HttpResponse::Created().json(created))
}

#[put("/reservations/{reservation_id}")]
async fn update_reservation(
    path: web::Path<ReservationId>,
    data: web::Json<roomres_api_types::ReservationPatch>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let reservation_id = path.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    let patch = data.into_inner();
    let updated: roomres_api_types::Reservation = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        Ok(store.update_reservation(&auth, reservation_id, patch.into())?)
    })
    .await??
    .into();

    Ok(web::Json(updated))
}

#[delete("/reservations/{reservation_id}")]
async fn delete_reservation(
    path: web::Path<ReservationId>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let reservation_id = path.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        store.delete_reservation(&auth, reservation_id)?;
        Ok(())
    })
    .await??;

    Ok(HttpResponse::NoContent())
}
