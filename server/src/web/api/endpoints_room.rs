use crate::availability;
use crate::data_store::models::{NewReservation, Reservation};
use crate::data_store::{ReservationFilter, ReservationId, RoomId};
use crate::web::api::{
    auth_token_for_session, session_token_from_header, APIError, BearerAuthorization,
};
use crate::web::AppState;
use actix_web::{get, post, web, Responder};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use roomres_api_types::{AvailabilityInfo, RoomStatus, RoomStatusInfo};
use serde::Deserialize;

/// Guest name of the whole-day reservations created by [toggle_room_status]
const MANUAL_BLOCK_GUEST_NAME: &str = "Manually marked";
/// Notes of the whole-day reservations created by [toggle_room_status]
const MANUAL_BLOCK_NOTES: &str = "Status changed manually";

fn is_manual_block(reservation: &Reservation) -> bool {
    reservation.guest_name.as_deref() == Some(MANUAL_BLOCK_GUEST_NAME)
        && reservation.notes.as_deref() == Some(MANUAL_BLOCK_NOTES)
}

/// Filter for loading all reservations, which may intersect the local day `date`.
///
/// The filter is a bit wider than the day window. The exact check is done by the functions of the
/// [availability] module.
fn day_filter(
    room_id: Option<RoomId>,
    date: NaiveDate,
    timezone: &chrono_tz::Tz,
) -> ReservationFilter {
    let (day_start, day_end) = availability::day_window(date, timezone);
    let mut builder = ReservationFilter::builder()
        .after(day_start - chrono::Duration::seconds(1))
        .before(day_end + chrono::Duration::seconds(1));
    if let Some(room_id) = room_id {
        builder = builder.room(room_id);
    }
    builder.build()
}

#[get("/rooms")]
async fn list_rooms(
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_header(bearer_header, &state)?;
    let rooms: Vec<roomres_api_types::Room> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        Ok(store.get_rooms(&auth)?)
    })
    .await??
    .into_iter()
    .map(|r| r.into())
    .collect();
    Ok(web::Json(rooms))
}

#[derive(Deserialize)]
struct StatusQuery {
    /// Reference day of the status. Defaults to the current date.
    date: Option<NaiveDate>,
}

#[get("/rooms/status")]
async fn list_room_status(
    query: web::Query<StatusQuery>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let session_token = session_token_from_header(bearer_header, &state)?;
    let timezone = state.timezone;
    let date = query
        .into_inner()
        .date
        .unwrap_or_else(|| availability::current_date(&timezone));
    let status_list: Vec<RoomStatusInfo> = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        let rooms = store.get_rooms(&auth)?;
        let reservations =
            store.get_reservations_filtered(&auth, day_filter(None, date, &timezone))?;
        Ok(rooms
            .iter()
            .map(|room| RoomStatusInfo {
                room_id: room.id,
                status: availability::room_status(room.id, date, &timezone, &reservations),
            })
            .collect())
    })
    .await??;
    Ok(web::Json(status_list))
}

#[get("/rooms/{room_id}")]
async fn get_room(
    path: web::Path<RoomId>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let room_id = path.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    let room: roomres_api_types::Room = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        Ok(store.get_room(&auth, room_id)?)
    })
    .await??
    .into();
    Ok(web::Json(room))
}

#[derive(Deserialize)]
struct AvailabilityQuery {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(rename = "excludeReservationId")]
    exclude_reservation_id: Option<ReservationId>,
}

#[get("/rooms/{room_id}/availability")]
async fn check_room_availability(
    path: web::Path<RoomId>,
    query: web::Query<AvailabilityQuery>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let room_id = path.into_inner();
    let query = query.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    if query.start >= query.end {
        return Err(APIError::InvalidData(
            "Start time must be earlier than end time.".to_owned(),
        ));
    }
    let availability_info = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        store.get_room(&auth, room_id)?;
        let reservations = store.get_reservations_filtered(
            &auth,
            ReservationFilter::builder()
                .room(room_id)
                .after(query.start)
                .before(query.end)
                .build(),
        )?;
        let conflicting: Vec<ReservationId> = availability::find_conflicting_reservations(
            room_id,
            &query.start,
            &query.end,
            &reservations,
            query.exclude_reservation_id,
        )
        .iter()
        .map(|r| r.id)
        .collect();
        Ok(AvailabilityInfo {
            available: conflicting.is_empty(),
            conflicting,
        })
    })
    .await??;
    Ok(web::Json(availability_info))
}

/// Toggle the occupancy status of the room for the current day.
///
/// A free room is blocked by a whole-day reservation. For an occupied room, the whole-day blocks
/// of the current day are removed again. Regular reservations are never removed. If the room is
/// only occupied by those, the request fails.
#[post("/rooms/{room_id}/toggleStatus")]
async fn toggle_room_status(
    path: web::Path<RoomId>,
    state: web::Data<AppState>,
    bearer_header: Option<web::Header<BearerAuthorization>>,
) -> Result<impl Responder, APIError> {
    let room_id = path.into_inner();
    let session_token = session_token_from_header(bearer_header, &state)?;
    let timezone = state.timezone;
    let today = availability::current_date(&timezone);
    let status = web::block(move || -> Result<_, APIError> {
        let mut store = state.store.get_facade()?;
        let auth = auth_token_for_session(store.as_mut(), &session_token)?;
        store.get_room(&auth, room_id)?;
        let reservations = store
            .get_reservations_filtered(&auth, day_filter(Some(room_id), today, &timezone))?;

        match availability::room_status(room_id, today, &timezone, &reservations) {
            RoomStatus::Free => {
                let (day_start, day_end) = availability::day_window(today, &timezone);
                let block = store.create_reservation(
                    &auth,
                    NewReservation {
                        room_id,
                        start_time: day_start,
                        end_time: day_end,
                        guest_name: Some(MANUAL_BLOCK_GUEST_NAME.to_owned()),
                        notes: Some(MANUAL_BLOCK_NOTES.to_owned()),
                    },
                )?;
                info!("Room {} manually marked as occupied ({})", room_id, block.id);
                Ok(RoomStatus::Occupied)
            }
            RoomStatus::Occupied => {
                let manual_blocks: Vec<ReservationId> =
                    availability::reservations_on_day(room_id, today, &timezone, &reservations)
                        .into_iter()
                        .filter(|r| is_manual_block(r))
                        .map(|r| r.id)
                        .collect();
                if manual_blocks.is_empty() {
                    return Err(APIError::RoomHasActiveReservations);
                }
                for reservation_id in manual_blocks.iter() {
                    store.delete_reservation(&auth, *reservation_id)?;
                }
                info!("Room {} manually marked as free", room_id);
                let remaining: Vec<Reservation> = reservations
                    .into_iter()
                    .filter(|r| !manual_blocks.contains(&r.id))
                    .collect();
                Ok(availability::room_status(
                    room_id, today, &timezone, &remaining,
                ))
            }
        }
    })
    .await??;
    Ok(web::Json(RoomStatusInfo { room_id, status }))
}
