//! Room availability and occupancy calculations
//!
//! All functions in this module are pure computations over a snapshot of reservations, which has
//! been loaded from the data store before. They are used by the data store implementations for
//! rejecting double bookings and by the web endpoints for deriving room status information.

use crate::data_store::models::Reservation;
use crate::data_store::{ReservationId, RoomId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use roomres_api_types::RoomStatus;

/// Check if the reservation `r` conflicts with the candidate interval [`start`, `end`).
///
/// The three overlap cases are: the candidate begins within the existing reservation, the
/// candidate ends within the existing reservation, or the candidate fully contains the existing
/// reservation. Touching boundaries are no overlap.
fn overlaps(r: &Reservation, start: &DateTime<Utc>, end: &DateTime<Utc>) -> bool {
    (*start >= r.start_time && *start < r.end_time)
        || (*end > r.start_time && *end <= r.end_time)
        || (*start <= r.start_time && *end >= r.end_time)
}

/// Get all reservations which prevent booking `room_id` for the interval [`start`, `end`).
///
/// The reservation with the id `exclude_reservation_id` (if given) is ignored, which allows to
/// check an existing reservation against the others when editing it.
///
/// The ordering of `start` and `end` is not checked. Callers must reject empty or inverted
/// intervals beforehand.
pub fn find_conflicting_reservations<'a>(
    room_id: RoomId,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    reservations: &'a [Reservation],
    exclude_reservation_id: Option<ReservationId>,
) -> Vec<&'a Reservation> {
    reservations
        .iter()
        .filter(|r| r.room_id == room_id)
        .filter(|r| Some(r.id) != exclude_reservation_id)
        .filter(|r| overlaps(r, start, end))
        .collect()
}

/// Check if `room_id` is free for the whole interval [`start`, `end`).
///
/// See [find_conflicting_reservations] for details on the parameters.
pub fn is_room_available(
    room_id: RoomId,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    reservations: &[Reservation],
    exclude_reservation_id: Option<ReservationId>,
) -> bool {
    find_conflicting_reservations(room_id, start, end, reservations, exclude_reservation_id)
        .is_empty()
}

/// Calculate the first and the last millisecond (00:00:00.000 and 23:59:59.999) of the given
/// local date in the given timezone as UTC timestamps.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, timezone: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let begin = NaiveDateTime::new(date, chrono::NaiveTime::MIN);
    let end = begin + chrono::Duration::days(1) - chrono::Duration::milliseconds(1);
    (
        local_to_utc(&begin, timezone, true),
        local_to_utc(&end, timezone, false),
    )
}

/// Upper bound for skipping over a non-existing local time range. Real DST gaps are at most a
/// few hours long.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Convert a local time to UTC.
///
/// If the local time does not exist (it falls into a DST gap), the next existing local time is
/// used for `earliest` and the previous existing one otherwise. So the day window always starts
/// with the first existing instant of the day and ends with its last one.
fn local_to_utc<Tz: TimeZone>(
    local_datetime: &NaiveDateTime,
    timezone: &Tz,
    earliest: bool,
) -> DateTime<Utc> {
    let step = if earliest {
        chrono::Duration::minutes(1)
    } else {
        -chrono::Duration::minutes(1)
    };
    let mut candidate = *local_datetime;
    for _ in 0..MAX_GAP_MINUTES {
        let result = timezone.from_local_datetime(&candidate);
        let resolved = if earliest {
            result.earliest()
        } else {
            result.latest()
        };
        if let Some(datetime) = resolved {
            return datetime.with_timezone(&Utc);
        }
        candidate += step;
    }
    local_datetime.and_utc()
}

/// Get the current date in the given timezone
pub fn current_date<Tz: TimeZone>(timezone: &Tz) -> NaiveDate {
    Utc::now().with_timezone(timezone).date_naive()
}

/// Get the reservations of `room_id` which intersect the local day `date`, sorted by their begin.
pub fn reservations_on_day<'a, Tz: TimeZone>(
    room_id: RoomId,
    date: NaiveDate,
    timezone: &Tz,
    reservations: &'a [Reservation],
) -> Vec<&'a Reservation> {
    let (day_start, day_end) = day_window(date, timezone);
    let mut result: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.room_id == room_id)
        .filter(|r| r.start_time <= day_end && r.end_time >= day_start)
        .collect();
    result.sort_by_key(|r| (r.start_time, r.end_time, r.id));
    result
}

/// Derive the occupancy status of `room_id` for the local day `date`.
///
/// The room is occupied, if any of its reservations intersects the day. It does not matter,
/// whether the reservation is active at the current point in time.
pub fn room_status<Tz: TimeZone>(
    room_id: RoomId,
    date: NaiveDate,
    timezone: &Tz,
    reservations: &[Reservation],
) -> RoomStatus {
    let (day_start, day_end) = day_window(date, timezone);
    if reservations
        .iter()
        .filter(|r| r.room_id == room_id)
        .any(|r| r.start_time <= day_end && r.end_time >= day_start)
    {
        RoomStatus::Occupied
    } else {
        RoomStatus::Free
    }
}
