use crate::data_store::auth_token::AccessRole;
use crate::data_store::{ReservationId, RoomId, StoreError, UserId};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lazy_static::lazy_static;

#[derive(Clone, Debug, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::rooms)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: String,
    pub capacity: i32,
}

impl From<Room> for roomres_api_types::Room {
    fn from(value: Room) -> Self {
        roomres_api_types::Room {
            id: value.id,
            name: value.name,
            room_type: value.room_type,
            capacity: value.capacity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::reservations)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub guest_name: Option<String>,
    pub notes: Option<String>,
}

impl From<Reservation> for roomres_api_types::Reservation {
    fn from(value: Reservation) -> Self {
        roomres_api_types::Reservation {
            id: value.id,
            room_id: value.room_id,
            start_time: value.start_time,
            end_time: value.end_time,
            guest_name: value.guest_name,
            notes: value.notes,
        }
    }
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name=super::schema::reservations)]
pub struct NewReservation {
    pub room_id: RoomId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub guest_name: Option<String>,
    pub notes: Option<String>,
}

impl NewReservation {
    /// Check the reservation's time interval. An empty or inverted interval is rejected with
    /// [StoreError::InvalidInputData].
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_time_range(&self.start_time, &self.end_time)
    }
}

impl From<roomres_api_types::NewReservation> for NewReservation {
    fn from(value: roomres_api_types::NewReservation) -> Self {
        Self {
            room_id: value.room_id,
            start_time: value.start_time,
            end_time: value.end_time,
            guest_name: value.guest_name,
            notes: value.notes,
        }
    }
}

/// Partial update of a reservation. All fields, which are `None`, are not changed (i.e. Diesel
/// skips them in the generated UPDATE statement).
#[derive(Clone, Debug, Default, AsChangeset)]
#[diesel(table_name=super::schema::reservations)]
pub struct ReservationPatch {
    pub room_id: Option<RoomId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub guest_name: Option<String>,
    pub notes: Option<String>,
}

impl ReservationPatch {
    /// Calculate the resulting reservation of applying this patch to the `current` reservation.
    pub fn apply_to(&self, current: &Reservation) -> Reservation {
        Reservation {
            id: current.id,
            room_id: self.room_id.unwrap_or(current.room_id),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            guest_name: self
                .guest_name
                .clone()
                .or_else(|| current.guest_name.clone()),
            notes: self.notes.clone().or_else(|| current.notes.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.room_id.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.guest_name.is_none()
            && self.notes.is_none()
    }
}

impl From<roomres_api_types::ReservationPatch> for ReservationPatch {
    fn from(value: roomres_api_types::ReservationPatch) -> Self {
        Self {
            room_id: value.room_id,
            start_time: value.start_time,
            end_time: value.end_time,
            guest_name: value.guest_name,
            notes: value.notes,
        }
    }
}

pub fn validate_time_range(
    start_time: &DateTime<Utc>,
    end_time: &DateTime<Utc>,
) -> Result<(), StoreError> {
    if start_time < end_time {
        Ok(())
    } else {
        Err(StoreError::InvalidInputData(
            "Reservation's start time must be earlier than its end time.".to_owned(),
        ))
    }
}

#[derive(Clone, Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name=super::schema::users)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: AccessRole,
}

impl From<User> for roomres_api_types::UserSummary {
    fn from(value: User) -> Self {
        roomres_api_types::UserSummary {
            id: value.id,
            email: value.email,
            role: value.role.into(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name=super::schema::users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: AccessRole,
}

const MIN_PASSWORD_LENGTH: usize = 6;

/// Check the email address and password of a new user account.
pub fn validate_user_credentials(email: &str, password: &str) -> Result<(), StoreError> {
    validate_email(email)?;
    validate_password(password)
}

/// Plausibility check of an email address. Only the general form `local@domain.tld` is checked.
pub fn validate_email(email: &str) -> Result<(), StoreError> {
    lazy_static! {
        static ref RE: regex::Regex = regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    if !RE.is_match(email) {
        return Err(StoreError::InvalidInputData(format!(
            "'{}' is not a valid email address.",
            email
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), StoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::InvalidInputData(format!(
            "Password must have at least {} characters.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
