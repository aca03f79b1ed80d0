use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Room {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub capacity: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Reservation {
    pub id: i32,
    #[serde(rename = "roomId")]
    pub room_id: i32,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(default, rename = "guestName")]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for creating a reservation. The id is assigned by the server.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewReservation {
    #[serde(rename = "roomId")]
    pub room_id: i32,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(default, rename = "guestName")]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for a partial update of a reservation. Omitted (or null) fields keep their
/// current value.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReservationPatch {
    #[serde(default, rename = "roomId", skip_serializing_if = "Option::is_none")]
    pub room_id: Option<i32>,
    #[serde(default, rename = "startTime", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "guestName", skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Free,
    Occupied,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RoomStatusInfo {
    #[serde(rename = "roomId")]
    pub room_id: i32,
    pub status: RoomStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AvailabilityInfo {
    pub available: bool,
    /// Ids of the reservations conflicting with the requested interval
    pub conflicting: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RegisterResponse {
    pub id: i32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}
