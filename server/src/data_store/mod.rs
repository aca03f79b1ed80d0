//! The backend part of the backend: the database interface
//!
//! The primary entry point to this module is the function [get_store_from_env], which returns an
//! object implementing the [RoomReservationStore] trait. This object can be shared between threads
//! in a global application state and be used to create [RoomReservationStoreFacade] instances for
//! interaction with the database. These provide a CRUD-like interface, using the data models from
//! the [models] module.
//!
//! The primary implementation of [RoomReservationStore] ([postgres::PgDataStore]) wraps a
//! PostgreSQL connection pool and its corresponding [RoomReservationStoreFacade] objects
//! ([postgres::PgDataStoreFacade]) hold a reference to one pooled connection each, using the Diesel
//! query DSL for implementing the database interaction.
//!
//! There is also a mock implementation for unittests.

use crate::auth_session::SessionToken;
use crate::cli_error::CliError;
use crate::data_store::auth_token::{AccessRole, Privilege};
use crate::setup;
use auth_token::AuthToken;

pub mod auth_token;
pub mod models;
pub mod password;
mod postgres;
mod schema;

/// Get a [RoomReservationStore] instance, according the "DATABASE_URL" environment variable.
///
/// The DATABASE_URL must be a PosgreSQL connection url, following the schema
/// "postgres://{user}:{password}@{host}/{database}".
pub fn get_store_from_env() -> Result<impl RoomReservationStore, CliError> {
    Ok(postgres::PgDataStore::new(
        &setup::get_database_url_from_env()?,
    )?)
}

pub type RoomId = i32;
pub type ReservationId = i32;
pub type UserId = i32;

pub trait RoomReservationStoreFacade {
    /// Get all rooms, ordered by their id
    fn get_rooms(&mut self, auth_token: &AuthToken) -> Result<Vec<models::Room>, StoreError>;
    fn get_room(
        &mut self,
        auth_token: &AuthToken,
        room_id: RoomId,
    ) -> Result<models::Room, StoreError>;

    /// Get a filtered list of reservations
    ///
    /// Reservations are returned in chronological order, i.e. sorted by (start_time, end_time, id)
    fn get_reservations_filtered(
        &mut self,
        auth_token: &AuthToken,
        filter: ReservationFilter,
    ) -> Result<Vec<models::Reservation>, StoreError>;
    fn get_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
    ) -> Result<models::Reservation, StoreError>;
    /// Create a new reservation, if the room is available for the requested time interval.
    ///
    /// The availability check and the insertion are done atomically.
    ///
    /// # return value
    /// - `Ok(reservation)` with the newly stored reservation (including its new id)
    /// - `Err(StoreError::InvalidInputData)` if the time interval is empty or inverted or the
    ///   room does not exist
    /// - `Err(StoreError::ReservationConflict)` if the room is not available
    /// - `Err(_)` if something different went wrong, as usual
    fn create_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation: models::NewReservation,
    ) -> Result<models::Reservation, StoreError>;
    /// Update some fields of an existing reservation. Fields which are `None` in the `patch`
    /// keep their current value.
    ///
    /// The resulting reservation is checked for validity and availability in the same way as in
    /// [Self::create_reservation], ignoring the reservation itself.
    fn update_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
        patch: models::ReservationPatch,
    ) -> Result<models::Reservation, StoreError>;
    fn delete_reservation(
        &mut self,
        auth_token: &AuthToken,
        reservation_id: ReservationId,
    ) -> Result<(), StoreError>;

    /// Create a new user account with the [AccessRole::User] role.
    ///
    /// This is used for self-registration and does not require authorization.
    ///
    /// Returns `Err(StoreError::ConflictEntityExists)` if a user with the same email exists.
    fn register_user(&mut self, email: &str, password: &str) -> Result<UserId, StoreError>;
    /// Create a new user account with an arbitrary role
    fn create_user(
        &mut self,
        auth_token: &AuthToken,
        email: &str,
        password: &str,
        role: AccessRole,
    ) -> Result<UserId, StoreError>;
    fn get_users(&mut self, auth_token: &AuthToken) -> Result<Vec<models::User>, StoreError>;
    fn set_user_role(
        &mut self,
        auth_token: &AuthToken,
        email: &str,
        role: AccessRole,
    ) -> Result<(), StoreError>;

    /// Check the given email/password combination.
    ///
    /// Returns the user on success or `Err(StoreError::NotExisting)` if there is no user with the
    /// given email or the password does not match. Both cases are intentionally indistinguishable.
    fn authenticate_with_password(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<models::User, StoreError>;

    /// Get an [AuthToken] instance for a client, representing the access role of the user
    /// referenced by the (verified) session token.
    ///
    /// Returns `Err(StoreError::NotExisting)` if the user does not exist (anymore).
    fn get_auth_token_for_session(
        &mut self,
        session_token: &SessionToken,
    ) -> Result<AuthToken, StoreError>;
}

/// Filter options for retrieving reservations from the store via
/// [RoomReservationStoreFacade::get_reservations_filtered]
///
/// Can be constructed through the [ReservationFilterBuilder]
#[derive(Default, Debug, Clone)]
pub struct ReservationFilter {
    /// Filter for reservations of the given room
    pub room_id: Option<RoomId>,
    /// Filter for reservations that end after the given point in time (this includes reservations
    /// that span over this point in time)
    pub after: Option<chrono::DateTime<chrono::Utc>>,
    /// Filter for reservations that begin before the given point in time (this includes
    /// reservations that span over this point in time)
    pub before: Option<chrono::DateTime<chrono::Utc>>,
}

impl ReservationFilter {
    pub fn builder() -> ReservationFilterBuilder {
        ReservationFilterBuilder::new()
    }

    /// Checks if a given reservation matches the filter
    ///
    /// Usually, filtering should be done by the database. This function can be used for separate
    /// checks of individual reservations in software.
    pub fn matches(&self, reservation: &models::Reservation) -> bool {
        if let Some(room_id) = self.room_id {
            if reservation.room_id != room_id {
                return false;
            }
        }
        if let Some(after) = self.after {
            if after >= reservation.end_time {
                return false;
            }
        }
        if let Some(before) = self.before {
            if before <= reservation.start_time {
                return false;
            }
        }
        true
    }
}

/// Builder for constructing [ReservationFilter] objects
pub struct ReservationFilterBuilder {
    result: ReservationFilter,
}

impl ReservationFilterBuilder {
    pub fn new() -> Self {
        Self {
            result: ReservationFilter::default(),
        }
    }

    /// Add filter to only include reservations of the given room
    pub fn room(mut self, room_id: RoomId) -> Self {
        self.result.room_id = Some(room_id);
        self
    }

    /// Add filter, to only include reservations that end after the given point in time (this
    /// includes reservations that span over this point in time)
    pub fn after(mut self, after: chrono::DateTime<chrono::Utc>) -> Self {
        self.result.after = Some(after);
        self
    }

    /// Add filter, to only include reservations that begin before the given point in time (this
    /// includes reservations that span over this point in time)
    pub fn before(mut self, before: chrono::DateTime<chrono::Utc>) -> Self {
        self.result.before = Some(before);
        self
    }

    /// Create the ReservationFilter object
    pub fn build(self) -> ReservationFilter {
        self.result
    }
}

impl Default for ReservationFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub trait RoomReservationStore: Send + Sync {
    fn get_facade<'a>(&'a self) -> Result<Box<dyn RoomReservationStoreFacade + 'a>, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection the database failed. See string description for details.
    ConnectionError(String),
    /// The query could not be executed because of some error not covered by the other members (see
    /// string description)
    QueryError(diesel::result::Error),
    /// Database transaction could not be commited due to a conflicting concurrent transaction
    TransactionConflict,
    /// The requested entity does not exist
    NotExisting,
    /// The entity could not be created because it already exists.
    ConflictEntityExists,
    /// The reservation could not be stored, because the room is already reserved by the given
    /// reservations in the requested time interval.
    ReservationConflict { conflicting: Vec<ReservationId> },
    /// The client is not authorized for this action. It would need to authenticate for an access
    /// role qualifying for the `required_privilege`.
    PermissionDenied { required_privilege: Privilege },
    /// The provided data is invalid, i.e. it does not match the expected ranges or violates a
    /// SQL constraint. See string description for details.
    InvalidInputData(String),
    /// Some data queried from the database could not be deserialized. See string description for
    /// details.
    InvalidDataInDatabase(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => Self::NotExisting,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::ConflictEntityExists,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::SerializationFailure,
                _,
            ) => Self::TransactionConflict,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::ForeignKeyViolation
                | diesel::result::DatabaseErrorKind::CheckViolation,
                ref info,
            ) => Self::InvalidInputData(
                info.constraint_name()
                    .and_then(postgres::description_for_postgres_constraint)
                    .map(|d| d.to_owned())
                    .unwrap_or_else(|| info.message().to_owned()),
            ),
            diesel::result::Error::SerializationError(e) => Self::InvalidInputData(e.to_string()),
            diesel::result::Error::DeserializationError(e) => {
                Self::InvalidDataInDatabase(e.to_string())
            }
            _ => Self::QueryError(error),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(error: r2d2::Error) -> Self {
        Self::ConnectionError(error.to_string())
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Error connecting to database: {}", e),
            Self::QueryError(e) => write!(f, "Error while executing database query: {}", e),
            Self::TransactionConflict => f.write_str("Database transaction could not be commited due to a conflicting concurrent transaction"),
            Self::NotExisting => f.write_str("Database record does not exist."),
            Self::ConflictEntityExists => f.write_str("Database record exists already."),
            Self::ReservationConflict { conflicting } => write!(
                f,
                "Room is already reserved in the requested time interval by reservation(s) {}.",
                conflicting
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Self::PermissionDenied { required_privilege } => {
                write!(f, "Client is not authorized to perform this action. {:?} privilege required.", required_privilege)
            }
            Self::InvalidInputData(e) => {
                write!(f, "Data to be stored in database is not valid: {}", e)
            }
            Self::InvalidDataInDatabase(e) => {
                write!(f, "Data queried from database could not be deserialized: {}", e)
            },
        }
    }
}

impl std::error::Error for StoreError {}
