use std::fmt::Display;

mod endpoints_auth;
mod endpoints_reservation;
mod endpoints_room;
#[cfg(test)]
mod tests;

use crate::auth_session::SessionToken;
use crate::data_store::auth_token::{AuthToken, Privilege};
use crate::data_store::{ReservationId, RoomReservationStoreFacade, StoreError};
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{
    error::ResponseError,
    get,
    http::{header::ContentType, StatusCode},
    web, HttpResponse, Responder,
};
use serde_json::json;

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(get_api_service());
}

fn get_api_service() -> actix_web::Scope {
    let json_config =
        web::JsonConfig::default().error_handler(|err, _req| APIError::InvalidJson(err).into());
    let query_config =
        web::QueryConfig::default().error_handler(|err, _req| APIError::InvalidQuery(err).into());
    web::scope("/api")
        .app_data(json_config)
        .app_data(query_config)
        .service(index)
        .service(endpoints_auth::register)
        .service(endpoints_auth::login)
        .service(endpoints_room::list_rooms)
        .service(endpoints_room::list_room_status)
        .service(endpoints_room::get_room)
        .service(endpoints_room::check_room_availability)
        .service(endpoints_room::toggle_room_status)
        .service(endpoints_reservation::list_reservations)
        .service(endpoints_reservation::get_reservation)
        .service(endpoints_reservation::create_reservation)
        .service(endpoints_reservation::update_reservation)
        .service(endpoints_reservation::delete_reservation)
}

#[get("")]
async fn index() -> impl Responder {
    web::Json(json!({
        "message": "Room reservation API is running",
        "version": crate::get_version(),
    }))
}

#[derive(Debug)]
pub enum APIError {
    NotExisting,
    AlreadyExisting,
    ReservationConflict {
        conflicting: Vec<ReservationId>,
    },
    RoomHasActiveReservations,
    PermissionDenied {
        required_privilege: Privilege,
    },
    NoSessionToken,
    InvalidSessionToken,
    AuthenticationFailed,
    InvalidJson(JsonPayloadError),
    InvalidQuery(QueryPayloadError),
    InvalidData(String),
    TransactionConflict,
    InternalError(String),
}

impl Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotExisting => f.write_str("Element does not exist")?,
            Self::AlreadyExisting => {
                f.write_str("Element already exists")?;
            },
            Self::ReservationConflict{conflicting} => {
                write!(f, "Room is not available in the requested time interval. Conflicting reservation(s): {}",
                       conflicting
                           .iter()
                           .map(|id| id.to_string())
                           .collect::<Vec<String>>()
                           .join(", "))?;
            },
            Self::RoomHasActiveReservations => {
                f.write_str("Room has active reservations today, which have not been marked manually.")?;
            },
            Self::PermissionDenied{required_privilege} => {
                write!(f, "Client is not authorized to perform this action. Authentication as {} is required.",
                       required_privilege
                           .qualifying_roles()
                           .iter()
                           .map(|role| role.name().to_owned())
                           .collect::<Vec<String>>()
                           .join(" or "))?;
            },
            Self::NoSessionToken => {
                f.write_str("This action requires authentication, but client did not send a bearer token.")?
            },
            Self::InvalidSessionToken => {
                f.write_str("This action requires authentication, but the session token given by the client is not valid.")?
            },
            Self::AuthenticationFailed => {
                f.write_str("Authentication with the given email address and password failed.")?;
            }
            Self::InternalError(s) => {
                f.write_str("Internal error: ")?;
                f.write_str(s)?;
            },
            Self::InvalidJson(e) => {
                write!(f, "Invalid JSON request data: {}", e)?;
            },
            Self::InvalidQuery(e) => {
                write!(f, "Invalid query parameters: {}", e)?;
            },
            Self::InvalidData(e) => {
                write!(f, "Invalid request data: {}", e)?;
            },
            Self::TransactionConflict => {
                f.write_str("Concurrent database transaction conflict. Please retry request.")?;
            },
        };
        Ok(())
    }
}

impl ResponseError for APIError {
    fn error_response(&self) -> HttpResponse {
        let message = format!("{}", self);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({
                "httpCode": self.status_code().as_u16(),
                "message": message
            }))
    }
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotExisting => StatusCode::NOT_FOUND,
            Self::AlreadyExisting => StatusCode::CONFLICT,
            Self::ReservationConflict { .. } => StatusCode::CONFLICT,
            Self::RoomHasActiveReservations => StatusCode::CONFLICT,
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Self::NoSessionToken => StatusCode::UNAUTHORIZED,
            Self::InvalidSessionToken => StatusCode::FORBIDDEN,
            Self::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidJson(e) => match e {
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                JsonPayloadError::Deserialize(json_error) if json_error.is_data() => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::BAD_REQUEST,
            },
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::InvalidData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::TransactionConflict => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<StoreError> for APIError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionError(error) => {
                Self::InternalError(format!("Could not connect to database: {}", error))
            }
            StoreError::QueryError(diesel_error) => Self::InternalError(format!(
                "Error while executing database query: {}",
                diesel_error
            )),
            StoreError::TransactionConflict => Self::TransactionConflict,
            StoreError::NotExisting => Self::NotExisting,
            StoreError::ConflictEntityExists => Self::AlreadyExisting,
            StoreError::ReservationConflict { conflicting } => {
                Self::ReservationConflict { conflicting }
            }
            StoreError::PermissionDenied { required_privilege } => {
                Self::PermissionDenied { required_privilege }
            }
            StoreError::InvalidInputData(e) => Self::InvalidData(e),
            StoreError::InvalidDataInDatabase(e) => Self::InternalError(format!(
                "Data queried from database could not be deserialized: {}",
                e
            )),
        }
    }
}

impl From<actix_web::error::BlockingError> for APIError {
    fn from(_e: actix_web::error::BlockingError) -> Self {
        APIError::InternalError(
            "Could not get thread from thread pool for synchronous database operation.".to_owned(),
        )
    }
}

impl From<crate::auth_session::SessionError> for APIError {
    fn from(_e: crate::auth_session::SessionError) -> Self {
        APIError::InvalidSessionToken
    }
}

/// The `Authorization: Bearer <token>` header of a request
///
/// Parsing fails, if the header is missing or does not use the Bearer scheme. Endpoints extract
/// the header as `Option<web::Header<BearerAuthorization>>` and respond with
/// [APIError::NoSessionToken] in this case.
struct BearerAuthorization(String);

impl BearerAuthorization {
    fn session_token(
        &self,
        secret: &str,
        max_age: std::time::Duration,
    ) -> Result<SessionToken, crate::auth_session::SessionError> {
        SessionToken::from_string(&self.0, secret, max_age)
    }
}

impl actix_web::http::header::TryIntoHeaderValue for BearerAuthorization {
    type Error = actix_web::http::header::InvalidHeaderValue;

    fn try_into_value(self) -> Result<actix_web::http::header::HeaderValue, Self::Error> {
        format!("Bearer {}", self.0).parse()
    }
}

impl actix_web::http::header::Header for BearerAuthorization {
    fn name() -> actix_web::http::header::HeaderName {
        actix_web::http::header::AUTHORIZATION
    }

    fn parse<M: actix_web::HttpMessage>(msg: &M) -> Result<Self, actix_web::error::ParseError> {
        let value = msg
            .headers()
            .get(Self::name())
            .ok_or(actix_web::error::ParseError::Header)?
            .to_str()
            .map_err(|_| actix_web::error::ParseError::Header)?;
        let (scheme, token) = value
            .trim()
            .split_once(' ')
            .ok_or(actix_web::error::ParseError::Header)?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("Bearer") || token.is_empty() {
            return Err(actix_web::error::ParseError::Header);
        }
        Ok(Self(token.to_owned()))
    }
}

/// Get the session token from the request's bearer authorization header and verify it.
fn session_token_from_header(
    header: Option<web::Header<BearerAuthorization>>,
    state: &crate::web::AppState,
) -> Result<SessionToken, APIError> {
    Ok(header
        .ok_or(APIError::NoSessionToken)?
        .into_inner()
        .session_token(&state.secret, state.session_max_age)?)
}

/// Get the [AuthToken] for the user of a verified session token. A session of a user, who does not
/// exist anymore, is treated as an invalid session.
fn auth_token_for_session(
    store: &mut (dyn RoomReservationStoreFacade + '_),
    session_token: &SessionToken,
) -> Result<AuthToken, APIError> {
    store
        .get_auth_token_for_session(session_token)
        .map_err(|e| match e {
            StoreError::NotExisting => APIError::InvalidSessionToken,
            e => e.into(),
        })
}
