use crate::cli::database_migration::check_migration_state;
use crate::cli_error::CliError;
use crate::data_store::get_store_from_env;
use crate::setup::{
    get_listen_address_from_env, get_listen_port_from_env, get_secret_from_env,
    get_session_max_age_from_env, get_timezone_from_env,
};
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use std::sync::Arc;

mod api;
mod http_error_logging;

pub fn serve() -> Result<(), CliError> {
    check_migration_state()?;
    let state = AppState::new()?;
    let listen_address = get_listen_address_from_env()?;
    let listen_port = get_listen_port_from_env()?;
    info!(
        "Starting room reservation server {} on {}:{} (timezone {})",
        crate::get_version(),
        listen_address,
        listen_port,
        state.timezone
    );
    actix_web::rt::System::new()
        .block_on(
            HttpServer::new(move || {
                App::new()
                    .configure(api::configure_app)
                    .app_data(web::Data::new(state.clone()))
                    .wrap(middleware::from_fn(
                        http_error_logging::error_logging_middleware,
                    ))
                    .wrap(middleware::Compress::default())
            })
            .bind((listen_address, listen_port))
            .map_err(CliError::BindError)?
            .run(),
        )
        .map_err(CliError::ServerError)
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn crate::data_store::RoomReservationStore>,
    secret: String,
    /// Local timezone for calculating the calendar days of the room occupancy status
    timezone: chrono_tz::Tz,
    session_max_age: std::time::Duration,
}

impl AppState {
    pub fn new() -> Result<Self, CliError> {
        Ok(Self {
            store: Arc::new(get_store_from_env()?),
            secret: get_secret_from_env()?,
            timezone: get_timezone_from_env()?,
            session_max_age: get_session_max_age_from_env()?,
        })
    }
}
