mod data_store;

mod availability;
mod auth_session;
pub mod cli;
pub mod cli_error;
mod setup;
pub mod web;

pub use cli::CliAuthTokenKey;

fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
