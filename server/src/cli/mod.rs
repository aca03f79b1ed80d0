pub mod database_migration;
pub mod manage_users;
mod util;

/// Key for creating [crate::data_store::auth_token::AuthToken]s with administrative privileges
/// for command line functions.
///
/// Only code of the command line interface should create instances of this type.
pub struct CliAuthTokenKey {
    _private: (),
}

impl CliAuthTokenKey {
    #[allow(clippy::new_without_default)] // We always want to explicitly create these objects
    pub fn new() -> Self {
        Self { _private: () }
    }
}
