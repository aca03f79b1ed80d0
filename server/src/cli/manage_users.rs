use crate::cli::util::{query_user_and_check, query_user_bool};
use crate::cli::CliAuthTokenKey;
use crate::cli_error::CliError;
use crate::data_store::auth_token::{AccessRole, AuthToken};
use crate::data_store::models::{validate_email, validate_password};
use crate::data_store::{get_store_from_env, RoomReservationStore};

pub fn print_user_list() -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let auth_key = CliAuthTokenKey::new();
    let auth_token = AuthToken::create_for_cli(&auth_key);
    let users = data_store.get_users(&auth_token)?;

    let mut table = comfy_table::Table::new();
    table
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED)
        .set_header(vec!["id", "email", "role"])
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic)
        .add_rows(
            users
                .into_iter()
                .map(|user| [user.id.to_string(), user.email, user.role.name().to_owned()]),
        );

    println!("{table}");
    Ok(())
}

/// Interactively create a new user account. The email address and password are queried from the
/// terminal.
pub fn add_user(admin: bool) -> Result<(), CliError> {
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let email: String =
        query_user_and_check("Enter email address", |email: &String| validate_email(email))?;
    let password: String =
        query_user_and_check("Enter password", |password: &String| validate_password(password))?;
    let role = if admin {
        AccessRole::Admin
    } else {
        AccessRole::User
    };

    let auth_key = CliAuthTokenKey::new();
    let auth_token = AuthToken::create_for_cli(&auth_key);
    let new_user_id = data_store.create_user(&auth_token, &email, &password, role)?;
    println!(
        "Success. New user id: {} (role: {})",
        new_user_id,
        role.name()
    );
    Ok(())
}

/// Change the role of the user with the given email address. The `role` is given by its name
/// ("user" or "admin").
pub fn set_user_role(email: &str, role: &str) -> Result<(), CliError> {
    let role: AccessRole = role.parse().map_err(CliError::DataError)?;
    let data_store_pool = get_store_from_env()?;
    let mut data_store = data_store_pool.get_facade()?;

    let auth_key = CliAuthTokenKey::new();
    let auth_token = AuthToken::create_for_cli(&auth_key);
    let users = data_store.get_users(&auth_token)?;
    let user = users
        .iter()
        .find(|u| u.email == email)
        .ok_or(CliError::DataError(format!(
            "User with email {} does not exist",
            email
        )))?;
    if user.role == role {
        println!("User {} has already role {}.", email, role.name());
        return Ok(());
    }
    if user.role == AccessRole::Admin
        && users.iter().filter(|u| u.role == AccessRole::Admin).count() == 1
    {
        let confirm = query_user_bool(
            &format!(
                "{} is the last admin user. Do you really want to change their role?",
                email
            ),
            Some(false),
        )?;
        if !confirm {
            println!("Aborted.");
            return Ok(());
        }
    }

    data_store.set_user_role(&auth_token, email, role)?;
    println!("Success. {} has now role {}.", email, role.name());
    Ok(())
}
