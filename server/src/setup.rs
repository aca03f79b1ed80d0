use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};

/// Get the database URL from the environment variable.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the cryptographic application secret for signing secure tokens from the environment variable.
pub fn get_secret_from_env() -> Result<String, SetupError> {
    let secret = env::var("SECRET").map_err(|e| SetupError::from_env_error(e, "SECRET"))?;
    if secret.is_empty() {
        return Err(SetupError::EnvVariableInvalid {
            variable_name: "SECRET",
            problem: "must not be empty",
        });
    }
    Ok(secret)
}

/// Get the web server TCP listening port from the environment variable
pub fn get_listen_port_from_env() -> Result<u16, SetupError> {
    env::var("LISTEN_PORT")
        .map_err(|e| SetupError::from_env_error(e, "LISTEN_PORT"))
        .and_then(|v| {
            v.parse().map_err(|_| SetupError::EnvVariableInvalid {
                variable_name: "LISTEN_PORT",
                problem: "Not a valid uint16",
            })
        })
}

/// Get the web server TCP listening interface address from the environment variable
pub fn get_listen_address_from_env() -> Result<String, SetupError> {
    env::var("LISTEN_ADDRESS").map_err(|e| SetupError::from_env_error(e, "LISTEN_ADDRESS"))
}

/// Get the local timezone for calculating calendar days (e.g. for the room occupancy status) from
/// the environment variable. Defaults to UTC, if the variable is not set.
pub fn get_timezone_from_env() -> Result<chrono_tz::Tz, SetupError> {
    match env::var("TIMEZONE") {
        Ok(v) => v.parse().map_err(|_| SetupError::EnvVariableInvalid {
            variable_name: "TIMEZONE",
            problem: "Not a known IANA timezone name",
        }),
        Err(VarError::NotPresent) => Ok(chrono_tz::UTC),
        Err(e) => Err(SetupError::from_env_error(e, "TIMEZONE")),
    }
}

/// Get the maximum age of client session tokens from the environment variable
/// SESSION_MAX_AGE_HOURS. Defaults to 24 hours.
pub fn get_session_max_age_from_env() -> Result<std::time::Duration, SetupError> {
    let hours: u64 = match env::var("SESSION_MAX_AGE_HOURS") {
        Ok(v) => v.parse().map_err(|_| SetupError::EnvVariableInvalid {
            variable_name: "SESSION_MAX_AGE_HOURS",
            problem: "Not a valid number of hours",
        })?,
        Err(VarError::NotPresent) => 24,
        Err(e) => return Err(SetupError::from_env_error(e, "SESSION_MAX_AGE_HOURS")),
    };
    if hours == 0 {
        return Err(SetupError::EnvVariableInvalid {
            variable_name: "SESSION_MAX_AGE_HOURS",
            problem: "must be at least 1",
        });
    }
    Ok(std::time::Duration::from_secs(hours * 3600))
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}

impl std::error::Error for SetupError {}
