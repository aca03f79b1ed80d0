use crate::cli_error::CliError;
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Read a single line from `input`. Fails with [CliError::InputClosed] when the input stream has
/// ended.
fn read_input_line(input: &mut impl BufRead) -> Result<String, CliError> {
    let mut user_input = String::new();
    match input.read_line(&mut user_input) {
        Ok(0) => Err(CliError::InputClosed),
        Ok(_) => Ok(user_input),
        Err(e) => Err(CliError::InputError(e)),
    }
}

/// Ask the user interactively for some single-line value in the terminal. The user's input is
/// converted to type [T] and validated with the provided validation_function. In case of a parsing
/// error or validation error, the error is printed and the user is queried again and again with
/// same prompt until the entered value is valid.
pub fn query_user_and_check<T: FromStr, F, E>(
    prompt: &str,
    validation_function: F,
) -> Result<T, CliError>
where
    <T as FromStr>::Err: std::fmt::Display,
    F: Fn(&T) -> Result<(), E>,
    E: std::fmt::Display,
{
    query_and_check_from(&mut std::io::stdin().lock(), prompt, validation_function)
}

fn query_and_check_from<T: FromStr, F, E>(
    input: &mut impl BufRead,
    prompt: &str,
    validation_function: F,
) -> Result<T, CliError>
where
    <T as FromStr>::Err: std::fmt::Display,
    F: Fn(&T) -> Result<(), E>,
    E: std::fmt::Display,
{
    loop {
        println!("{}:", prompt);
        print!("> ");
        std::io::stdout().flush().ok();
        let user_input = read_input_line(input)?;
        let value = match user_input.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                println!("Error: {}", e);
                continue;
            }
        };
        match validation_function(&value) {
            Ok(()) => return Ok(value),
            Err(e) => {
                println!("Error: {}", e);
            }
        }
    }
}

/// Ask the user interactively for a boolean value in the terminal (entered as y/n). In case of an
/// error, the error is printed and the user is queried again and again with same prompt until the
/// entered value is parsed successfully.
pub fn query_user_bool(prompt: &str, default: Option<bool>) -> Result<bool, CliError> {
    query_bool_from(&mut std::io::stdin().lock(), prompt, default)
}

fn query_bool_from(
    input: &mut impl BufRead,
    prompt: &str,
    default: Option<bool>,
) -> Result<bool, CliError> {
    let value_help = match default {
        Some(true) => "Y/n",
        Some(false) => "y/N",
        None => "y/n",
    };
    loop {
        println!("{} [{}]", prompt, value_help);
        print!("> ");
        std::io::stdout().flush().ok();
        match read_input_line(input)?.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            "" => {
                if let Some(default) = default {
                    return Ok(default);
                }
            }
            _ => {}
        }
        println!("Error: unknown option. Please enter 'y' or 'n'.");
    }
}
