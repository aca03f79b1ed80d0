use clap::ArgAction;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use log::{error, warn};
use roomres_server::cli_error::CliError;

fn main() {
    let args = CliArgs::parse();
    let dotenv_result = dotenv();

    let env = env_logger::Env::new().filter_or(
        "RUST_LOG",
        match args.global_opts.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    );
    env_logger::Builder::from_env(env).init();
    if let Err(e) = dotenv_result {
        warn!("Could not read .env file: {}", e);
    }

    let result: Result<(), CliError> = match args.command {
        Command::Serve => roomres_server::web::serve(),
        Command::MigrateDb => roomres_server::cli::database_migration::run_migrations(),
        Command::AddUser { admin } => roomres_server::cli::manage_users::add_user(admin),
        Command::ListUsers => roomres_server::cli::manage_users::print_user_list(),
        Command::SetUserRole { email, role } => {
            roomres_server::cli::manage_users::set_user_role(&email, &role)
        }
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

/// Room reservation manager backend
#[derive(Debug, Parser)]
#[clap(name = "roomres", version)]
pub struct CliArgs {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the room reservation REST API
    Serve,
    /// Migrate the database schema to the current version (including the default rooms)
    MigrateDb,
    /// Create a new user account interactively
    AddUser {
        /// Create the user with the admin role instead of the normal user role
        #[clap(long)]
        admin: bool,
    },
    /// List all user accounts
    ListUsers,
    /// Change the role of an existing user account
    SetUserRole {
        /// The email address of the user
        email: String,
        /// The new role ("user" or "admin")
        role: String,
    },
}

#[derive(Debug, Args)]
struct GlobalOpts {
    /// Verbosity level (can be specified multiple times)
    #[clap(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,
}
