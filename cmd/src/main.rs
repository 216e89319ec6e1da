use clap::{arg, command, Command};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use abi::config::Config;
use abi::errors::Error;
use abi::model::{ApprovalStatus, User, UserRole};
use db::{DbRepo, UserRepo};

mod sweep;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_line_number(true)
        .init();

    let matches = command!()
        .arg(arg!(-c --config <FILE> "configuration file").default_value("./config.yml"))
        .subcommand(
            Command::new("sweep").about("delete uploaded blobs no record references anymore"),
        )
        .get_matches();

    let path = matches.get_one::<String>("config").unwrap();
    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config {path}: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = match matches.subcommand() {
        Some(("sweep", _)) => sweep::run(&config).await,
        _ => serve(config).await,
    };
    if let Err(e) = result {
        error!("fatal: {:?}", e);
        std::process::exit(1);
    }
}

async fn serve(config: Config) -> Result<(), Error> {
    let state = api::AppState::new(&config).await?;
    bootstrap_admin(&config, &state.db).await?;
    api::start_with_state(&config, state).await
}

/// create the configured admin account unless an admin already exists
async fn bootstrap_admin(config: &Config, db: &DbRepo) -> Result<(), Error> {
    if db.user.admin_exists().await? {
        return Ok(());
    }

    let now = chrono::Utc::now().timestamp_millis();
    let admin = User {
        id: nanoid::nanoid!(),
        full_name: config.admin.full_name.clone(),
        email: config.admin.email.clone(),
        password: utils::hash_password(&config.admin.password)?,
        avatar: None,
        bio: None,
        onboarded: true,
        role: UserRole::Admin,
        is_active: true,
        approval_status: ApprovalStatus::Approved,
        friends: vec![],
        create_time: now,
        update_time: now,
    };
    let admin = db.user.create_user(admin).await?;
    info!("bootstrapped admin account {} ({})", admin.email, admin.id);
    Ok(())
}
