use std::sync::Arc;

use abi::config::Config;
use abi::errors::Error;
use db::DbRepo;
use oss::Oss;
use presence::Presence;

mod api_utils;
pub(crate) mod handlers;
pub(crate) mod routes;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Arc<DbRepo>,
    pub oss: Arc<dyn Oss>,
    pub presence: Arc<dyn Presence>,
    pub jwt_secret: String,
    pub cookie_name: String,
    pub public_path: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        let db = Arc::new(DbRepo::new(config).await?);
        let oss = oss::oss(config).await?;
        let presence = presence::presence(config);

        Ok(Self {
            db,
            oss,
            presence,
            jwt_secret: config.server.jwt_secret.clone(),
            cookie_name: config.server.cookie_name.clone(),
            public_path: config.oss.public_path.clone(),
        })
    }
}

pub async fn start(config: Config) -> Result<(), Error> {
    let state = AppState::new(&config).await?;
    start_with_state(&config, state).await
}

pub async fn start_with_state(config: &Config, state: AppState) -> Result<(), Error> {
    let app = routes::app_routes(state);
    let listener = tokio::net::TcpListener::bind(&config.server.server_url()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
