use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use sandgraph_core::AppError;
use tracing_subscriber::EnvFilter;

/// Minimum length of the secret shared with the authenticating gateway.
pub const GATEWAY_SECRET_MIN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub gateway_shared_secret: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let gateway_shared_secret = required_env("GATEWAY_SHARED_SECRET")?;
        if gateway_shared_secret.len() < GATEWAY_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "GATEWAY_SHARED_SECRET must be at least {GATEWAY_SECRET_MIN_LENGTH} characters"
            )));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            gateway_shared_secret,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
