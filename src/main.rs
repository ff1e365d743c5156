use crate::backend::BookingBackend;
use crate::configuration::Configuration;
use crate::configuration_handler::EnvConfiguration;
use crate::database_interface::DatabaseInterface;
use crate::http::start_server;
use crate::local_store::LocalStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_store;
mod schema;
mod slots;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
pub struct AppState<B: BookingBackend, C: Configuration> {
    pub backend: B,
    pub config: C,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EnvConfiguration::parse();
    match config.database_url() {
        Some(database_url) => match DatabaseInterface::new(&database_url) {
            Ok(backend) => {
                tracing::info!("booking ledger backed by PostgreSQL");
                start_server(AppState { backend, config }).await;
            }
            Err(err) => {
                tracing::error!(%err, "database connection failed");
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("no database configured, serving the in-memory example schedule");
            let backend = LocalStore::default();
            backend.insert_example_schedule();
            start_server(AppState { backend, config }).await;
        }
    }
}
