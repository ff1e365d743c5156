use crate::configuration::Configuration;
use clap::Parser;

/// Runtime configuration from CLI flags with environment fallbacks.
/// `.env` is loaded by `main` before parsing.
#[derive(Debug, Clone, Parser)]
#[command(name = "consultation_booking", about = "Consultation booking service")]
pub struct EnvConfiguration {
    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    bind_address: String,

    /// Password expected in the x-admin-password header on /admin routes.
    #[arg(long, env = "ADMIN_PASSWORD")]
    admin_password: String,

    /// PostgreSQL URL; without it the in-memory store is used.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

impl Configuration for EnvConfiguration {
    fn bind_address(&self) -> String {
        self.bind_address.clone()
    }

    fn admin_password(&self) -> String {
        self.admin_password.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }
}
