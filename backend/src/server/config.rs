//! Application configuration, parsed from flags or environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Runtime configuration for the server binary.
///
/// Every flag can also be supplied through the named environment variable,
/// which is how container deployments configure the service.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Conduit blogging platform backend")]
pub struct AppConfig {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Secret used to sign API tokens.
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Token lifetime in minutes.
    #[arg(long, env = "TOKEN_TTL_MINUTES", default_value_t = 24 * 60)]
    pub token_ttl_minutes: i64,

    /// Maximum size of the database connection pool.
    #[arg(long, env = "DB_POOL_MAX_SIZE", default_value_t = 10)]
    pub pool_max_size: u32,

    /// Append published domain events to this JSONL file (best-effort).
    #[arg(long, env = "EVENT_LOG", value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Apply pending database migrations before serving.
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_settings() {
        let config = AppConfig::parse_from([
            "backend",
            "--database-url",
            "postgres://localhost/blog",
            "--jwt-secret",
            "secret",
        ]);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.token_ttl_minutes, 1440);
        assert_eq!(config.pool_max_size, 10);
        assert!(config.event_log.is_none());
        assert!(!config.run_migrations);
    }
}
