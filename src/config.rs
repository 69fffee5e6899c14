//! Configuration for Parchment
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Parchment - contract lifecycle service
///
/// Blueprints define reusable sets of positioned form fields; contracts are
/// materialized from a blueprint and advance through a fixed approval
/// pipeline (created -> approved -> sent -> signed -> locked, with revocation
/// side exits).
#[derive(Parser, Debug, Clone)]
#[command(name = "parchment")]
#[command(about = "Contract lifecycle service")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "contract-management")]
    pub mongodb_db: String,

    /// Allowed CORS origin for browser clients
    #[arg(long, env = "CORS_ORIGIN", default_value = "*")]
    pub cors_origin: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        if self.cors_origin.trim().is_empty() {
            return Err("CORS_ORIGIN must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> Args {
        Args::parse_from(["parchment"])
    }

    #[test]
    fn test_defaults_are_valid() {
        let args = default_args();
        assert!(args.validate().is_ok());
        assert_eq!(args.mongodb_db, "contract-management");
        assert_eq!(args.cors_origin, "*");
    }

    #[test]
    fn test_empty_db_name_rejected() {
        let mut args = default_args();
        args.mongodb_db = "  ".to_string();
        assert!(args.validate().is_err());
    }
}
