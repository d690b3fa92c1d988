//! Server configuration from arguments and environment

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "quire-server")]
#[command(about = "Resource server for Quire documents", long_about = None)]
#[command(version)]
pub struct ServerConfig {
    /// SQLite database file (created if missing)
    #[arg(long, env = "QUIRE_DB", default_value = "quire.sqlite")]
    pub db: PathBuf,

    /// Address to listen on
    #[arg(long, env = "QUIRE_ADDR", default_value = "127.0.0.1:3030")]
    pub addr: SocketAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::parse_from([
            "quire-server",
            "--db",
            "/tmp/q.sqlite",
            "--addr",
            "0.0.0.0:8080",
        ]);
        assert_eq!(config.db, PathBuf::from("/tmp/q.sqlite"));
        assert_eq!(config.addr.port(), 8080);
    }
}
