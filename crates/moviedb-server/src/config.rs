use std::{fs, path::PathBuf};

use crate::error::Result;
use anyhow::bail;
pub use clap::Parser;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "MOVIEDB_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "MOVIEDB_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "MOVIEDB_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server, as visible to clients"
    )]
    pub base_url: Url,

    #[arg(
        long,
        env = "MOVIEDB_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/moviedb.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "MOVIEDB_DATA_DIR",
        help = "Data directory for database file, default is system default like ~/.local/share/moviedb"
    )]
    data_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "MOVIEDB_RESET_DB",
        help = "Drop and recreate movies and genres tables on start, all data is lost"
    )]
    pub reset_db: bool,

    #[arg(
        long,
        env = "MOVIEDB_NO_GRAPHIQL",
        help = "Do not serve GraphiQL explorer (use in production)"
    )]
    pub no_graphiql: bool,

    #[arg(long, env = "MOVIEDB_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("moviedb"))
        .unwrap_or_else(|| PathBuf::from("moviedb"))
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Creates data directory if it does not exist yet
    pub fn ensure_data_dir(&self) -> Result<PathBuf> {
        let dir = self.data_dir();
        if !fs::exists(&dir)? {
            fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            bail!("Data directory {} is not a directory", dir.display());
        }
        Ok(dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url.clone().unwrap_or_else(|| {
            format!(
                "sqlite://{}",
                self.data_dir().join("moviedb.db").to_string_lossy()
            )
        })
    }

    /// Database file lives in data directory
    pub fn uses_data_dir(&self) -> bool {
        self.database_url.is_none()
    }

    pub fn graphiql(&self) -> bool {
        !self.no_graphiql
    }
}
