pub mod server_settings;
pub mod settings;

use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Configuration {
    pub settings_file: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub listen_port: u16,
    pub listen_host: String,
    pub public_url: String,
    pub cors_origins: Vec<String>,
    /// Default directory for `GET /files/browse` without `dir`.
    pub browse_root: Option<PathBuf>,
}

impl Configuration {
    pub fn create() -> Result<Self> {
        // Resolve data directory: CHATDESK_HOME env or ~/.chatdesk
        let data_dir = if let Ok(home) = std::env::var("CHATDESK_HOME") {
            PathBuf::from(home)
        } else {
            let home = dirs_next::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
            home.join(".chatdesk")
        };
        std::fs::create_dir_all(&data_dir)?;

        // Resolve database path: DB_PATH env or {data_dir}/chatdesk.db
        let db_path = if let Ok(p) = std::env::var("DB_PATH") {
            PathBuf::from(p)
        } else {
            data_dir.join("chatdesk.db")
        };

        let settings_file = settings::settings_file_path(&data_dir);

        // env > file > default
        let server_result = server_settings::load_server_settings(&data_dir)?;
        let ss = server_result.settings;

        Ok(Configuration {
            settings_file,
            data_dir,
            db_path,
            listen_port: ss.listen_port,
            listen_host: ss.listen_host,
            public_url: ss.public_url,
            cors_origins: ss.cors_origins,
            browse_root: ss.browse_root.map(PathBuf::from),
        })
    }
}
