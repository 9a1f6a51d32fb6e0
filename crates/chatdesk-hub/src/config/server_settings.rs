use super::settings::{Settings, read_settings, settings_file_path, write_settings};
use anyhow::Result;
use std::path::Path;

pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
pub const DEFAULT_LISTEN_PORT: u16 = 3210;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub listen_host: String,
    pub listen_port: u16,
    pub public_url: String,
    pub cors_origins: Vec<String>,
    pub browse_root: Option<String>,
}

pub struct ServerSettingsResult {
    pub settings: ServerSettings,
    pub saved_to_file: bool,
}

fn parse_cors_origins(s: &str) -> Vec<String> {
    let entries: Vec<String> = s
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if entries.iter().any(|e| e == "*") {
        return vec!["*".into()];
    }
    entries
}

fn derive_cors_origins(public_url: &str) -> Vec<String> {
    url::Url::parse(public_url)
        .ok()
        .map(|u| vec![u.origin().ascii_serialization()])
        .unwrap_or_default()
}

pub fn load_server_settings(data_dir: &Path) -> Result<ServerSettingsResult> {
    let settings_path = settings_file_path(data_dir);
    let mut settings = read_settings(&settings_path)?;

    let result = resolve_server_settings(&mut settings, |key| std::env::var(key).ok())?;
    if result.saved_to_file {
        write_settings(&settings_path, &settings)?;
    }
    Ok(result)
}

/// Resolves each value as env > file > default. Env values that the file
/// does not have yet are copied into `settings` so they persist.
pub fn resolve_server_settings(
    settings: &mut Settings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServerSettingsResult> {
    let mut needs_save = false;

    let listen_host = if let Some(v) = env("CHATDESK_LISTEN_HOST") {
        if settings.listen_host.is_none() {
            settings.listen_host = Some(v.clone());
            needs_save = true;
        }
        v
    } else if let Some(ref v) = settings.listen_host {
        v.clone()
    } else {
        DEFAULT_LISTEN_HOST.into()
    };

    let listen_port = if let Some(v) = env("CHATDESK_LISTEN_PORT") {
        let port: u16 = v
            .parse()
            .map_err(|_| anyhow::anyhow!("CHATDESK_LISTEN_PORT must be a valid port"))?;
        if settings.listen_port.is_none() {
            settings.listen_port = Some(port);
            needs_save = true;
        }
        port
    } else {
        settings.listen_port.unwrap_or(DEFAULT_LISTEN_PORT)
    };

    let public_url = if let Some(v) = env("CHATDESK_PUBLIC_URL") {
        if settings.public_url.is_none() {
            settings.public_url = Some(v.clone());
            needs_save = true;
        }
        v
    } else if let Some(ref v) = settings.public_url {
        v.clone()
    } else {
        format!("http://localhost:{listen_port}")
    };

    let cors_origins = if let Some(v) = env("CORS_ORIGINS") {
        let origins = parse_cors_origins(&v);
        if settings.cors_origins.is_none() {
            settings.cors_origins = Some(origins.clone());
            needs_save = true;
        }
        origins
    } else if let Some(ref v) = settings.cors_origins {
        v.clone()
    } else {
        derive_cors_origins(&public_url)
    };

    let browse_root = if let Some(v) = env("CHATDESK_BROWSE_ROOT") {
        if settings.browse_root.is_none() {
            settings.browse_root = Some(v.clone());
            needs_save = true;
        }
        Some(v)
    } else {
        settings.browse_root.clone()
    };

    Ok(ServerSettingsResult {
        settings: ServerSettings {
            listen_host,
            listen_port,
            public_url,
            cors_origins,
            browse_root,
        },
        saved_to_file: needs_save,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env_or_file() {
        let mut settings = Settings::default();
        let result = resolve_server_settings(&mut settings, env_of(&[])).unwrap();
        assert!(!result.saved_to_file);
        assert_eq!(result.settings.listen_host, "127.0.0.1");
        assert_eq!(result.settings.listen_port, 3210);
        assert_eq!(result.settings.public_url, "http://localhost:3210");
        assert_eq!(result.settings.cors_origins, vec!["http://localhost:3210"]);
        assert_eq!(result.settings.browse_root, None);
    }

    #[test]
    fn env_wins_and_is_persisted_when_file_lacks_it() {
        let mut settings = Settings {
            listen_host: Some("0.0.0.0".into()),
            ..Default::default()
        };
        let env = env_of(&[
            ("CHATDESK_LISTEN_HOST", "10.0.0.1"),
            ("CHATDESK_LISTEN_PORT", "4000"),
            ("CHATDESK_BROWSE_ROOT", "/srv/projects"),
        ]);
        let result = resolve_server_settings(&mut settings, env).unwrap();

        assert_eq!(result.settings.listen_host, "10.0.0.1");
        assert_eq!(result.settings.listen_port, 4000);
        assert_eq!(result.settings.browse_root.as_deref(), Some("/srv/projects"));
        assert!(result.saved_to_file);
        // File value is kept, missing ones are filled in.
        assert_eq!(settings.listen_host.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.listen_port, Some(4000));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut settings = Settings::default();
        let env = env_of(&[("CHATDESK_LISTEN_PORT", "http")]);
        assert!(resolve_server_settings(&mut settings, env).is_err());
    }

    #[test]
    fn cors_wildcard_collapses() {
        assert_eq!(parse_cors_origins("https://a.dev, *, https://b.dev"), vec!["*"]);
        assert_eq!(
            parse_cors_origins(" https://a.dev ,,https://b.dev"),
            vec!["https://a.dev", "https://b.dev"]
        );
    }

    #[test]
    fn load_writes_file_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_server_settings(dir.path()).unwrap();
        assert_eq!(result.saved_to_file, settings_file_path(dir.path()).exists());
    }
}
