use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: default_allowed_origins() }
    }
}

impl CorsConfig {
    /// `"*"` anywhere in the list opens CORS to every origin.
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Mongodb,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            other => Err(anyhow!("unknown storage backend `{other}` (expected file or mongodb)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_database")]
    pub mongodb_database: String,
    #[serde(default = "default_mongodb_collection")]
    pub mongodb_collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            data_file: default_data_file(),
            mongodb_uri: String::new(),
            mongodb_database: default_mongodb_database(),
            mongodb_collection: default_mongodb_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Shared secret for `DELETE /aus/:id`. Empty means deletes are always refused.
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }
fn default_max_body_bytes() -> usize { 100 * 1024 }
fn default_allowed_origins() -> Vec<String> { vec!["https://divine-dustsans-404.github.io".into()] }
fn default_data_file() -> String { "data/aus.json".into() }
fn default_mongodb_database() -> String { "dusttale".into() }
fn default_mongodb_collection() -> String { "aus".into() }
fn default_log_format() -> String { "compact".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (if present) → environment overrides → validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables; `lookup` is injected so tests don't touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be a number in 1..=65535, got `{port}`"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(origins) = lookup("ALLOWED_ORIGIN") {
            self.cors.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        if let Some(path) = lookup("DATA_FILE") {
            self.storage.data_file = path;
        }
        if let Some(uri) = lookup("MONGODB_URI") {
            self.storage.mongodb_uri = uri;
        }
        if let Some(db) = lookup("MONGODB_DATABASE") {
            self.storage.mongodb_database = db;
        }
        if let Some(coll) = lookup("MONGODB_COLLECTION") {
            self.storage.mongodb_collection = coll;
        }
        if let Some(token) = lookup("ADMIN_TOKEN") {
            self.admin.token = token;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.cors.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.max_body_bytes == 0 {
            self.max_body_bytes = default_max_body_bytes();
        }
        Ok(())
    }
}

impl CorsConfig {
    fn validate(&self) -> Result<()> {
        if self.allowed_origins.is_empty() {
            return Err(anyhow!("cors.allowed_origins is empty; set ALLOWED_ORIGIN or use \"*\""));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            StorageBackend::File => {
                if self.data_file.trim().is_empty() {
                    return Err(anyhow!("storage.data_file is empty"));
                }
            }
            StorageBackend::Mongodb => {
                let lower = self.mongodb_uri.to_lowercase();
                if lower.trim().is_empty() {
                    return Err(anyhow!("storage.mongodb_uri is empty; set it in config.toml or MONGODB_URI"));
                }
                if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
                    return Err(anyhow!("storage.mongodb_uri must start with mongodb:// or mongodb+srv://"));
                }
                if self.mongodb_database.trim().is_empty() || self.mongodb_collection.trim().is_empty() {
                    return Err(anyhow!("storage.mongodb_database and storage.mongodb_collection must be set"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let mut cfg = load_from_str("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.data_file, "data/aus.json");
        assert_eq!(cfg.cors.allowed_origins, vec!["https://divine-dustsans-404.github.io"]);
        assert!(cfg.admin.token.is_empty());
    }

    #[test]
    fn toml_sections_are_read() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [cors]
            allowed_origins = ["http://localhost:3000", "https://example.org"]

            [storage]
            backend = "mongodb"
            mongodb_uri = "mongodb://localhost:27017"

            [admin]
            token = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
        assert_eq!(cfg.storage.backend, StorageBackend::Mongodb);
        assert_eq!(cfg.storage.mongodb_collection, "aus");
        assert_eq!(cfg.admin.token, "s3cret");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[
            ("PORT", "3001"),
            ("ALLOWED_ORIGIN", "https://a.example, https://b.example"),
            ("ADMIN_TOKEN", "tok"),
            ("DATA_FILE", "/tmp/aus.json"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.cors.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cfg.admin.token, "tok");
        assert_eq!(cfg.storage.data_file, "/tmp/aus.json");
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env(&[("PORT", "http")])).is_err());
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn mongodb_backend_requires_uri() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("STORAGE_BACKEND", "mongodb")])).unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        cfg.apply_env(env(&[("MONGODB_URI", "postgres://nope")])).unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        cfg.apply_env(env(&[("MONGODB_URI", "mongodb+srv://cluster.example")])).unwrap();
        assert!(cfg.normalize_and_validate().is_ok());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env(&[("STORAGE_BACKEND", "redis")])).is_err());
    }

    #[test]
    fn wildcard_origin() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("ALLOWED_ORIGIN", "*")])).unwrap();
        assert!(cfg.cors.allows_any());
        cfg.apply_env(env(&[("ALLOWED_ORIGIN", " , ")])).unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
