use std::env;
use std::path::PathBuf;

const DEFAULT_MODEL_PATH: &str = "train/model.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Location of the model artifact, read once at startup.
    pub model_path: PathBuf,

    /// Shared secret for `x-api-key`; unset disables the check
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8001".into())
                .parse()?,
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.into())
                .into(),
            api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }

    /// Returns true if callers must present a matching `x-api-key`.
    pub fn requires_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
