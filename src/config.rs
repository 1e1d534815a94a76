// Run configuration, built once from the command line and handed to the
// pipeline by reference.

use crate::error::VerifyError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://bws.bioid.com/extension/photoverify2";

/// Upper bound for the whole HTTP exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub app_secret: String,
    pub photo: PathBuf,
    pub image1: PathBuf,
    /// `None` when no second live image was requested.
    pub image2: Option<PathBuf>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Config {
    /// Validate the required values. An empty `image2` means "not given".
    pub fn new(app_id: &str, app_secret: &str, photo: &str, image1: &str, image2: &str) -> Result<Self, VerifyError> {
        let required = [
            ("BWSAppID", app_id),
            ("BWSAppSecret", app_secret),
            ("photo", photo),
            ("image1", image1),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(VerifyError::Input(format!("{} must not be empty", name)));
        }

        Ok(Config {
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            photo: PathBuf::from(photo),
            image1: PathBuf::from(image1),
            image2: if image2.is_empty() { None } else { Some(PathBuf::from(image2)) },
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
