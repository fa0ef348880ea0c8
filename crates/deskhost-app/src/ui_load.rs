//! Main-frame load checks
//!
//! Reports whether a location handed to the window can actually load, with
//! the same network error codes a browser frame reports.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use deskhost_core::prelude::*;

pub const ERR_FAILED: i32 = -2;
pub const ERR_FILE_NOT_FOUND: i32 = -6;
pub const ERR_TIMED_OUT: i32 = -7;
pub const ERR_CONNECTION_REFUSED: i32 = -102;

/// Default bound on a single load check
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a location failed to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub code: i32,
    pub description: String,
}

impl LoadFailure {
    fn new(code: i32, description: &str) -> Self {
        Self {
            code,
            description: description.to_string(),
        }
    }
}

/// Inline and blank pages always load
pub fn needs_check(location: &str) -> bool {
    !(location.starts_with("data:") || location.starts_with("about:"))
}

/// Check that `location` loads.
///
/// Any HTTP response counts as loaded; only transport failures fail.
pub async fn check_location(
    http: &reqwest::Client,
    location: &str,
) -> std::result::Result<(), LoadFailure> {
    let url = Url::parse(location).map_err(|e| {
        debug!("Unparseable UI location {}: {}", location, e);
        LoadFailure::new(ERR_FAILED, "ERR_INVALID_URL")
    })?;

    match url.scheme() {
        "http" | "https" => check_http(http, url).await,
        "file" => check_file(&url),
        other => {
            debug!("Not checking {} location {}", other, location);
            Ok(())
        }
    }
}

async fn check_http(http: &reqwest::Client, url: Url) -> std::result::Result<(), LoadFailure> {
    match http.get(url).send().await {
        Ok(response) => {
            trace!("UI answered {}", response.status());
            Ok(())
        }
        Err(e) if e.is_timeout() => Err(LoadFailure::new(ERR_TIMED_OUT, "ERR_TIMED_OUT")),
        Err(e) if e.is_connect() => Err(LoadFailure::new(
            ERR_CONNECTION_REFUSED,
            "ERR_CONNECTION_REFUSED",
        )),
        Err(e) => {
            debug!("UI request failed: {}", e);
            Err(LoadFailure::new(ERR_FAILED, "ERR_FAILED"))
        }
    }
}

fn check_file(url: &Url) -> std::result::Result<(), LoadFailure> {
    let path: PathBuf = url
        .to_file_path()
        .map_err(|()| LoadFailure::new(ERR_FILE_NOT_FOUND, "ERR_FILE_NOT_FOUND"))?;

    if path.is_file() {
        Ok(())
    } else {
        Err(LoadFailure::new(ERR_FILE_NOT_FOUND, "ERR_FILE_NOT_FOUND"))
    }
}
