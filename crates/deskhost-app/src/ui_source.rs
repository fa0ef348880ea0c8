//! Where the window's UI comes from
//!
//! Development mode points at the UI dev server. Packaged mode prefers the
//! bundled build, falls back to a local build, and finally a blank page.

use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use deskhost_core::prelude::*;
use deskhost_core::RuntimeMode;

use crate::config::WindowSettings;

pub const BLANK_PAGE: &str = "about:blank";

/// Everything `encodeURIComponent` escapes
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolved UI location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiSource {
    /// A served UI (the dev server)
    Url(Url),
    /// A built `index.html` on disk
    File(PathBuf),
    /// Nothing to show
    Blank,
}

impl UiSource {
    /// The location handed to the window
    pub fn location(&self) -> String {
        match self {
            UiSource::Url(url) => url.to_string(),
            UiSource::File(path) => Url::from_file_path(path)
                .map(|url| url.to_string())
                .unwrap_or_else(|()| path.display().to_string()),
            UiSource::Blank => BLANK_PAGE.to_string(),
        }
    }
}

/// Pick the UI source for `mode`
pub fn resolve_ui_source(
    mode: RuntimeMode,
    app_root: &Path,
    resources_dir: &Path,
    window: &WindowSettings,
) -> Result<UiSource> {
    match mode {
        RuntimeMode::Development => {
            let url = Url::parse(&window.dev_url)
                .map_err(|e| Error::invalid_url(&window.dev_url, e.to_string()))?;
            debug!("Loading dev server at {}", url);
            Ok(UiSource::Url(url))
        }
        RuntimeMode::Packaged => {
            let packaged = resources_dir.join(&window.ui_dir).join("index.html");
            let fallback = app_root.join(&window.fallback_ui);

            if packaged.exists() {
                info!("Loading packaged UI at {}", packaged.display());
                Ok(UiSource::File(packaged))
            } else if fallback.exists() {
                info!(
                    "Packaged index not found, using fallback {}",
                    fallback.display()
                );
                Ok(UiSource::File(fallback))
            } else {
                error!(
                    "No packaged UI found at {} and no fallback at {}",
                    packaged.display(),
                    fallback.display()
                );
                Ok(UiSource::Blank)
            }
        }
    }
}

/// Inline diagnostic page shown when the main frame fails to load.
///
/// Returned as a `data:text/html,` URL.
pub fn load_failure_page(url: &str, code: i32, description: &str) -> String {
    let html = format!(
        r#"<html><body style="font-family:system-ui,Segoe UI,Arial;margin:40px;">
  <h1 style="color:#c00">UI failed to load</h1>
  <p><strong>URL:</strong> {}</p>
  <p><strong>Error:</strong> {} ({})</p>
  <p>In development, make sure your frontend dev server is running (npm run fe-dev) or check the packaged path.</p>
</body></html>"#,
        escape_html(url),
        code,
        escape_html(description)
    );
    format!(
        "data:text/html,{}",
        utf8_percent_encode(&html, URI_COMPONENT)
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
