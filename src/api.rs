//! One-shot calls against a running backend

use std::time::Duration;

use deskhost_backend::{BackendClient, User};
use deskhost_core::prelude::*;

const API_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /api/hello`, printed as JSON
pub async fn hello(base_url: &str) -> Result<()> {
    let client = BackendClient::new(base_url, API_TIMEOUT)?;
    let hello = client
        .hello()
        .await
        .with_context(|| format!("GET {}/api/hello", base_url))?;
    println!("{}", serde_json::to_string_pretty(&hello)?);
    Ok(())
}

/// `POST /api/user`, printing the backend's answer as JSON
pub async fn create_user(base_url: &str, user: User) -> Result<()> {
    let client = BackendClient::new(base_url, API_TIMEOUT)?;
    let created = client
        .create_user(&user)
        .await
        .with_context(|| format!("POST {}/api/user", base_url))?;
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}
