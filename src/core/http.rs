use std::time::Duration;

use reqwest::{
    blocking::{
        Client,
        Response,
    },
    header::USER_AGENT,
};

use crate::core::DeckError;

pub fn http_client(timeout: Duration) -> Result<Client, DeckError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DeckError::Custom(format!("HTTP client build failed: {e}")))
}

/// Single bounded GET, no retries. Image fetches are best-effort; the caller
/// decides whether a failure is fatal.
pub fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>, DeckError> {
    let resp = client.get(url).header(USER_AGENT, "vocadeck/0.3 (+reqwest)").send()?;
    ensure_success(&resp)?;
    let bytes = resp.bytes()?;
    Ok(bytes.to_vec())
}

fn ensure_success(resp: &Response) -> Result<(), DeckError> {
    if !resp.status().is_success() {
        return Err(DeckError::HttpStatus {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(())
}
