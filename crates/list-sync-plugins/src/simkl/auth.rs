use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::http::trim_base_url;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// PIN issued by `/oauth/pin`, shown to the user while we poll
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCode {
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
    #[serde(default)]
    pub interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PinStatusResponse {
    result: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Where a single poll of the PIN status left us
#[derive(Debug, PartialEq, Eq)]
enum PinPoll {
    Authorized(String),
    Pending,
    SlowDown,
}

/// Obtain a Simkl access token.
///
/// Tries the refresh token first and falls back to the PIN flow, calling
/// `on_pin` once with the code the user has to enter.
pub async fn authenticate<F>(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: Option<&str>,
    on_pin: F,
) -> Result<TokenInfo>
where
    F: FnOnce(&DeviceCode),
{
    let base_url = trim_base_url(base_url);

    if let Some(refresh_token) = refresh_token.filter(|token| !token.is_empty()) {
        match refresh_access_token(client, &base_url, client_id, client_secret, refresh_token).await {
            Ok(token_info) => return Ok(token_info),
            Err(e) => debug!("Simkl token refresh failed, starting PIN flow: {}", e),
        }
    }

    authorize_with_pin(client, &base_url, client_id, on_pin).await
}

async fn refresh_access_token(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenInfo> {
    let payload = serde_json::json!({
        "refresh_token": refresh_token,
        "client_id": client_id,
        "client_secret": client_secret,
        "grant_type": "refresh_token"
    });

    let response = client
        .post(format!("{}/oauth/token", base_url))
        .json(&payload)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("Token refresh failed: {}", response.status()));
    }

    let token_response: TokenResponse = response.json().await?;
    let expires_at = Utc::now() + Duration::seconds(token_response.expires_in as i64 - 120);

    let refresh_token = token_response.refresh_token.unwrap_or_default();
    if refresh_token.is_empty() {
        warn!("Simkl API did not return a refresh_token. Token refresh will not be possible.");
    }

    Ok(TokenInfo {
        access_token: token_response.access_token,
        refresh_token,
        expires_at,
    })
}

async fn authorize_with_pin<F>(client: &Client, base_url: &str, client_id: &str, on_pin: F) -> Result<TokenInfo>
where
    F: FnOnce(&DeviceCode),
{
    let client_id = urlencoding::encode(client_id);

    let response = client
        .get(format!("{}/oauth/pin?client_id={}", base_url, client_id))
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Failed to request device code: {} - {}", status, error_text));
    }

    let device_code: DeviceCode = response.json().await?;
    on_pin(&device_code);

    let poll_interval = device_code.interval.unwrap_or(5).max(1);
    let expires_at = Utc::now() + Duration::seconds(device_code.expires_in as i64);
    let status_url = format!(
        "{}/oauth/pin/{}?client_id={}",
        base_url,
        urlencoding::encode(&device_code.user_code),
        client_id
    );

    loop {
        sleep(StdDuration::from_secs(poll_interval)).await;

        if Utc::now() >= expires_at {
            return Err(anyhow!("Device code expired. Please try again."));
        }

        let response = client
            .get(&status_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow!("Unexpected error during authorization: {} - {}", status, body));
        }

        let parsed: PinStatusResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse status response: {}", e))?;

        match interpret_pin_status(parsed)? {
            PinPoll::Authorized(access_token) => {
                // Simkl access tokens do not expire
                return Ok(TokenInfo {
                    access_token,
                    refresh_token: String::new(),
                    expires_at: Utc::now() + Duration::days(365 * 100),
                });
            }
            PinPoll::Pending => debug!("Simkl PIN authorization pending"),
            PinPoll::SlowDown => sleep(StdDuration::from_secs(poll_interval)).await,
        }
    }
}

fn interpret_pin_status(response: PinStatusResponse) -> Result<PinPoll> {
    match response.result.as_str() {
        "OK" => response
            .access_token
            .map(PinPoll::Authorized)
            .ok_or_else(|| anyhow!("Authorization successful but no access_token in response")),
        "KO" => match response.message.as_deref() {
            Some("Authorization pending") | None => Ok(PinPoll::Pending),
            Some("Slow down") => Ok(PinPoll::SlowDown),
            Some(msg) => Err(anyhow!("Authorization failed: {}", msg)),
        },
        other => Err(anyhow!("Unexpected result in status response: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: &str) -> PinStatusResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_pin_status_ok() {
        let poll = interpret_pin_status(status(r#"{"result":"OK","access_token":"abc"}"#)).unwrap();
        assert_eq!(poll, PinPoll::Authorized("abc".to_string()));
    }

    #[test]
    fn test_pin_status_pending_and_slow_down() {
        let pending = status(r#"{"result":"KO","message":"Authorization pending"}"#);
        assert_eq!(interpret_pin_status(pending).unwrap(), PinPoll::Pending);
        let slow = status(r#"{"result":"KO","message":"Slow down"}"#);
        assert_eq!(interpret_pin_status(slow).unwrap(), PinPoll::SlowDown);
    }

    #[test]
    fn test_pin_status_errors() {
        assert!(interpret_pin_status(status(r#"{"result":"OK"}"#)).is_err());
        assert!(interpret_pin_status(status(r#"{"result":"KO","message":"Invalid code"}"#)).is_err());
        assert!(interpret_pin_status(status(r#"{"result":"??"}"#)).is_err());
    }

    #[test]
    fn test_device_code_parse() {
        let code: DeviceCode = serde_json::from_str(
            r#"{"result":"OK","device_code":"DEVICE","user_code":"ABCDE","verification_url":"https://simkl.com/pin","expires_in":900,"interval":5}"#,
        )
        .unwrap();
        assert_eq!(code.user_code, "ABCDE");
        assert_eq!(code.interval, Some(5));
    }
}
