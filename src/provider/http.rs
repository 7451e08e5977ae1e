use crate::error::{Result, TariffWatchError};
use std::time::Duration;

/// User agent sent to the tariff provider
pub fn user_agent() -> String {
    format!("tariffwatch/{}", env!("APP_VERSION"))
}

/// Shared HTTP client; every request is bounded by `timeout`
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .map_err(|e| TariffWatchError::config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a non-success status to an API error
pub(crate) fn ensure_success(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(TariffWatchError::api(format!(
            "{} returned HTTP {}",
            what, status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_version() {
        assert!(user_agent().starts_with("tariffwatch/"));
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_http_client(Duration::from_secs(10)).is_ok());
    }
}
