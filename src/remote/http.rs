//! Blocking HTTP implementation of [`Remote`]

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_LENGTH;

use super::{Remote, RemoteBody};
use crate::error::{self, Result};

/// HTTP client with a per-operation timeout and fixed User-Agent
pub struct HttpRemote {
    client: Client,
}

impl HttpRemote {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &Url) -> Result<Response> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| error::remote::request_failed(url.as_str(), e))?;
        check_status(url, response)
    }
}

fn check_status(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(error::remote::request_failed(
            url.as_str(),
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ),
        ));
    }
    Ok(response)
}

impl Remote for HttpRemote {
    fn fetch_text(&self, url: &Url) -> Result<String> {
        tracing::debug!(url = %url, "fetching document");
        self.get(url)?
            .text()
            .map_err(|e| error::remote::request_failed(url.as_str(), e))
    }

    fn probe_size(&self, url: &Url) -> Result<u64> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .map_err(|e| error::remote::request_failed(url.as_str(), e))?;
        let response = check_status(url, response)?;

        // HEAD responses carry no body, so read the header rather than the body size hint
        let length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Ok(length)
    }

    fn open(&self, url: &Url) -> Result<RemoteBody> {
        tracing::debug!(url = %url, "opening download stream");
        Ok(Box::new(self.get(url)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpRemote::new("dumpmirror-test/0.0", Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_request_failure() {
        let remote = HttpRemote::new("dumpmirror-test/0.0", Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on loopback is closed on test hosts
        let url = Url::parse("http://127.0.0.1:9/listing/").unwrap();
        let err = remote.fetch_text(&url).unwrap_err();
        assert!(matches!(err, crate::error::MirrorError::RequestFailed { .. }));
    }
}
