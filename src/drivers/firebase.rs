// WardCam: Firebase Realtime Database Client
//
// Writes JSON values through the RTDB REST API (`PUT <path>.json`),
// authenticated with the database's legacy secret.  The HTTPS connection is
// opened lazily and dropped after a failed write so the next one reconnects.

use std::time::Duration;

use anyhow::{anyhow, bail};
use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::http::Method;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

use crate::config::DATABASE_TIMEOUT_MS;
use crate::platform::StateStore;
use crate::reporter::rest_url;

pub struct RealtimeDb {
    host: &'static str,
    secret: &'static str,
    client: Option<HttpClient<EspHttpConnection>>,
}

impl RealtimeDb {
    pub fn new(host: &'static str, secret: &'static str) -> Self {
        Self {
            host,
            secret,
            client: None,
        }
    }

    fn connect() -> anyhow::Result<HttpClient<EspHttpConnection>> {
        let conf = HttpConfiguration {
            timeout: Some(Duration::from_millis(DATABASE_TIMEOUT_MS)),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        Ok(HttpClient::wrap(EspHttpConnection::new(&conf)?))
    }

}

impl StateStore for RealtimeDb {
    fn is_ready(&mut self) -> bool {
        if self.client.is_none() {
            match Self::connect() {
                Ok(client) => self.client = Some(client),
                Err(e) => log::warn!("Database client init failed: {:#}", e),
            }
        }
        self.client.is_some()
    }

    fn set_json(&mut self, path: &str, body: &[u8]) -> anyhow::Result<()> {
        let url = rest_url(self.host, path, self.secret);
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| anyhow!("database client not ready"))?;

        let result = put_json(client, &url, body);
        if result.is_err() {
            self.client = None;
        }
        result
    }
}

fn put_json(
    client: &mut HttpClient<EspHttpConnection>,
    url: &str,
    body: &[u8],
) -> anyhow::Result<()> {
    let content_length = body.len().to_string();
    let headers = [
        ("Content-Type", "application/json"),
        ("Content-Length", content_length.as_str()),
    ];

    let mut request = client
        .request(Method::Put, url, &headers)
        .map_err(|e| anyhow!("{e:?}"))?;
    request.write_all(body).map_err(|e| anyhow!("{e:?}"))?;
    request.flush().map_err(|e| anyhow!("{e:?}"))?;
    let response = request.submit().map_err(|e| anyhow!("{e:?}"))?;

    let status = response.status();
    if !(200..300).contains(&status) {
        bail!("HTTP {status}");
    }
    Ok(())
}
