// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the router's web management interface.
//!
//! Provides [`RouterHttpClient`], which logs in through `/login/Auth` and
//! fetches the inbox through `/goform/getModules`. No cookie jar is kept:
//! every tick logs in again and passes the session explicitly.

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::Encoding;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, ORIGIN, REFERER, SET_COOKIE, USER_AGENT};
use secrecy::ExposeSecret;
use tracing::debug;

use smsbridge_config::model::RouterConfig;
use smsbridge_core::{
    AdapterType, Credentials, HealthStatus, PluginAdapter, RawSmsEntry, RouterClient,
    SessionCookie, SmsBridgeError,
};

use crate::auth::{self, LoginRequest};
use crate::listing::{self, LOG_PREVIEW_CHARS};

const LISTING_ACCEPT: &str = "application/json, text/plain, */*";

/// HTTP client for one router.
#[derive(Debug, Clone)]
pub struct RouterHttpClient {
    client: reqwest::Client,
    base_url: String,
    encoding: &'static Encoding,
    page_size: u32,
    user_agent: String,
}

impl RouterHttpClient {
    /// Build a client from the `[router]` config section.
    pub fn new(config: &RouterConfig) -> Result<Self, SmsBridgeError> {
        let encoding = listing::resolve_encoding(&config.encoding)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| SmsBridgeError::Transport {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            encoding,
            page_size: config.page_size,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn referer(&self) -> String {
        format!("{}/index.html", self.base_url)
    }

    fn listing_url(&self) -> Result<Url, SmsBridgeError> {
        let mut url = Url::parse(&format!("{}/goform/getModules", self.base_url))
            .map_err(|e| SmsBridgeError::Config(format!("invalid router base_url: {e}")))?;
        // Cache buster.
        let rand: f64 = rand::random();
        url.query_pairs_mut()
            .append_pair("rand", &rand.to_string())
            .append_pair("currentPage", "1")
            .append_pair("pageSizes", &self.page_size.to_string())
            .append_pair("modules", "smsList");
        Ok(url)
    }
}

fn transport_error(what: &str, e: reqwest::Error) -> SmsBridgeError {
    SmsBridgeError::Transport {
        message: format!("{what}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for RouterHttpClient {
    fn name(&self) -> &str {
        "router-http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Router
    }

    /// Reachability only: any HTTP answer counts as healthy.
    async fn health_check(&self) -> Result<HealthStatus, SmsBridgeError> {
        match self.client.get(self.referer()).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "router reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "router unreachable at {}: {e}",
                self.base_url
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), SmsBridgeError> {
        Ok(())
    }
}

#[async_trait]
impl RouterClient for RouterHttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionCookie, SmsBridgeError> {
        let request = LoginRequest {
            username: &credentials.username,
            password: auth::hash_password(credentials.password.expose_secret()),
        };

        let response = self
            .client
            .post(format!("{}/login/Auth", self.base_url))
            .header(CONTENT_TYPE, "application/json")
            .header(REFERER, self.referer())
            .header(ORIGIN, &self.base_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("login request failed", e))?;

        let status = response.status();
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read login response", e))?;

        let session = auth::evaluate_login(&body, set_cookies.iter().map(String::as_str))?;
        debug!(%status, cookies = ?session.names(), "router login accepted");
        Ok(session)
    }

    async fn fetch_sms_list(
        &self,
        session: &SessionCookie,
    ) -> Result<Vec<RawSmsEntry>, SmsBridgeError> {
        let response = self
            .client
            .get(self.listing_url()?)
            .header(REFERER, self.referer())
            .header("X-Requested-With", "XMLHttpRequest")
            .header(COOKIE, session.as_str())
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, LISTING_ACCEPT)
            .send()
            .await
            .map_err(|e| transport_error("listing request failed", e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("failed to read listing response", e))?;

        let text = listing::decode_body(&bytes, self.encoding);
        debug!(
            %status,
            bytes = bytes.len(),
            preview = %listing::preview(&text, LOG_PREVIEW_CHARS),
            "listing received"
        );
        listing::parse_listing(&text)
    }
}
