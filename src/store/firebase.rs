//! Firebase Realtime Database over its REST API.
//!
//! Every node is addressable as `<database url>/<path>.json`: `GET` reads it, `PUT`
//! replaces it and `PATCH` merges children. Authenticated databases take either a
//! legacy secret as `auth` or an OAuth2 access token as `access_token`; see [`Credentials`].

use log::{debug, info};
use reqwest::{Client, Method, Url};
use serde_json::{Map, Value};
use std::time::Duration;

use super::auth::Credentials;
use super::{split_path, Store};
use crate::config::Config;
use crate::errors::StoreError;

pub struct FirebaseStore {
    base: Url,
    credentials: Credentials,
    client: Client,
}

impl FirebaseStore {
    /// Store authenticated with a database secret or ID token, if `token` is non-empty.
    pub fn new(
        database_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        Self::with_credentials(database_url, Credentials::secret(token), timeout)
    }

    pub fn with_credentials(
        database_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base = Url::parse(database_url).map_err(|e| {
            StoreError::Init(format!("invalid database url '{}': {}", database_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::Init(format!(
                "unsupported database url scheme '{}'",
                base.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Init(format!("http client: {}", e)))?;
        Ok(Self {
            base,
            credentials,
            client,
        })
    }

    /// Build the store from config, reading the token file when one is configured.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let credentials = match config.firebase.token.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    StoreError::Init(format!("failed to read token file {}: {}", path, e))
                })?;
                Credentials::from_file_contents(&raw)?
            }
            _ => Credentials::None,
        };
        if let Credentials::ServiceAccount(sa) = &credentials {
            info!("Using service account {} for the datastore", sa.client_email());
        }
        Self::with_credentials(&config.database_url(), credentials, config.publish_timeout())
    }

    /// REST URL for `path`, each key percent-encoded.
    pub fn node_url(&self, path: &str) -> Result<String, StoreError> {
        let segments = split_path(path)?;
        let encoded: Vec<String> = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        Ok(format!(
            "{}/{}.json",
            self.base.as_str().trim_end_matches('/'),
            encoded.join("/")
        ))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, StoreError> {
        let url = self.node_url(path)?;
        debug!("firebase {} {}", method, url);
        let mut request = self.client.request(method, &url);
        if let Some((name, value)) = self.credentials.query_param(&self.client).await? {
            request = request.query(&[(name, value.as_str())]);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl Store for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        match self.send(Method::GET, path, None).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.send(Method::PUT, path, Some(&value)).await.map(|_| ())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let body = Value::Object(fields);
        self.send(Method::PATCH, path, Some(&body)).await.map(|_| ())
    }
}
