// HTTP client for the policy manager's config API.
//
// Wraps `reqwest::Client` with canonical URL construction, the `sid`
// session cookie, and status/body handling. Every method is a single
// round trip: no retries, no caching.

use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::collection::Collection;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{Object, ResourceSpec};

/// Raw HTTP client for the config API.
///
/// Holds only read-only state (base URL and a client carrying the session
/// cookie), so one instance can be shared across concurrent operations on
/// independent objects.
#[derive(Debug, Clone)]
pub struct PsmClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PsmClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client that attaches `Cookie: sid=<session>` to every request.
    ///
    /// The session id is obtained by the caller's login flow and treated as
    /// an opaque string here.
    pub fn new(
        base_url: &str,
        session: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut cookie = HeaderValue::from_str(&format!("sid={}", session.expose_secret()))
            .map_err(|e| Error::InvalidSession(e.to_string()))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages the session cookie).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        Ok(url)
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/configs/{group}/v1/tenant/{tenant}/{collection}`
    pub fn collection_url(&self, collection: Collection, tenant: &str) -> Result<Url, Error> {
        self.build_url(collection, tenant, None)
    }

    /// `{base}/configs/{group}/v1/tenant/{tenant}/{collection}/{name}`
    pub fn object_url(
        &self,
        collection: Collection,
        tenant: &str,
        name: &str,
    ) -> Result<Url, Error> {
        self.build_url(collection, tenant, Some(name))
    }

    fn build_url(
        &self,
        collection: Collection,
        tenant: &str,
        name: Option<&str>,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?;
            segments.pop_if_empty().extend([
                "configs",
                collection.api_group(),
                collection.api_version(),
                "tenant",
                tenant,
                collection.path_segment(),
            ]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    // ── Typed document helpers ───────────────────────────────────────

    /// `GET` a document by name.
    pub async fn get_object<S, T>(&self, tenant: &str, name: &str) -> Result<Object<S, T>, Error>
    where
        S: ResourceSpec,
        T: DeserializeOwned,
    {
        let url = self.object_url(S::COLLECTION, tenant, name)?;
        self.get(url).await
    }

    /// `POST` a new document to its collection.
    pub async fn create_object<S, T>(&self, document: &Object<S, T>) -> Result<Object<S, T>, Error>
    where
        S: ResourceSpec,
        T: DeserializeOwned + Sync,
    {
        let url = self.collection_url(S::COLLECTION, &document.meta.tenant)?;
        self.post(url, document).await
    }

    /// `PUT` a whole document over the existing one.
    pub async fn replace_object<S, T>(&self, document: &Object<S, T>) -> Result<Object<S, T>, Error>
    where
        S: ResourceSpec,
        T: DeserializeOwned + Sync,
    {
        let url = self.object_url(S::COLLECTION, &document.meta.tenant, &document.meta.name)?;
        self.put(url, document).await
    }

    /// `DELETE` a document by name.
    pub async fn delete_object<S: ResourceSpec>(&self, tenant: &str, name: &str) -> Result<(), Error> {
        let url = self.object_url(S::COLLECTION, tenant, name)?;
        self.delete(url).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// Send a GET request. Anything but `200 OK` is a rejection.
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(Self::rejection(resp).await);
        }
        Self::decode(resp).await
    }

    /// Send a POST request with a JSON body. Any 2xx is accepted.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        Self::trace_body(body);

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// Send a PUT request with a JSON body. Any 2xx is accepted.
    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        Self::trace_body(body);

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// Send a DELETE request. `200 OK` and `204 No Content` are success.
    pub async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        match resp.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::rejection(resp).await),
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        if !resp.status().is_success() {
            return Err(Self::rejection(resp).await);
        }
        Self::decode(resp).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Turn a non-success response into `Error::Remote`, keeping the body.
    async fn rejection(resp: reqwest::Response) -> Error {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Error::Remote {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body,
        }
    }

    /// Log the outgoing body at trace level with the pre-shared key masked.
    fn trace_body<B: Serialize>(body: &B) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        if let Ok(mut value) = serde_json::to_value(body) {
            redact(&mut value);
            trace!(body = %value, "request body");
        }
    }
}

fn redact(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if key == "pre-shared-key" {
                    *field = serde_json::Value::String("<redacted>".into());
                } else {
                    redact(field);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}
