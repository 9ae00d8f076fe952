use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::config::Config;
use crate::error::ApiError;

/// Thin wrapper over `reqwest::Client` bound to one API base URL.
///
/// Every failure, whether the request never got an answer or the server
/// answered with a non-2xx status, comes back as an [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
    log_errors: bool,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            log_errors: config.is_development(),
        })
    }

    /// Resolves `path` below the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(format!("{} cannot be a base URL", self.base_url), None, None))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, query, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::DELETE, path, &[], None).await
    }

    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.set_query(Some(&encode_query(query)));
        }
        tracing::debug!(%method, %url, "API request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = match request.send().await {
            Ok(response) => Self::read_response(response).await,
            Err(err) => Err(ApiError::from(err)),
        };

        result.map_err(|err| self.report(err))
    }

    async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            // The server already acted on the request; an unreadable body is final.
            return response
                .json::<T>()
                .await
                .map_err(|err| ApiError::normalize(Some(status.as_u16()), None, &err.to_string()));
        }

        let data = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<Value>(&body).ok());

        Err(ApiError::normalize(
            Some(status.as_u16()),
            data,
            &format!("Request failed with status code {}", status.as_u16()),
        ))
    }

    fn report(&self, err: ApiError) -> ApiError {
        if self.log_errors {
            tracing::error!(
                message = %err.message,
                status = ?err.status,
                data = ?err.data,
                "API Error"
            );
        }
        err
    }
}

/// `key=value` pairs joined by `&`, with spaces sent as `%20` rather than `+`.
fn encode_query(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode_component(value: &str) -> String {
    // A literal '+' is already escaped as %2B, so every '+' left is a space.
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
