// src/client.rs

use crate::config::NearbyConfig;
use crate::error::NearbyError;
use crate::types::RadiusOption;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

const REST_PATH: &str = "/rest/v1";

/// The client for reading tables from a Supabase project through its PostgREST API.
///
/// `SupabaseClient` holds the project URL and the anon (public) API key, plus an optional
/// user access token obtained from Supabase Auth. Requests go through one shared
/// `reqwest::Client`, so cloning the client is cheap.
///
/// # Initialization
///
/// ```rust,no_run
/// use nearby_rs::SupabaseClient;
/// # use nearby_rs::NearbyError;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), NearbyError> {
/// let client = SupabaseClient::new("https://xyzcompany.supabase.co", "public-anon-key")?;
///
/// // Client is now ready to be used
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    pub server_url: String,
    pub(crate) anon_key: String,
    pub(crate) http_client: Client,
    pub(crate) access_token: Option<String>,
    pub(crate) events_table: String,
    pub(crate) venues_table: String,
    pub(crate) default_radius: RadiusOption,
}

impl SupabaseClient {
    /// Creates a new `SupabaseClient`.
    ///
    /// # Arguments
    ///
    /// * `server_url`: The project URL (e.g., `"https://xyzcompany.supabase.co"`). A missing
    ///   scheme defaults to `http://` and a trailing `/rest/v1` is stripped, so both the
    ///   project URL and the REST endpoint URL are accepted.
    /// * `anon_key`: The project's anon key. It is sent as the `apikey` header on every
    ///   request and as the bearer token while no user is signed in.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new client, or a `NearbyError` if the URL cannot be used
    /// as a base URL or the key is not a valid header value.
    pub fn new(server_url: &str, anon_key: &str) -> Result<Self, NearbyError> {
        let mut temp_url_string = server_url.trim().to_string();

        // Ensure scheme is present
        if !temp_url_string.starts_with("http://") && !temp_url_string.starts_with("https://") {
            temp_url_string = format!("http://{}", temp_url_string);
        }

        let parsed_server_url = Url::parse(&temp_url_string)?;

        if parsed_server_url.cannot_be_a_base() || parsed_server_url.host_str().is_none() {
            return Err(NearbyError::InvalidUrl(format!(
                "The server_url '{}' resolved to '{}', which cannot be a base URL. Please provide a full project URL (e.g., https://xyzcompany.supabase.co).",
                server_url, parsed_server_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key).map_err(NearbyError::InvalidHeaderValue)?,
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(NearbyError::ReqwestError)?;

        let mut final_server_url = parsed_server_url.as_str().trim_end_matches('/').to_string();

        // Accept the REST endpoint itself as well as the bare project URL.
        if final_server_url.ends_with(REST_PATH) {
            final_server_url.truncate(final_server_url.len() - REST_PATH.len());
        }

        log::debug!(
            "SupabaseClient initialized with base server_url: {}",
            final_server_url
        );

        Ok(Self {
            server_url: final_server_url,
            anon_key: anon_key.to_string(),
            http_client,
            access_token: None,
            events_table: "events".to_string(),
            venues_table: "venues".to_string(),
            default_radius: RadiusOption::default(),
        })
    }

    /// Creates a client from a [`NearbyConfig`], carrying over its table names, default
    /// radius and access token.
    pub fn from_config(config: &NearbyConfig) -> Result<Self, NearbyError> {
        let mut client = Self::new(&config.supabase_url, &config.anon_key)?;
        client.events_table = config.events_table.clone();
        client.venues_table = config.venues_table.clone();
        client.default_radius = config.default_radius;
        client.set_access_token(config.access_token.clone());
        Ok(client)
    }

    /// Sets or clears the user access token (a Supabase Auth JWT).
    ///
    /// While a token is set it replaces the anon key in the `Authorization` header, so row
    /// level security policies see the signed-in user.
    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    /// Returns the current access token, if one is set on the client.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Checks if the client currently acts on behalf of a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn events_table(&self) -> &str {
        &self.events_table
    }

    pub fn venues_table(&self) -> &str {
        &self.venues_table
    }

    /// The radius used by [`SupabaseClient::nearby_events_default`] and
    /// [`SupabaseClient::nearby_venues_default`].
    pub fn default_radius(&self) -> RadiusOption {
        self.default_radius
    }

    pub fn set_default_radius(&mut self, radius: RadiusOption) {
        self.default_radius = radius;
    }

    // Builds `<server>/rest/v1/<table>` with the given query parameters appended.
    pub(crate) fn table_url(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Url, NearbyError> {
        let base_url = Url::parse(&self.server_url).map_err(|e| {
            NearbyError::InvalidUrl(format!(
                "Base server URL '{}' is invalid: {}",
                self.server_url, e
            ))
        })?;

        let api_path = format!("{}/{}", REST_PATH, table.trim_start_matches('/'));

        let mut full_url = base_url.join(&api_path).map_err(|e| {
            NearbyError::InvalidUrl(format!(
                "Failed to join base URL '{}' with API path '{}': {}",
                base_url, api_path, e
            ))
        })?;

        if !params.is_empty() {
            let mut pairs = full_url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(full_url)
    }

    fn auth_headers(&self) -> Result<HeaderMap, NearbyError> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(NearbyError::InvalidHeaderValue)?,
        );
        Ok(headers)
    }
}

// Helper method for GET requests with URL parameters (table reads)
impl SupabaseClient {
    pub(crate) async fn _get_with_url_params<R: DeserializeOwned + Send + 'static>(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<R, NearbyError> {
        let full_url = self.table_url(table, params)?;

        log::debug!(
            "Preparing GET request with params: URL={}, Authenticated={}",
            full_url.as_str(),
            self.is_authenticated()
        );

        let headers = self.auth_headers()?;
        let request_builder = self.http_client.get(full_url.clone()).headers(headers);

        let response = request_builder
            .send()
            .await
            .map_err(NearbyError::ReqwestError)?;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("--- Supabase Response ---");
            log::debug!("Status: {}", response.status());
            for (name, value) in response.headers() {
                log::debug!("Header: {}: {:?}", name, value);
            }
        }

        let status = response.status();
        if status.is_success() {
            let body_bytes = response.bytes().await.map_err(NearbyError::ReqwestError)?;
            log::debug!(
                "Request successful. Response body: {}",
                String::from_utf8_lossy(&body_bytes)
            );
            serde_json::from_slice(&body_bytes).map_err(|e| {
                NearbyError::JsonDeserializationFailed(format!(
                    "Error: {}, Body: {}",
                    e,
                    String::from_utf8_lossy(&body_bytes).into_owned()
                ))
            })
        } else {
            let error_body_bytes = response.bytes().await.map_err(NearbyError::ReqwestError)?;
            let error_body_string = String::from_utf8_lossy(&error_body_bytes).to_string();
            log::warn!(
                "Request failed with status {} and body: {}",
                status,
                error_body_string
            );
            match serde_json::from_slice::<Value>(&error_body_bytes) {
                Ok(json_value) => Err(NearbyError::from_response(status.as_u16(), json_value)),
                Err(_) => {
                    let fallback_json = serde_json::json!({
                        "code": status.as_u16(),
                        "message": error_body_string
                    });
                    Err(NearbyError::from_response(status.as_u16(), fallback_json))
                }
            }
        }
    }
}
