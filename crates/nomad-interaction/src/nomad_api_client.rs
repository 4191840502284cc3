//! NomadApiClient - HTTP client for the search and itinerary backends.

use std::time::Duration;

use async_trait::async_trait;
use nomad_core::config::ApiConfig;
use nomad_core::error::{NomadError, Result};
use nomad_core::travel::{Destination, PlanReply, SearchReply, TravelApi, TripPreferences};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::http::{self, build_client, map_http_error};

/// Reply used when the backend returns cities without any text.
pub const DEFAULT_TRAVEL_REPLY: &str = "Here are some destinations you might like:";

/// `TravelApi` over HTTP.
#[derive(Clone)]
pub struct NomadApiClient {
    client: Client,
    search_url: String,
    plan_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

#[derive(Serialize)]
struct PlanRequest<'a> {
    destinations: &'a [Destination],
    #[serde(flatten)]
    preferences: &'a TripPreferences,
}

impl NomadApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            search_url: config.search_url(),
            plan_url: config.plan_url(),
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    pub fn plan_url(&self) -> &str {
        &self.plan_url
    }
}

#[async_trait]
impl TravelApi for NomadApiClient {
    async fn search(&self, query: &str, session_id: Option<&str>) -> Result<SearchReply> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NomadError::validation("query must not be empty"));
        }

        let request = SearchRequest { query, session_id };
        let response = http::post_json(&self.client, &self.search_url, &request).await?;
        if !response.status.is_success() {
            return Err(map_http_error(response.status, &response.body));
        }

        Ok(interpret_search_body(&response.body))
    }

    async fn generate_plan(
        &self,
        destinations: &[Destination],
        preferences: &TripPreferences,
    ) -> Result<PlanReply> {
        let request = PlanRequest {
            destinations,
            preferences,
        };
        let response = http::post_json(&self.client, &self.plan_url, &request).await?;
        if !response.status.is_success() {
            return Err(map_http_error(response.status, &response.body));
        }

        serde_json::from_str::<PlanReply>(&response.body).map_err(|err| {
            NomadError::remote_api(
                Some(response.status.as_u16()),
                format!("unexpected plan response: {err}"),
            )
        })
    }
}

/// Turns a search response body into a [`SearchReply`].
///
/// The expected shape is `{ friendlyAiReply?, query?, cities? }`. Anything
/// else is shown as plain text. Cities that do not decode are dropped.
pub fn interpret_search_body(body: &str) -> SearchReply {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(body) else {
        return SearchReply::text(body);
    };

    let friendly = match fields.remove("friendlyAiReply") {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    };

    let destinations: Vec<Destination> = match fields.remove("cities") {
        Some(Value::Array(cities)) => cities
            .into_iter()
            .filter_map(|city| match serde_json::from_value::<Destination>(city) {
                Ok(destination) => Some(destination),
                Err(err) => {
                    tracing::warn!("Dropping undecodable city: {}", err);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    match (friendly, destinations.is_empty()) {
        (reply, false) => SearchReply {
            reply: reply.unwrap_or_else(|| DEFAULT_TRAVEL_REPLY.to_string()),
            destinations: Some(destinations),
        },
        (Some(reply), true) => SearchReply::text(reply),
        (None, true) => SearchReply::text(body),
    }
}
