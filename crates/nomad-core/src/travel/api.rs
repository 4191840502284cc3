//! Remote travel API contract.
//!
//! The search and itinerary backends are opaque HTTP services. `TravelApi` is
//! the seam the application layer talks to, so the conversation flow can be
//! exercised against stub implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::destination::Destination;
use super::preferences::TripPreferences;
use crate::error::Result;

/// Parsed result of a search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    /// Assistant text shown in the transcript.
    pub reply: String,
    /// Present (and non-empty) only for travel responses.
    pub destinations: Option<Vec<Destination>>,
}

impl SearchReply {
    /// Plain text reply without recommendations.
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            destinations: None,
        }
    }

    /// A response is a travel response iff it carries at least one destination.
    pub fn is_travel(&self) -> bool {
        self.destinations.as_ref().is_some_and(|d| !d.is_empty())
    }
}

/// Result of an itinerary generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReply {
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,
}

/// Client contract for the search and itinerary endpoints.
///
/// Implementations perform exactly one request per call and never retry.
/// Failures surface as `NomadError::RemoteApi`; callers decide on fallbacks.
#[async_trait]
pub trait TravelApi: Send + Sync {
    /// Sends a chat query to the search endpoint.
    ///
    /// # Errors
    ///
    /// - `NomadError::Validation` if the query is blank after trimming
    /// - `NomadError::RemoteApi` on network failure or a non-2xx status
    async fn search(&self, query: &str, session_id: Option<&str>) -> Result<SearchReply>;

    /// Requests a trip itinerary for the given destinations.
    ///
    /// # Errors
    ///
    /// Returns `NomadError::RemoteApi` on network failure or a non-2xx status.
    async fn generate_plan(
        &self,
        destinations: &[Destination],
        preferences: &TripPreferences,
    ) -> Result<PlanReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::CostOfLiving;

    #[test]
    fn test_is_travel_requires_destinations() {
        assert!(!SearchReply::text("Hi there!").is_travel());

        let empty = SearchReply {
            reply: "nothing".into(),
            destinations: Some(vec![]),
        };
        assert!(!empty.is_travel());

        let travel = SearchReply {
            reply: "Here are some picks".into(),
            destinations: Some(vec![Destination::new(
                "1",
                "Chiang Mai",
                "Thailand",
                CostOfLiving::Low,
            )]),
        };
        assert!(travel.is_travel());
    }

    #[test]
    fn test_plan_reply_wire_format() {
        let reply: PlanReply =
            serde_json::from_str(r#"{"plan":"Day 1","estimatedCost":"$1,200"}"#).unwrap();
        assert_eq!(reply.estimated_cost.as_deref(), Some("$1,200"));

        let reply: PlanReply = serde_json::from_str(r#"{"plan":"Day 1"}"#).unwrap();
        assert!(reply.estimated_cost.is_none());
    }
}
