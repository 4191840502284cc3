//! Trip itineraries with a local fallback.
//!
//! The itinerary endpoint is preferred. When it fails, a plan is rendered
//! locally from the destinations and form values so the planner always has
//! something to show.

use std::sync::Arc;

use minijinja::{Environment, context};
use nomad_core::error::{NomadError, Result};
use nomad_core::travel::{CostOfLiving, Destination, MAX_TRIP_DAYS, TravelApi, TripPreferences};
use serde::Serialize;

/// Trip length assumed when the form has no usable date range.
pub const DEFAULT_TRIP_DAYS: i64 = 7;

const FALLBACK_TEMPLATE_NAME: &str = "fallback_plan";
const FALLBACK_TEMPLATE: &str = r#"{{ days | length }}-day trip: {{ places | join(" and ") }}
{% if start_date %}Dates: {{ start_date }} to {{ end_date }}
{% endif %}Budget: {{ budget }} | Style: {{ travel_style }} | Stay: {{ stay_type }}

{% for day in days %}Day {{ day.number }} - {{ day.place }}
{% if work_remotely %}  Morning: focused work from a coworking space
{% endif %}  Afternoon: {{ day.activity }}
{% endfor %}{% if notes %}
Notes: {{ notes }}
{% endif %}"#;

/// Where a plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    pub plan: String,
    pub estimated_cost: Option<String>,
    pub source: PlanSource,
}

#[derive(Serialize)]
struct PlanDay<'a> {
    number: i64,
    place: &'a str,
    activity: &'a str,
}

pub struct TripPlanner {
    api: Arc<dyn TravelApi>,
    templates: Environment<'static>,
}

impl TripPlanner {
    pub fn new(api: Arc<dyn TravelApi>) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(FALLBACK_TEMPLATE_NAME, FALLBACK_TEMPLATE)
            .map_err(|e| NomadError::internal(format!("invalid plan template: {e}")))?;
        Ok(Self { api, templates })
    }

    /// Requests an itinerary, falling back to a local plan when the endpoint
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns `NomadError::Validation` when `destinations` is empty. API
    /// failures are not errors.
    pub async fn plan(
        &self,
        destinations: &[Destination],
        preferences: &TripPreferences,
    ) -> Result<TripPlan> {
        check_destinations(destinations)?;

        match self.api.generate_plan(destinations, preferences).await {
            Ok(reply) => Ok(TripPlan {
                plan: reply.plan,
                estimated_cost: reply.estimated_cost,
                source: PlanSource::Remote,
            }),
            Err(e) => {
                tracing::warn!("[TripPlanner] Plan endpoint failed, using local plan: {}", e);
                self.fallback_plan(destinations, preferences)
            }
        }
    }

    /// Renders the local plan. Every destination gets at least one day, up
    /// to [`MAX_TRIP_DAYS`].
    ///
    /// # Errors
    ///
    /// Returns `NomadError::Validation` when `destinations` is empty or
    /// longer than the trip can cover.
    pub fn fallback_plan(
        &self,
        destinations: &[Destination],
        preferences: &TripPreferences,
    ) -> Result<TripPlan> {
        check_destinations(destinations)?;
        let total_days = preferences
            .duration_days()
            .unwrap_or(DEFAULT_TRIP_DAYS)
            .clamp(destinations.len() as i64, MAX_TRIP_DAYS);
        let places: Vec<String> = destinations.iter().map(Destination::label).collect();
        let days = build_days(&places, &preferences.activities, total_days);

        let template = self
            .templates
            .get_template(FALLBACK_TEMPLATE_NAME)
            .map_err(|e| NomadError::internal(e.to_string()))?;
        let plan = template
            .render(context! {
                places => &places,
                days => days,
                start_date => preferences.start_date.map(|d| d.to_string()),
                end_date => preferences.end_date.map(|d| d.to_string()),
                budget => &preferences.budget,
                travel_style => &preferences.travel_style,
                stay_type => &preferences.stay_type,
                work_remotely => preferences.work_remotely,
                notes => &preferences.notes,
            })
            .map_err(|e| NomadError::internal(format!("failed to render plan: {e}")))?;

        Ok(TripPlan {
            plan,
            estimated_cost: Some(estimate_cost(destinations, total_days)),
            source: PlanSource::Fallback,
        })
    }
}

fn check_destinations(destinations: &[Destination]) -> Result<()> {
    if destinations.is_empty() {
        return Err(NomadError::validation("pick at least one destination"));
    }
    if destinations.len() as i64 > MAX_TRIP_DAYS {
        return Err(NomadError::validation(format!(
            "a trip covers at most {MAX_TRIP_DAYS} destinations"
        )));
    }
    Ok(())
}

const DEFAULT_ACTIVITIES: [&str; 3] = [
    "explore the old town",
    "try the local food",
    "meet other nomads",
];

/// Splits the trip evenly across places, cycling through the activities.
/// Expects at least one place and `total_days >= places.len()`.
fn build_days<'a>(places: &'a [String], activities: &'a [String], total_days: i64) -> Vec<PlanDay<'a>> {
    let per_place = (total_days / places.len() as i64).max(1);
    (0..total_days)
        .map(|day| {
            let place_index = ((day / per_place) as usize).min(places.len() - 1);
            let activity = if activities.is_empty() {
                DEFAULT_ACTIVITIES[day as usize % DEFAULT_ACTIVITIES.len()]
            } else {
                activities[day as usize % activities.len()].as_str()
            };
            PlanDay {
                number: day + 1,
                place: &places[place_index],
                activity,
            }
        })
        .collect()
}

/// Rough USD estimate from each destination's cost of living.
fn estimate_cost(destinations: &[Destination], days: i64) -> String {
    let daily: i64 = destinations
        .iter()
        .map(|d| match d.cost_of_living {
            CostOfLiving::Low => 50,
            CostOfLiving::Medium => 100,
            CostOfLiving::High => 180,
        })
        .sum::<i64>()
        / destinations.len() as i64;
    format!("~${} USD", daily * days)
}
