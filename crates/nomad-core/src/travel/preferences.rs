//! Trip planning form values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Longest trip a plan covers.
pub const MAX_TRIP_DAYS: i64 = 365;

/// Values from the trip planning form, forwarded to the itinerary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub budget: String,
    pub travel_style: String,
    pub stay_type: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub work_remotely: bool,
    #[serde(default)]
    pub notes: String,
}

impl Default for TripPreferences {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            budget: "medium".to_string(),
            travel_style: "balanced".to_string(),
            stay_type: "apartment".to_string(),
            activities: Vec::new(),
            work_remotely: true,
            notes: String::new(),
        }
    }
}

impl TripPreferences {
    /// Inclusive trip length in days, if both dates are set and ordered.
    /// Capped at [`MAX_TRIP_DAYS`].
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => {
                Some(((end - start).num_days() + 1).min(MAX_TRIP_DAYS))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_days_is_inclusive() {
        let prefs = TripPreferences {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 7),
            ..TripPreferences::default()
        };
        assert_eq!(prefs.duration_days(), Some(7));
    }

    #[test]
    fn test_duration_days_rejects_reversed_range() {
        let prefs = TripPreferences {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 7),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..TripPreferences::default()
        };
        assert_eq!(prefs.duration_days(), None);
        assert_eq!(TripPreferences::default().duration_days(), None);
    }

    #[test]
    fn test_duration_days_capped() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let within = TripPreferences {
            start_date: Some(start),
            end_date: start.checked_add_days(chrono::Days::new(364)),
            ..TripPreferences::default()
        };
        assert_eq!(within.duration_days(), Some(MAX_TRIP_DAYS));

        let far = TripPreferences {
            start_date: Some(start),
            end_date: NaiveDate::from_ymd_opt(7500, 1, 1),
            ..TripPreferences::default()
        };
        assert_eq!(far.duration_days(), Some(MAX_TRIP_DAYS));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(TripPreferences::default()).unwrap();
        assert_eq!(json["travelStyle"], "balanced");
        assert_eq!(json["workRemotely"], true);
        assert!(json.get("startDate").is_none());
    }
}
