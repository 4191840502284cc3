//! Destination domain model.
//!
//! A `Destination` is one candidate travel location returned by the search
//! backend. Values are immutable once received: favorites and sessions keep
//! clones, never edit them in place.

use serde::{Deserialize, Serialize};

/// Categorical cost of living at a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostOfLiving {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium", alias = "moderate", alias = "Moderate")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl CostOfLiving {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for CostOfLiving {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Curated tips attached to a destination card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTips {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_fact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sim_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insider_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
}

impl DestinationTips {
    pub fn is_empty(&self) -> bool {
        self.fun_fact.is_none()
            && self.sim_tip.is_none()
            && self.visa_tip.is_none()
            && self.insider_tip.is_none()
            && self.weather_note.is_none()
    }
}

/// A structured recommendation record describing one travel location.
///
/// The wire format is the search backend's camelCase JSON. `id` is unique
/// within one response batch and is the key used by the favorite set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub cost_of_living: CostOfLiving,
    #[serde(default)]
    pub internet_speed: String,
    #[serde(default)]
    pub visa: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub safety_rating: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rent: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub coworking_spaces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<DestinationTips>,
}

impl Destination {
    /// Creates a destination with the required fields and no optional details.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
        cost_of_living: CostOfLiving,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: country.into(),
            image: String::new(),
            description: String::new(),
            cost_of_living,
            internet_speed: String::new(),
            visa: String::new(),
            climate: None,
            best_time: None,
            community: None,
            safety_rating: None,
            rent: None,
            coworking_spaces: None,
            tips: None,
        }
    }

    /// "Name, Country" label used by cards and plan prompts.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Deserializers that accept the loosely typed values the search backend emits.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    impl StringOrNumber {
        fn into_string(self) -> String {
            match self {
                Self::String(s) => s,
                Self::Unsigned(n) => n.to_string(),
                Self::Signed(n) => n.to_string(),
                Self::Float(n) => n.to_string(),
            }
        }
    }

    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
    }

    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
    }

    pub fn opt_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNumber>::deserialize(deserializer)? {
            None => Ok(None),
            Some(StringOrNumber::Unsigned(n)) => u32::try_from(n).map(Some).map_err(D::Error::custom),
            Some(StringOrNumber::String(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNumber::String(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
            Some(other) => Err(D::Error::custom(format!(
                "invalid coworking count: {}",
                other.into_string()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_city() {
        let value = json!({
            "id": 1,
            "name": "Chiang Mai",
            "country": "Thailand",
            "image": "https://img.example/cm.jpg",
            "description": "Mountain city with a large nomad scene",
            "costOfLiving": "Low",
            "internetSpeed": "50 Mbps",
            "visa": "Visa exemption for 60 days",
            "safetyRating": 4.5,
            "rent": "$400/month",
            "coworkingSpaces": "25",
            "tips": { "funFact": "Over 300 temples", "simTip": "AIS or True" }
        });

        let destination: Destination = serde_json::from_value(value).unwrap();
        assert_eq!(destination.id, "1");
        assert_eq!(destination.cost_of_living, CostOfLiving::Low);
        assert_eq!(destination.safety_rating.as_deref(), Some("4.5"));
        assert_eq!(destination.coworking_spaces, Some(25));
        let tips = destination.tips.unwrap();
        assert_eq!(tips.fun_fact.as_deref(), Some("Over 300 temples"));
        assert!(tips.weather_note.is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let value = json!({
            "id": "lis",
            "name": "Lisbon",
            "country": "Portugal",
            "costOfLiving": "medium"
        });

        let destination: Destination = serde_json::from_value(value).unwrap();
        assert_eq!(destination.label(), "Lisbon, Portugal");
        assert!(destination.image.is_empty());
        assert!(destination.tips.is_none());
        assert!(destination.coworking_spaces.is_none());
    }

    #[test]
    fn test_unknown_cost_of_living_is_rejected() {
        let value = json!({
            "id": "x",
            "name": "X",
            "country": "Y",
            "costOfLiving": "astronomical"
        });
        assert!(serde_json::from_value::<Destination>(value).is_err());
    }

    #[test]
    fn test_serialize_skips_absent_optionals() {
        let destination = Destination::new("bali", "Canggu", "Indonesia", CostOfLiving::Medium);
        let json = serde_json::to_string(&destination).unwrap();
        assert!(json.contains("\"costOfLiving\":\"medium\""));
        assert!(!json.contains("climate"));
        assert!(!json.contains("tips"));
    }
}
