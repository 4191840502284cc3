//! Travel domain module.
//!
//! # Module Structure
//!
//! - `destination`: destination value objects returned by search
//! - `preferences`: trip planning form values
//! - `api`: remote search/itinerary contract (`TravelApi`)

mod api;
mod destination;
mod preferences;

pub use api::{PlanReply, SearchReply, TravelApi};
pub use destination::{CostOfLiving, Destination, DestinationTips};
pub use preferences::{MAX_TRIP_DAYS, TripPreferences};
