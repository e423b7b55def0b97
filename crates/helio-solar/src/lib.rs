//! Solar portal client for Helio
//!
//! Talks to a SEMS-style inverter portal: per-session login, station
//! listing across fork-divergent endpoints, and a collated plant snapshot
//! normalized from three independently-fetched sub-resources.

pub mod client;
pub mod error;
pub mod plants;
pub mod snapshot;
pub mod token;

pub use client::PortalClient;
pub use error::SolarError;
pub use plants::Plant;
pub use snapshot::{InverterInfo, PlantSnapshot};
pub use token::extract_token;
