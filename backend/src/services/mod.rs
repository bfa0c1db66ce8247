pub mod fleet_source;
pub mod normalization;
pub mod registry;
