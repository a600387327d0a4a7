//! Shared primitive types used across the engine.

/// Opaque campaign identifier, always carried as a string.
pub type CampaignId = String;

/// The canonical run identifier.
pub type RunId = String;

/// Categorical fallback used for missing `age` / `gender` values.
pub const UNKNOWN: &str = "Unknown";

/// Assumed revenue per approved conversion when no config overrides it.
pub const DEFAULT_CONVERSION_VALUE: f64 = 100.0;
