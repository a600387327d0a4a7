//! campaign-roi-core: feature and aggregation engine for marketing
//! campaign performance data.

pub mod aggregate;
pub mod config;
pub mod dimension;
pub mod engine;
pub mod error;
pub mod kpi;
pub mod normalize;
pub mod record;
pub mod result_set;
pub mod rng;
pub mod store;
pub mod synthetic;
pub mod tier;
pub mod types;
