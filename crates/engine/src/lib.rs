//! `recmatch-engine`: record matching and merging over in-memory collections.
//!
//! Pure engine crate: receives pre-loaded records, returns new collections.
//! No CLI or IO dependencies.

pub mod combine;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod load;
pub mod matcher;
pub mod model;
pub mod reshape;

pub use config::PlanConfig;
pub use engine::{run, PlanInput, PlanResult};
pub use error::MatchError;
pub use model::{Collection, LogicalOperator, MatchRule, MergeField, Record, Value};
