//! Coordinate normalization and rectangle relationships for a map area
//! catalog, plus the HTTP layer serving them.

use std::sync::Arc;

pub mod catalog;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prometheus;
pub mod rect;
pub mod relation;
pub mod reproject;
pub mod state;
pub mod utils;
pub mod version;

pub use parser::{ParseError, parse_coordinate};
pub use rect::{Point, Rectangle, ValidationError};
pub use relation::{RelationMode, RelationOutcome, RelationParams, evaluate_rectangle_relationship};
pub use reproject::reproject_geographic;
pub use state::State;

// Read-only after startup; the counters inside are atomics.
pub type AppState = Arc<State>;
