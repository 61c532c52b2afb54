//! HTTP boundary for catmatch.
//!
//! Routes:
//! - `POST /predict` - single (`"type": "single"`) or batch (`"type": "multiple"`) prediction
//! - `GET /health` - runs the predictor self-test
//! - `GET /metrics` - service status and request counters

pub mod rest;

pub use rest::{AppState, RestApi};
