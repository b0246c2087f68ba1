//! walk-planner core
//!
//! Partitions points of interest into closed walking loops, each kept under a
//! per-loop distance budget.

pub mod cache;
pub mod error;
pub mod haversine;
pub mod loop_builder;
pub mod osrm;
pub mod osrm_data;
pub mod polyline;
pub mod resolver;
pub mod solver;
pub mod store;
pub mod traits;
