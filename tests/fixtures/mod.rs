//! Test fixtures for walk-planner.
//!
//! Provides:
//! - Sample Palm Springs locations
//! - Directions providers that count calls or return scripted legs

#![allow(dead_code)]

pub mod palm_springs;
pub mod providers;

pub use palm_springs::*;
pub use providers::*;
