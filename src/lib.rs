//! # Ambientr Library
//!
//! Internal library for the ambientr binary application.
//!
//! This library exists to enable testing of the control loop internals and
//! provide clean separation between CLI dispatch (main.rs) and application
//! logic.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Ambientr` struct provides the application API
//! - **Core Logic**: `core` module contains the control loop and the five
//!   controllers (sun tracking, light sampling, activity monitoring,
//!   brightness, color temperature)
//! - **Collaborators**: `sensor`, `actuator`, and `overrides` define the
//!   trait boundaries to the outside world plus thin subprocess adapters
//! - **Configuration**: `config` module for TOML-based settings
//! - **Infrastructure**: signal handling, logging, and CLI parsing

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod actuator;
pub mod args;
pub mod config;
pub mod constants;
pub mod core;
pub mod overrides;
pub mod sensor;
pub mod signals;

mod ambientr;

// Re-export for binary
pub use ambientr::Ambientr;
