//! Blend Configuration Module
//!
//! Solver, projection, analysis, and server settings loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `COAL_BLEND_CONFIG` environment variable (path to TOML file)
//! 2. `blend_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! There is no process-global config. Load once at startup and pass the
//! value (or the relevant sub-struct) into each call:
//!
//! ```ignore
//! let config = BlendConfig::load();
//! let solution = blend::optimize(&sources, &target, &config.solver);
//! ```

mod blend_config;
pub mod validation;

pub use blend_config::*;
