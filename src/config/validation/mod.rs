//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `config_validators`: validators for every configuration section
//! - `tests`: test suite for all validators

mod config_validators;
mod trait_def;

pub use trait_def::Validate;
