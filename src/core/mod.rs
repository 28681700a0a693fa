//! Core functionality for the gateway

pub mod batch;
