//! Emulator Gateway - JSON HTTP façade over a local cloud-emulation backend
//!
//! This library provides the routes, backends and configuration for the gateway server.

pub mod api;
pub mod config;
pub mod keys;
pub mod metrics;
pub mod storage;
pub mod types;
