//! Infrastructure layer - Key handling, storage, billing provider and observability

pub mod access;
pub mod account;
pub mod api_key;
pub mod billing;
pub mod logging;
pub mod observability;
pub mod services;
