//! Infrastructure layer - External service implementations

pub mod cache;
pub mod catalog;
pub mod history;
pub mod intent;
pub mod logging;
pub mod observability;
pub mod services;
