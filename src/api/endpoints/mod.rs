//! API endpoint handlers.

pub mod conditions;
pub mod examples;
pub mod health;
pub mod query;
