// Industry insights dashboard.
// One AI-generated record per industry, reused until it goes stale or comes back incomplete.

pub mod freshness;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod store;
