// User sync and onboarding.

pub mod handlers;
pub mod onboarding;
pub mod store;
