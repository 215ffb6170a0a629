// Markdown resume storage, one document per user.

pub mod handlers;
pub mod store;
