// Server kernel: request-scoped plumbing shared by routes
pub mod relay;

pub use relay::{StreamMessage, STATUS_MESSAGES};
