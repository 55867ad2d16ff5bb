// HTTP routes
pub mod health;
pub mod search;
pub mod stream;

pub use health::*;
pub use search::*;
pub use stream::*;
