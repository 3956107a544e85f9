//! Request handlers.

pub mod analytics;
pub mod detect;
pub mod export;
pub mod health;
pub mod live;

pub use analytics::*;
pub use detect::*;
pub use export::*;
pub use health::*;
pub use live::*;
