//! Bounded in-memory detection history and the read-side queries over it.
//!
//! [`AnalyticsStore`] keeps the most recent frame records in a fixed-size
//! ring buffer; the [`aggregate`] module turns snapshots of that history
//! into summaries, windowed class totals and frame-to-frame transitions.

pub mod aggregate;
pub mod store;

pub use aggregate::{summarize, transitions, windowed_class_totals};
pub use store::AnalyticsStore;
