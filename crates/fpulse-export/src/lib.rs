//! Exporters over analytics snapshots.
//!
//! Each exporter consumes a `&[DetectionRecord]` snapshot (or a windowed
//! class-totals map for the chart) produced by the analytics store, so no
//! store lock is ever held while serializing or rendering.
//!
//! - [`tabular::to_csv`] / [`tabular::save_csv`]: fixed-column CSV and the
//!   autosave writer
//! - [`structured::to_json`]: pretty-printed JSON array
//! - [`chart::render_chart_png`]: bar + pie distribution chart
//! - [`report::render_report_pdf`]: one-page PDF line chart

pub mod chart;
pub mod error;
pub mod report;
pub mod structured;
pub mod tabular;

pub use chart::render_chart_png;
pub use error::{ExportError, ExportResult};
pub use report::render_report_pdf;
pub use structured::to_json;
pub use tabular::{save_csv, to_csv};
