//! Output surfaces for dashboard data.

pub mod html;
pub mod text;

pub use html::render_html_report;
pub use text::render_summary;
