//! The services layer: list queries, analytics composition and sheet
//! mutations over the backend collaborator.

pub mod aggregate;
mod analytics;
mod sheets;

pub use analytics::compute_analytics;
pub use sheets::{delete, duplicate, fetch_sheet, list_sheets, rename, COPY_SUFFIX};
