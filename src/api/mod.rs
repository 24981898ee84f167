//! The backend collaborator layer.
//!
//! [`Backend`] is the narrow interface through which the services read and
//! write sheets. The remote implementation talks to the hosted service's
//! REST API; the in-memory implementation lets the whole app run
//! top-to-bottom without the remote service.

mod rest;
mod test_backend;

use crate::model::{Column, Row, Sheet, SheetType};
use crate::{Config, Result};

pub(crate) use test_backend::TestBackend;

/// Environment variable that switches the app into test mode.
pub const IN_TEST_MODE: &str = "CARTEIRA_IN_TEST_MODE";

/// The persistence interface the services depend on. All writes are
/// arbitrated by the backend; the core keeps no state between calls.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Full snapshot of the authenticated user's sheets, rows included.
    async fn fetch_all_sheets(&self) -> Result<Vec<Sheet>>;

    /// A single sheet, or `None` when no sheet has `id`.
    async fn fetch_sheet_by_id(&self, id: &str) -> Result<Option<Sheet>>;

    async fn rename_sheet(&self, id: &str, name: &str) -> Result<()>;

    async fn delete_sheet(&self, id: &str) -> Result<()>;

    /// Creates an empty sheet with the given column schema and returns its id.
    async fn create_sheet(&self, name: &str, kind: SheetType, columns: &[Column])
        -> Result<String>;

    /// Appends `rows` to the sheet `sheet_id`.
    async fn insert_rows(&self, sheet_id: &str, rows: &[Row]) -> Result<()>;
}

/// Selects which [`Backend`] implementation the app runs against.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Remote,
    Test,
}

impl Mode {
    /// Reads the mode from the environment: test mode when
    /// `CARTEIRA_IN_TEST_MODE` is set and non-zero in length, remote
    /// otherwise.
    pub fn from_env() -> Self {
        match std::env::var(IN_TEST_MODE) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Remote,
        }
    }
}

/// Creates the [`Backend`] for `mode`.
pub fn backend(config: &Config, mode: Mode) -> Result<Box<dyn Backend>> {
    Ok(match mode {
        Mode::Remote => Box::new(rest::RestBackend::new(config.clone())?),
        Mode::Test => Box::new(TestBackend::default()),
    })
}
