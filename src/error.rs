//! Crate-wide error and result aliases. Service functions surface a single
//! user-presentable message per failed operation; the underlying cause is
//! logged where it occurs.

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
