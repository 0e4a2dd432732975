// ABOUTME: Library module for pg-dburi
// ABOUTME: Exports connection descriptors, schema dumps, and typed result reducers

pub mod error;
pub mod migration;
pub mod postgres;
pub mod query;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::{DbUriError, Result};
pub use postgres::DbUri;
