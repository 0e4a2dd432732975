// ABOUTME: Schema export utilities module
// ABOUTME: Wraps pg_dump for schema-only dumps of a descriptor's database

pub mod dump;

pub use dump::PG_DUMP;
