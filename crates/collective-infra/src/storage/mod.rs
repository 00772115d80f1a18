//! Storage adapters.

pub mod json_file;
