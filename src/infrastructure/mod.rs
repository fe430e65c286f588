//! Configuration providers backing the registry.

pub mod in_memory;
pub mod json_file;
pub mod table;
