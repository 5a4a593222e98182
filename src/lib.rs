//! Parse `.env` files line by line and load their assignments.
//!
//! [`EnvLoader::load`] writes into a process-isolated in-memory map by
//! default. [`load_reader`] applies a stream to any [`EnvSink`].
//!
//! Convenience loaders (`dotenv`, `from_path`, `from_paths`, `from_filename`)
//! mutate the process environment and are `unsafe`, because callers must
//! guarantee no concurrent process-environment access.

mod env;
mod error;
mod loader;
mod model;
mod parser;

pub use env::{EnvSink, TargetEnv};
pub use error::Error;
pub use loader::{EnvLoader, dotenv, from_filename, from_path, from_paths, load_reader};
pub use model::{Entry, LoadReport};
pub use parser::{Entries, Parser, entries, parse_bytes, parse_lines, parse_reader, parse_str};
