//! Chunk-container scene format reading

pub mod cursor;
pub mod parser;

pub use cursor::ByteCursor;
pub use parser::{EXPECTED_VERSION, MAGIC, load, load_file};
