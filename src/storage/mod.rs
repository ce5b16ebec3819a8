pub mod csv;

use std::io::Read;

use crate::error::Result;
use crate::sanitize::Sanitizer;

/// Sanitizes a whole file (bulk export) rather than a single API response.
pub trait FileHandler: Send + Sync {
    /// Read the file from `reader` and return its sanitized bytes.
    fn handle(&self, reader: &mut dyn Read, sanitizer: &Sanitizer) -> Result<Vec<u8>>;
}

pub use self::csv::CsvFileHandler;
