pub mod sanitize;
pub mod tokens;

use std::io::Read;
use std::path::Path;

use crate::config::Options;
use crate::error::{GatewayError, Result};
use crate::sanitize::Sanitizer;

/// Contents of `input`, or all of stdin when no file is given.
pub(crate) fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

pub(crate) fn load_sanitizer(config: &Path) -> Result<Sanitizer> {
    let options = Options::load_from(config)?;
    tracing::debug!(config = %config.display(), "loaded options");
    Sanitizer::new(options)
}

/// Accepts absolute URLs and paths starting with `/`.
pub(crate) fn check_url(url: &str) -> Result<()> {
    if url.starts_with('/') || url::Url::parse(url).is_ok() {
        return Ok(());
    }
    Err(GatewayError::InvalidUrl {
        url: url.to_string(),
        reason: "expected an absolute url or a path starting with /".into(),
    })
}
