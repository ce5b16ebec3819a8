use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::storage::{CsvFileHandler, FileHandler};

use super::{check_url, load_sanitizer, read_input};

/// Sanitize one JSON response as if it had been fetched from `url`.
pub fn run(config: &Path, url: &str, input: Option<&Path>) -> Result<()> {
    check_url(url)?;
    let sanitizer = load_sanitizer(config)?;
    let json = read_input(input)?;

    let sanitized = sanitizer.sanitize(url, &json)?;
    println!("{sanitized}");
    Ok(())
}

/// Sanitize a CSV export, writing the result to stdout.
pub fn run_csv(config: &Path, input: Option<&Path>) -> Result<()> {
    let sanitizer = load_sanitizer(config)?;
    let handler = CsvFileHandler::new();

    let output = match input {
        Some(path) => handler.handle(&mut File::open(path)?, &sanitizer)?,
        None => handler.handle(&mut std::io::stdin().lock(), &sanitizer)?,
    };
    std::io::stdout().write_all(&output)?;
    Ok(())
}

/// Report whether the rules let the proxy fetch `url`. Exits 1 when blocked.
pub fn run_allowed(config: &Path, url: &str) -> Result<()> {
    check_url(url)?;
    let sanitizer = load_sanitizer(config)?;

    if sanitizer.is_allowed(url) {
        println!("allowed");
        Ok(())
    } else {
        println!("blocked");
        eprintln!("pseudonym-gateway: {url} is not allowed by the configured rules");
        std::process::exit(1);
    }
}

/// Print the fingerprint of the active rule set.
pub fn run_rules_sha(config: &Path) -> Result<()> {
    let sanitizer = load_sanitizer(config)?;
    println!("{}", sanitizer.rules_sha());
    Ok(())
}
