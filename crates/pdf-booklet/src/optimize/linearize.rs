//! Linearization through the external `qpdf` tool

use crate::types::{BookletError, Result};
use std::io::Write;
use std::process::Command;

/// Linearize `pdf` and consolidate objects into object streams.
///
/// qpdf must be on `PATH`. Exit code 3 means qpdf succeeded with warnings.
pub fn linearize_bytes(pdf: &[u8]) -> Result<Vec<u8>> {
    let mut input = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    input.write_all(pdf)?;
    input.flush()?;
    let output = tempfile::Builder::new().suffix(".pdf").tempfile()?;

    let result = Command::new("qpdf")
        .arg("--linearize")
        .arg("--object-streams=generate")
        .arg(input.path())
        .arg(output.path())
        .output()
        .map_err(|e| BookletError::Linearize(format!("failed to execute qpdf: {e}")))?;

    match result.status.code() {
        Some(0) | Some(3) => Ok(std::fs::read(output.path())?),
        code => {
            let stderr = String::from_utf8_lossy(&result.stderr);
            Err(BookletError::Linearize(format!(
                "qpdf failed (exit code {}): {}",
                code.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
                stderr.trim()
            )))
        }
    }
}
