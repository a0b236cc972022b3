//! End-to-end conversion: source PDF bytes in, optimized booklet bytes out

use crate::impose::{impose_document, load_pdf_bytes};
use crate::optimize::{DegradedStage, OptimizeConfig, StageRecord, optimize};
use crate::options::BookletOptions;
use crate::types::*;
use std::io::Write;
use std::path::Path;

/// What a conversion produced, alongside the bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionMetadata {
    pub original_page_count: usize,
    pub padded_page_count: usize,
    pub original_size_bytes: u64,
    pub final_size_bytes: u64,
    /// Final size divided by the source size
    pub size_ratio: f64,
    pub status: SizeStatus,
    /// Stages that completed, in order
    pub stages: Vec<StageRecord>,
    /// Best-effort stages that failed and were skipped
    pub degraded: Vec<DegradedStage>,
}

impl ConversionMetadata {
    pub fn blank_pages_added(&self) -> usize {
        self.padded_page_count - self.original_page_count
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub pdf: Vec<u8>,
    pub metadata: ConversionMetadata,
}

/// Convert a linear PDF into an imposed, optimized booklet
pub fn convert(source_bytes: &[u8], options: &BookletOptions) -> Result<Conversion> {
    options.validate()?;
    let config = OptimizeConfig::from_options(options)?;

    let source = load_pdf_bytes(source_bytes)?;
    let imposed = impose_document(&source, options)?;
    let original_size = source_bytes.len() as u64;

    let optimized = optimize(imposed.document, original_size, config)?;
    let report = optimized.report;

    Ok(Conversion {
        pdf: optimized.bytes,
        metadata: ConversionMetadata {
            original_page_count: imposed.plan.input_page_count,
            padded_page_count: imposed.plan.padded_page_count,
            original_size_bytes: original_size,
            final_size_bytes: report.final_size,
            size_ratio: report.ratio,
            status: report.status,
            stages: report.stages,
            degraded: report.degraded,
        },
    })
}

/// Convert `input` and write the booklet to `output`.
///
/// Nothing is written unless the conversion succeeds. The bytes go to a
/// temporary file next to `output`, which is then renamed over it, so an
/// interrupted write never leaves a partial booklet behind.
pub async fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &BookletOptions,
) -> Result<ConversionMetadata> {
    options.validate()?;

    let bytes = tokio::fs::read(input.as_ref()).await?;
    let options = options.clone();
    let Conversion { pdf, metadata } =
        tokio::task::spawn_blocking(move || convert(&bytes, &options)).await??;

    let target = output.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || write_atomically(&target, &pdf)).await??;
    log::info!(
        "Wrote {} ({} bytes, {:.2}x)",
        output.as_ref().display(),
        metadata.final_size_bytes,
        metadata.size_ratio
    );
    Ok(metadata)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| BookletError::Io(e.error))?;
    Ok(())
}
