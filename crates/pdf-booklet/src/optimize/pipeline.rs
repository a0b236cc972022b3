//! Size-driven optimization pipeline
//!
//! Stages run in order. Before each stage its predicate is evaluated against
//! the size measured after the previous stage, so a stage that shrinks the
//! file can switch off the ones after it. A failing stage is recorded and
//! skipped; the bytes from the last successful stage carry on.

use crate::types::{Result, SizeStatus};

/// Sizes a stage predicate decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeCheck {
    pub original_size: u64,
    pub current_size: u64,
}

impl SizeCheck {
    /// Current size divided by the original size
    pub fn ratio(&self) -> f64 {
        self.current_size as f64 / self.original_size.max(1) as f64
    }

    /// Whether the current size is strictly more than `factor` times the original
    pub fn exceeds(&self, factor: f64) -> bool {
        self.ratio() > factor
    }
}

/// Bytes produced by a stage, plus anything worth reporting about the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub bytes: Vec<u8>,
    pub notes: Vec<String>,
}

impl StageOutput {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// One optimization pass over a serialized PDF
pub trait Stage {
    fn name(&self) -> &'static str;

    fn run(&self, pdf: &[u8]) -> Result<StageOutput>;
}

/// A stage that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: String,
    pub size_before: u64,
    pub size_after: u64,
    pub notes: Vec<String>,
}

/// A stage that failed; its output was discarded
#[derive(Debug, Clone, PartialEq)]
pub struct DegradedStage {
    pub stage: String,
    pub reason: String,
}

/// Outcome of the whole optimization run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationReport {
    pub original_size: u64,
    pub final_size: u64,
    pub ratio: f64,
    pub status: SizeStatus,
    pub stages: Vec<StageRecord>,
    pub degraded: Vec<DegradedStage>,
}

impl OptimizationReport {
    /// Whether a stage ran to completion
    pub fn ran(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s.stage == stage)
    }

    /// Whether any best-effort stage failed
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// The final document bytes and how they were obtained
#[derive(Debug, Clone)]
pub struct OptimizedDocument {
    pub bytes: Vec<u8>,
    pub report: OptimizationReport,
}

type Predicate = Box<dyn Fn(&SizeCheck) -> bool>;

/// Ordered list of `(predicate, stage)` entries
#[derive(Default)]
pub struct OptimizationPipeline {
    entries: Vec<(Predicate, Box<dyn Stage>)>,
}

impl OptimizationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage that runs whenever `when` holds for the current sizes
    pub fn stage(
        mut self,
        when: impl Fn(&SizeCheck) -> bool + 'static,
        stage: impl Stage + 'static,
    ) -> Self {
        self.entries.push((Box::new(when), Box::new(stage)));
        self
    }

    /// Stage names, in run order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(_, stage)| stage.name()).collect()
    }

    /// Run every applicable stage over `pdf`.
    ///
    /// `history` holds records of work already done on `pdf` (such as the
    /// initial structural save) and is carried into the report.
    pub fn run(
        &self,
        pdf: Vec<u8>,
        original_size: u64,
        history: Vec<StageRecord>,
    ) -> OptimizedDocument {
        let mut current = pdf;
        let mut stages = history;
        let mut degraded = Vec::new();

        for (when, stage) in &self.entries {
            let check = SizeCheck {
                original_size,
                current_size: current.len() as u64,
            };
            if !when(&check) {
                log::debug!(
                    "Skipping {} at {:.2}x the original size",
                    stage.name(),
                    check.ratio()
                );
                continue;
            }

            match stage.run(&current) {
                Ok(output) => {
                    log::info!(
                        "{}: {} -> {} bytes",
                        stage.name(),
                        check.current_size,
                        output.bytes.len()
                    );
                    stages.push(StageRecord {
                        stage: stage.name().to_string(),
                        size_before: check.current_size,
                        size_after: output.bytes.len() as u64,
                        notes: output.notes,
                    });
                    current = output.bytes;
                }
                Err(e) => {
                    log::warn!("{} failed, keeping previous output: {}", stage.name(), e);
                    degraded.push(DegradedStage {
                        stage: stage.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let final_check = SizeCheck {
            original_size,
            current_size: current.len() as u64,
        };
        let ratio = final_check.ratio();

        OptimizedDocument {
            report: OptimizationReport {
                original_size,
                final_size: final_check.current_size,
                ratio,
                status: SizeStatus::from_ratio(ratio),
                stages,
                degraded,
            },
            bytes: current,
        }
    }
}
