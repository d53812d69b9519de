//! Aggregation of per-batch results into a single deliverable.
//!
//! One successful batch with nothing else to report ships as a bare PDF.
//! Anything more gets packed into a zip archive so the tenant receives one
//! artifact regardless of how many batches ran.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to build label archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// A batch that made it through submit, poll and download.
#[derive(Debug, Clone)]
pub struct CompletedBatch {
    /// Zero-based position among the request's batches.
    pub index: usize,
    pub tracking_numbers: Vec<String>,
    pub content: Vec<u8>,
}

/// A batch that failed at some workflow stage.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Short human-readable batch descriptor.
    pub batch: String,
    pub error: String,
}

impl BatchFailure {
    pub fn new(tracking_numbers: &[String], error: impl ToString) -> Self {
        Self {
            batch: describe_batch(tracking_numbers),
            error: error.to_string(),
        }
    }
}

fn describe_batch(tracking_numbers: &[String]) -> String {
    match tracking_numbers {
        [] => "empty batch".to_string(),
        [only] => only.clone(),
        [first, ..] => format!("{}... ({} items)", first, tracking_numbers.len()),
    }
}

/// One document ready to hand to the tenant.
#[derive(Debug, Clone)]
pub struct LabelDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Final outcome of a label request.
#[derive(Debug)]
pub enum LabelOutput {
    /// Exactly one batch succeeded and nothing failed; the PDF ships as-is.
    Single(LabelDocument),
    /// Multiple successes, or successes alongside failures; the PDFs are
    /// packed into a zip and the failures reported out-of-band.
    Archive {
        document: LabelDocument,
        failures: Vec<BatchFailure>,
    },
    /// Nothing succeeded.
    Failed { failures: Vec<BatchFailure> },
}

/// Fold per-batch outcomes into one deliverable.
///
/// `now` stamps generated filenames; callers pass `Utc::now()`, tests pass a
/// fixed instant.
pub fn aggregate(
    successes: Vec<CompletedBatch>,
    failures: Vec<BatchFailure>,
    now: DateTime<Utc>,
) -> Result<LabelOutput, AggregateError> {
    if successes.is_empty() {
        if failures.is_empty() {
            // Upstream guarantees at least one batch ran; reaching this arm
            // means that guarantee broke somewhere.
            error!("Aggregation invoked with no batch outcomes at all");
            return Ok(LabelOutput::Failed {
                failures: vec![BatchFailure {
                    batch: "none".to_string(),
                    error: "no batches were processed".to_string(),
                }],
            });
        }
        return Ok(LabelOutput::Failed { failures });
    }

    if successes.len() == 1 && failures.is_empty() {
        let batch = successes.into_iter().next().unwrap();
        return Ok(LabelOutput::Single(LabelDocument {
            filename: batch_filename(&batch, now),
            content: batch.content,
        }));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for batch in &successes {
        writer.start_file(batch_filename(batch, now), options)?;
        writer.write_all(&batch.content)?;
    }
    let content = writer.finish()?.into_inner();

    Ok(LabelOutput::Archive {
        document: LabelDocument {
            filename: format!("labels_archive_{}.zip", now.format("%Y%m%d_%H%M%S")),
            content,
        },
        failures,
    })
}

fn batch_filename(batch: &CompletedBatch, now: DateTime<Utc>) -> String {
    match batch.tracking_numbers.as_slice() {
        [only] => format!("label_{}.pdf", only.replace('/', "-")),
        items => format!(
            "labels_batch_{}_{}items_{}.pdf",
            batch.index + 1,
            items.len(),
            now.format("%Y%m%d_%H%M%S")
        ),
    }
}
