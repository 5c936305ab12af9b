//! CSV batch runner: one signup per row, strictly in file order.

mod parser;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};

use crate::signup::{SignupDefaults, SignupService};
use crate::transport::Transport;

pub use parser::BatchRow;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read batch file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid batch CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse every row up front so a malformed file fails before any signup.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<BatchRow>, BatchError> {
    Ok(parser::parse_records(reader)?)
}

pub fn parse_rows_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRow>, BatchError> {
    let file = std::fs::File::open(path)?;
    parse_rows(file)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub row: usize,
    pub email: String,
    pub error: String,
}

/// Outcome of a batch. Rows without email or password count only as `skipped`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub success: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<T> SignupService<T>
where
    T: Transport,
{
    /// Sign up each row in order. A failing row is logged and recorded, then
    /// the batch moves on.
    pub async fn run_batch(&self, rows: Vec<BatchRow>, defaults: &SignupDefaults) -> BatchSummary {
        let started_at = Utc::now();
        let mut processed = 0;
        let mut success = 0;
        let mut skipped = 0;
        let mut failures = Vec::new();

        for BatchRow { row, fields } in rows {
            if !fields.has_credentials() {
                warn!(row, "skipping row without email or password");
                skipped += 1;
                continue;
            }

            processed += 1;
            let email = fields.email().unwrap_or_default().to_string();
            match self.signup_with(&fields, defaults).await {
                Ok(()) => success += 1,
                Err(err) => {
                    error!(row, %email, error = %err, "batch signup failed");
                    failures.push(BatchFailure {
                        row,
                        email,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(success, processed, skipped, "Batch complete. Success: {success} / {processed}");

        BatchSummary {
            processed,
            success,
            skipped,
            failures,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
