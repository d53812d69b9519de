//! Label acquisition workflow: batch splitting, the per-batch state machine
//! and result aggregation.

mod aggregate;
mod batch;
mod chunk;

pub use aggregate::{
    aggregate, AggregateError, BatchFailure, CompletedBatch, LabelDocument, LabelOutput,
};
pub use batch::{run_batch, WorkflowError};
pub use chunk::chunk;
