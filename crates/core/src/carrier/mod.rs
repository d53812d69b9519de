//! Shipping carrier integration.
//!
//! The carrier's print pipeline is asynchronous: a submission is accepted
//! with a job id, the job rasterizes in the background, and the rendered
//! document is downloaded once the job reports READY.

mod client;
mod error;
mod http;
mod token_cache;
mod types;

pub use client::CarrierClient;
pub use error::CarrierError;
pub use http::{HttpCarrierClient, PrintOptions};
pub use token_cache::TokenCache;
pub use types::{
    parse_submit_error, FlaggedItem, PrintJobStatus, SubmitAccepted, SubmitErrorDetails,
    TokenGrant,
};
