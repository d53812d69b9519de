//! Batch splitting.

/// Split tracking numbers into carrier-sized batches, preserving order.
///
/// The carrier caps how many orders one print job may cover; the last batch
/// carries the remainder.
pub fn chunk(tracking_numbers: &[String], max_size: usize) -> Vec<Vec<String>> {
    assert!(max_size > 0, "batch size must be positive");
    tracking_numbers
        .chunks(max_size)
        .map(|c| c.to_vec())
        .collect()
}
