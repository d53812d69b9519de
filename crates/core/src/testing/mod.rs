//! Test doubles shared by unit and integration tests.

mod mock_carrier;

pub use mock_carrier::MockCarrierClient;
