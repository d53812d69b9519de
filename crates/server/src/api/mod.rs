pub mod accounts;
pub mod handlers;
pub mod labels;
pub mod orders;
pub mod routes;
pub mod tenant;

pub use routes::create_router;
