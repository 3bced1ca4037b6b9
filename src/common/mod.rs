//! Helpers shared by all resources: pagination and the response envelope.

pub mod paging;
pub mod response;

pub use paging::Paging;
pub use response::SuccessResponse;
