pub mod classes;
pub mod common;
pub mod parents;
pub mod sms;
pub mod students;

pub use common::{ApiResponse, AppStartTime, ErrorCode, PaginationInfo};
