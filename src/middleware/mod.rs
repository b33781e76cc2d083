pub mod auth;
pub mod response;

pub use auth::{authenticate, require_auth, AuthUser};
pub use response::{ApiResponse, ApiResult};
