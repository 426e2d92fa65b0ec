mod catalog_handler;
mod error;
mod frontend;
mod gate;
mod handler;
mod response;
mod router;

pub use error::{ApiError, ApiErrorCode, recover_error};
pub use frontend::{Frontend, STATE_COOKIE};
pub use gate::{parse_bearer, with_identity};
pub use response::ApiResponse;
pub use router::routes;
