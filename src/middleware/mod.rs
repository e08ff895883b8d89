pub mod gate;
pub mod response;

pub use gate::{access_gate, CurrentIdentity};
pub use response::{ApiResponse, ApiResult};
