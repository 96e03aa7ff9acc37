pub mod docs;
pub mod dto;
pub mod error;
pub mod forms;
pub mod routes;

pub use error::{ApiError, AppJson, AppQuery};
pub use routes::{create_router, AppState};
