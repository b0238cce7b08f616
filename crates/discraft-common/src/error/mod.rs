//! Error types

mod app_error;

pub use app_error::{AppError, AppResult, BoxError, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};
