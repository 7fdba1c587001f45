mod error;
mod prompt;

pub use error::ServiceError;
pub use prompt::*;
