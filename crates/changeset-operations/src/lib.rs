mod error;
pub mod assemble;
pub mod operations;
pub mod providers;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub mod mocks;

pub use error::{InternalError, OperationError, Result};
