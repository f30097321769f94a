pub mod cli;
pub mod error;
pub mod executor;
pub mod handler;

pub use error::{PyletError, Result};
