//! mammyx-common — shared error taxonomy and HTTP plumbing.

pub mod error;
pub mod http;

pub use error::{MammyxError, Result};
