//! Diagnostics for shape construction.
//!
//! User errors are accumulated, never fail-fast: every diagnostic carries an
//! [`ErrorCode`] for searchability, a message, and a primary label at the
//! offending field. Rendering is left to the driver.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
