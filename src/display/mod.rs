//! Display formatting for terminal output

pub mod receipt;

pub use receipt::format_receipt;
