//! CLI command handlers
//!
//! This module contains the interactive menu that bridges terminal input
//! with the ledger.

pub mod menu;

pub use menu::{run_menu, MenuChoice};
