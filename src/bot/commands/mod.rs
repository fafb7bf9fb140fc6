//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Budget commands
pub mod budget;

/// Expense ledger commands
pub mod expense;

/// General utility commands
pub mod general;

/// Insight commands
pub mod insight;

/// Premium upgrade and review commands
pub mod premium;

// Export commands
pub use budget::*;
pub use expense::*;
pub use general::*;
pub use insight::*;
pub use premium::*;
