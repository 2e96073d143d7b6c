//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Admin catalog management commands
pub mod manage;

/// Product search and selling commands
pub mod product;

/// Admin sales and inventory reports
pub mod report;

/// Login and session commands
pub mod session;

// Export commands
pub use general::*;
pub use manage::*;
pub use product::*;
pub use report::*;
pub use session::*;
