//! POS Shared Library
//!
//! Domain models, request/response types and input validation shared by the
//! backend and its clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Merchant, NewMerchant, NewUser, PaginationCursor, User};
pub use types::*;
