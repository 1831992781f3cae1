//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, IssuedToken, JwtService, TokenError, SIGNING_ALGORITHM};
pub use middleware::{authorize, AuthUser};
pub use password::{PasswordError, PasswordService};
