//! # studio-auth
//!
//! Credential handling for the studio booking backend.
//!
//! ## Modules
//!
//! - `jwt`: HS256 access and refresh token creation and validation
//! - `password`: Argon2id password hashing and policy enforcement
//! - `reset`: one-time password-reset tokens

pub mod jwt;
pub mod password;
pub mod reset;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use reset::ResetToken;
