pub mod password;
pub mod token;

pub use password::{PasswordError, PasswordHashing};
pub use token::{Claims, IssuedToken, TokenError, TokenService, VerifiedToken};
