pub mod token;

pub use token::{Claims, TokenError, TokenIssuer, TokenKind, peek_access_claims};
