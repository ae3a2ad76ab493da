//! Session token issuance, verification and identity extraction.

pub mod claims;
pub mod jwt;

pub use claims::{Identity, resolve, resolve_loose, resolve_strict};
pub use jwt::{StaffClaims, TokenCodec, TokenError};
