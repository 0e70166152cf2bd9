//! Token primitives shared by portfolio services
//!
//! Only JWT issuance and validation live here; password hashing stays in the
//! service that owns the credentials table.

pub mod jwt;

#[cfg(any(test, feature = "test-keys"))]
pub mod test_keys;
