//! Credential hashing.

pub mod hash;
