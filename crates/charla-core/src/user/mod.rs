//! User account persistence abstractions.

pub mod repository;
