//! Text-generation abstraction.

pub mod provider;
