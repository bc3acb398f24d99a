//! Chat persistence abstractions and conversation orchestration.

pub mod directory;
pub mod history;
pub mod repository;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
