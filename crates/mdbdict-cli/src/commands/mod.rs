//! Command implementations

pub mod build;
pub mod delete;
pub mod dump;
pub mod info;
pub mod put;
pub mod query;
