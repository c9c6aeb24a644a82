//! Builds a project's expenses into a mother/child/grandchild tree keyed by nature code, then
//! filters it by month, searches, sorts, paginates and exports it.

mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod model;
pub mod tree;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
