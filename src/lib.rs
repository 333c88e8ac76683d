pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod collector;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod github;
pub mod logging;
pub mod patcher;
pub mod ui;
pub mod version;

pub use error::{ReleaseError, Result};
