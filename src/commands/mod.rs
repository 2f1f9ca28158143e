//! CLI command implementations

pub mod clean;
pub mod edit;
pub mod generate;
pub mod init;
pub mod list;
pub mod new;
