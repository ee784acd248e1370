//! Command handlers, one module per subcommand.

pub mod catalog;
pub mod completion;
pub mod drill;
pub mod goal;
pub mod init;
pub mod levels;
pub mod profile;
pub mod stats;
pub mod version;
pub mod weekly;
