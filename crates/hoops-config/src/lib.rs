//! Configuration management for the hoops practice tracker.
//!
//! This crate handles loading and saving `.hoops/config.yaml` files,
//! discovering `.hoops/` directories in the filesystem, and providing
//! typed access to configuration values.

pub mod config;
pub mod hoops_dir;

pub use config::{ConfigError, HoopsConfig, load_config, load_from_file, save_config};
pub use hoops_dir::{HOOPS_DIR_NAME, ensure_hoops_dir, find_hoops_dir, find_hoops_dir_or_error};
