//! Small helpers shared across the explorer crates: path handling, artifact
//! naming and the explorer configuration file.

pub mod config;
pub mod path_processing;

pub use config::{CONFIG_PATH_ENV, ConfigError, ExplorerConfig, default_config_path};
pub use path_processing::{document_base_name, expand_tilde, is_yaml_file_name};
