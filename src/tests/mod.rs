mod common;
mod config_validation;
mod diagnostics;
mod env_file_persistence;
