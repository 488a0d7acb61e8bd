//! Streaming configuration files, stored as RON.

pub mod config_io;

pub use config_io::{
    config_filename, load_streaming_config, save_streaming_config, streaming_config_path,
    ConfigIoError, STREAMING_DIR,
};
