// src/logging.rs

use std::fs::File;

use log::LevelFilter;
use simplelog::{Config, WriteLogger};

/// Routes the `log` facade into a file next to the binary. When the file
/// cannot be created the engine simply runs without a log, never panics.
pub fn init_logging() {
    if let Ok(file) = File::create("sablefish.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), file);
        log::info!("logger initialized");
    }
}
