//! FILENAME: app/demolens/src/main.rs
// Native-messaging host binary. Optional first argument: config file path.

use demolens_lib::{run, DemoLensConfig};
use std::path::PathBuf;

fn main() {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => DemoLensConfig::load(&path),
        None => Ok(DemoLensConfig::default()),
    };

    let result = config.and_then(run);
    if let Err(e) = result {
        eprintln!("[demolens-host] {} ({})", e, e.kind());
        std::process::exit(1);
    }
}
