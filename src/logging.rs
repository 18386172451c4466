//! Logging setup for the command-line tool

use tracing::Level;

/// Install a stderr fmt subscriber
///
/// `verbosity` counts `-v` flags: 0 shows warnings only, 1 adds info,
/// 2 or more adds debug output.
pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
