use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with console output and, when a log
/// directory is configured, a daily-rotated file.
pub fn init_logging(log_dir: Option<&Path>) {
    let filter = EnvFilter::from_default_env()
        .add_directive("medallion_warehouse=info".parse().unwrap());

    let console_layer = fmt::layer().with_writer(std::io::stdout);

    match log_dir {
        Some(dir) => {
            let _ = std::fs::create_dir_all(dir);
            let file_appender = tracing_appender::rolling::daily(dir, "warehouse.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking_writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .init();

            // Keep the guard alive so logs are flushed on exit
            std::mem::forget(guard);
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .init();
        }
    }
}
