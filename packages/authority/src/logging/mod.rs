//! Ambient logging. A `Logger` trait with level methods taking pre-formatted strings —
//! no global logger singleton; every long-lived component holds an `Arc<dyn Logger>`.

mod console_logger;
mod logger;

pub use console_logger::ConsoleLogger;
pub use logger::{LogLevel, Logger, NullLogger};
