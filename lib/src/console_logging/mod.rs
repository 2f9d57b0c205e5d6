// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Console logging for programs that use the codecs directly. Filtering is controlled by the
//! `RUST_OPCUA_LOG` environment variable which takes the same syntax as `RUST_LOG`.

use std::{
    fmt,
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use env_logger::{
    fmt::{Color, Style},
    Builder,
};

/// The environment variable that filters log output
pub const LOG_ENV_VAR: &str = "RUST_OPCUA_LOG";

lazy_static! {
    static ref INITIALISED: AtomicBool = AtomicBool::new(false);
}

struct Pad<T> {
    value: T,
    width: usize,
}

impl<T: fmt::Display> fmt::Display for Pad<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{: <width$}", self.value, width = self.width)
    }
}

fn level_style(style: &mut Style, level: log::Level) {
    match level {
        log::Level::Error => {
            style.set_color(Color::White).set_bg(Color::Red);
        }
        log::Level::Warn => {
            style.set_color(Color::Yellow);
        }
        log::Level::Info => {
            style.set_color(Color::Cyan);
        }
        log::Level::Debug => {
            style.set_color(Color::Green);
        }
        log::Level::Trace => {
            style.set_color(Color::Ansi256(8));
        }
    }
}

fn builder() -> Builder {
    // Not RUST_LOG, cargo and other tools read that too
    let mut builder = Builder::from_env(LOG_ENV_VAR);
    builder.format(|f, record| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");

        let mut style = f.style();
        level_style(&mut style, record.level());
        let level = style.value(Pad {
            value: record.level(),
            width: 5,
        });

        let mut style = f.style();
        let target = style.set_bold(true).value(Pad {
            value: record.target(),
            width: 40,
        });

        writeln!(f, "{} {} {} {}", timestamp, level, target, record.args())
    });
    builder
}

/// Installs the console logger. Returns false if this function already ran or another logger
/// is installed.
pub fn try_init() -> bool {
    if INITIALISED.swap(true, Ordering::Relaxed) {
        return false;
    }
    match builder().try_init() {
        Ok(_) => {
            info!(
                "Logging is enabled, use {} environment variable to control filtering, logging level",
                LOG_ENV_VAR
            );
            true
        }
        Err(err) => {
            eprintln!("Cannot install console logger, {}", err);
            false
        }
    }
}

/// Installs the console logger. Only the first call does anything.
pub fn init() {
    let _ = try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_only_once() {
        init();
        assert!(!try_init());
    }

    #[test]
    fn pad_to_width() {
        assert_eq!(format!("{}", Pad { value: "WARN", width: 5 }), "WARN ");
        assert_eq!(format!("{}", Pad { value: "abcdef", width: 3 }), "abcdef");
    }
}
