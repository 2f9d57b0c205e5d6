// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The core module holds what sits around the codecs: configuration of the decoding limits and
//! namespaces, and debugging helpers.

/// Contains debugging utility helper functions
pub mod debug {
    /// Prints out the content of a slice in hex and visible char format to aid debugging. Format
    /// is similar to corresponding functionality in node-opcua
    pub fn log_buffer(message: &str, buf: &[u8]) {
        // No point doing anything unless trace level is on
        if !log_enabled!(target: "hex", log::Level::Trace) {
            return;
        }

        const LINE_LEN: usize = 32;
        trace!(target: "hex", "{}", message);

        for (line, chunk) in buf.chunks(LINE_LEN).enumerate() {
            let mut hex_line = format!("{:08x}:", line * LINE_LEN);
            let mut char_line = String::with_capacity(LINE_LEN);
            for b in chunk {
                hex_line.push_str(&format!(" {:02x}", b));
                char_line.push(if (32..=126).contains(b) { *b as char } else { '.' });
            }
            for _ in chunk.len()..LINE_LEN {
                hex_line.push_str("   ");
            }
            trace!(target: "hex", "{} {}", hex_line, char_line);
        }
    }
}

pub mod config;

/// Contains most of the things that are typically required to encode and decode.
pub mod prelude {
    pub use super::config::{Config, ConfigError, EncodingConfig};
}

#[cfg(test)]
mod tests;
