// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! The data encoding core of OPC UA.
//!
//! * `types` holds node ids, the builtin types, `Variant` and `ExtensionObject`, the
//!   `UaEncoder` / `UaDecoder` traits with their binary, XML and JSON implementations, and the
//!   type registry that maps encoding ids onto structure codecs.
//! * `core` holds configuration of the decoding limits and namespaces.
//! * `console_logging` installs a logger that writes to the console.

#![allow(clippy::bool_assert_comparison)]
#![allow(clippy::float_cmp)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[cfg(test)]
extern crate tempdir;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate derivative;

/// Tracing macro for obtaining a lock on a `Mutex`. Sometimes deadlocks can happen in code,
/// and if they do, this macro is useful for finding out where they happened.
#[macro_export]
macro_rules! trace_lock {
    ( $x:expr ) => {
        {
//            use std::thread;
//            trace!("Thread {:?}, {} locking at {}, line {}", thread::current().id(), stringify!($x), file!(), line!());
            let v = $x.lock();
//            trace!("Thread {:?}, {} lock completed", thread::current().id(), stringify!($x));
            v
        }
    }
}

pub(crate) mod sync {
    pub use parking_lot::Mutex;
}

#[cfg(feature = "console-logging")]
pub mod console_logging;
pub mod core;
pub mod types;

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::types::*;
}
