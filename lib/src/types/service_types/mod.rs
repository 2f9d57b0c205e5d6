// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Structures of the standard information model compiled into the crate. Each one lists its
//! fields in wire order and is registered in the builtin type registry.

mod argument;
mod node_attributes;
mod request_header;
mod response_header;

pub use self::argument::*;
pub use self::node_attributes::*;
pub use self::request_header::*;
pub use self::response_header::*;
