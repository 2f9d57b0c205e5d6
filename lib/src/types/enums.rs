// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Enumerations are encoded as their Int32 value. Values a peer sends that the enumeration does
//! not know are kept so they re-encode unchanged.

use std::fmt::Debug;

use crate::types::{
    codec::{UaDecoder, UaEncoder},
    encoding::EncodingResult,
};

/// An OPC UA enumeration with a fixed set of named values
pub trait UaEnum: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// The name of the enumeration data type
    const NAME: &'static str;

    fn from_i32(value: i32) -> Option<Self>;

    fn to_i32(self) -> i32;

    /// The symbolic name of the value
    fn symbol(self) -> &'static str;
}

/// A value of an enumeration as read off the wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Enumeration<E: UaEnum> {
    Known(E),
    /// A value the enumeration does not define
    Unknown(i32),
}

impl<E: UaEnum> From<E> for Enumeration<E> {
    fn from(v: E) -> Self {
        Enumeration::Known(v)
    }
}

impl<E: UaEnum> Enumeration<E> {
    pub fn from_i32(value: i32) -> Self {
        match E::from_i32(value) {
            Some(v) => Enumeration::Known(v),
            None => {
                debug!("Value {} is not defined by enumeration {}", value, E::NAME);
                Enumeration::Unknown(value)
            }
        }
    }

    pub fn to_i32(&self) -> i32 {
        match self {
            Enumeration::Known(v) => v.to_i32(),
            Enumeration::Unknown(v) => *v,
        }
    }

    pub fn symbol(&self) -> Option<&'static str> {
        match self {
            Enumeration::Known(v) => Some(v.symbol()),
            Enumeration::Unknown(_) => None,
        }
    }

    pub fn known(&self) -> Option<E> {
        match self {
            Enumeration::Known(v) => Some(*v),
            Enumeration::Unknown(_) => None,
        }
    }
}

pub fn encode_enumeration<E: UaEnum>(
    encoder: &mut dyn UaEncoder,
    field: &str,
    value: &Enumeration<E>,
) -> EncodingResult<()> {
    encoder.enumeration(field, value.to_i32(), value.symbol())
}

pub fn decode_enumeration<E: UaEnum>(
    decoder: &mut dyn UaDecoder,
    field: &str,
) -> EncodingResult<Enumeration<E>> {
    decoder.enumeration(field).map(Enumeration::from_i32)
}

/// Declares an enumeration and its `UaEnum` impl
#[macro_export]
macro_rules! ua_enum {
    ($(#[$meta:meta])* pub enum $name:ident { $($variant:ident = $value:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value,)*
        }

        impl $crate::types::enums::UaEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn from_i32(value: i32) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)*
                    _ => None,
                }
            }

            fn to_i32(self) -> i32 {
                self as i32
            }

            fn symbol(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    ua_enum! {
        pub enum Colour {
            Red = 0,
            Green = 1,
        }
    }

    #[test]
    fn unknown_values_are_kept() {
        let v = Enumeration::<Colour>::from_i32(1);
        assert_eq!(v, Enumeration::Known(Colour::Green));
        assert_eq!(v.symbol(), Some("Green"));
        let v = Enumeration::<Colour>::from_i32(7);
        assert_eq!(v, Enumeration::Unknown(7));
        assert_eq!(v.to_i32(), 7);
        assert_eq!(v.symbol(), None);
    }
}
