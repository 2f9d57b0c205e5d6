// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the implementation of `DateTime`.

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::encoding::*;

const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_SECOND: i64 = 10_000_000;
/// Seconds between the OPC UA epoch (1601-01-01) and the unix epoch
const EPOCH_OFFSET_SECONDS: i64 = 11_644_473_600;
/// Ticks of 9999-12-31 23:59:59, after which dates are sent as `i64::MAX`
const ENDTIMES_TICKS: i64 = 2_650_467_743_990_000_000;

pub type DateTimeUtc = chrono::DateTime<Utc>;

/// A date/time value held as 100 nanosecond ticks since 1601-01-01 00:00:00 UTC. Values are
/// clamped to the range the protocol can represent, so the epoch doubles as the null date and
/// 9999-12-31 23:59:59 as the end of time.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Default)]
pub struct DateTime {
    ticks: i64,
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.checked_ticks().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<DateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ticks = i64::deserialize(deserializer)?;
        Ok(DateTime::from(ticks))
    }
}

/// DateTime encoded as 64-bit signed int
impl BinaryEncoder<DateTime> for DateTime {
    fn byte_len(&self) -> usize {
        8
    }

    fn encode<S: Write>(&self, stream: &mut S) -> EncodingResult<usize> {
        write_i64(stream, self.checked_ticks())
    }

    fn decode<S: Read>(stream: &mut S, _: &DecodingOptions) -> EncodingResult<Self> {
        Ok(DateTime::from(read_i64(stream)?))
    }
}

impl From<i64> for DateTime {
    fn from(ticks: i64) -> Self {
        DateTime {
            ticks: ticks.clamp(0, ENDTIMES_TICKS),
        }
    }
}

impl From<DateTime> for i64 {
    fn from(value: DateTime) -> Self {
        value.checked_ticks()
    }
}

impl From<DateTimeUtc> for DateTime {
    fn from(date_time: DateTimeUtc) -> Self {
        let seconds = date_time.timestamp().saturating_add(EPOCH_OFFSET_SECONDS);
        let ticks = seconds
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(date_time.timestamp_subsec_nanos() as i64 / NANOS_PER_TICK))
            .unwrap_or(if seconds < 0 { 0 } else { ENDTIMES_TICKS });
        DateTime::from(ticks)
    }
}

impl From<DateTime> for DateTimeUtc {
    fn from(value: DateTime) -> Self {
        value.as_chrono()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

impl FromStr for DateTime {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| DateTime::from(dt.with_timezone(&Utc)))
            .map_err(|e| {
                error!("Cannot parse date {}, error = {}", s, e);
                EncodingError::invalid_encoding(format!("\"{}\" is not an ISO 8601 date", s))
            })
    }
}

impl DateTime {
    /// Constructs from the current time
    pub fn now() -> DateTime {
        DateTime::from(Utc::now())
    }

    /// Creates a null date time (i.e. the epoch)
    pub fn null() -> DateTime {
        DateTime { ticks: 0 }
    }

    /// Tests if the date time is null (i.e. equal to epoch)
    pub fn is_null(&self) -> bool {
        self.ticks == 0
    }

    /// Constructs a date time for the epoch
    pub fn epoch() -> DateTime {
        DateTime::null()
    }

    /// Constructs a date time for the endtimes
    pub fn endtimes() -> DateTime {
        DateTime {
            ticks: ENDTIMES_TICKS,
        }
    }

    /// Returns the maximum tick value, corresponding to the end of time
    pub fn endtimes_ticks() -> i64 {
        ENDTIMES_TICKS
    }

    /// Constructs from a year, month, day, hour, minute, second
    pub fn ymd_hms(
        year: u16,
        month: u16,
        day: u16,
        hour: u16,
        minute: u16,
        second: u16,
    ) -> DateTime {
        DateTime::ymd_hms_nano(year, month, day, hour, minute, second, 0)
    }

    /// Constructs from a year, month, day, hour, minute, second, nanosecond. An impossible date
    /// yields the null date.
    pub fn ymd_hms_nano(
        year: u16,
        month: u16,
        day: u16,
        hour: u16,
        minute: u16,
        second: u16,
        nanos: u32,
    ) -> DateTime {
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .and_then(|d| d.and_hms_nano_opt(hour as u32, minute as u32, second as u32, nanos))
            .map(|naive| DateTime::from(Utc.from_utc_datetime(&naive)))
            .unwrap_or_else(|| {
                error!(
                    "Invalid date {}-{}-{} {}:{}:{}.{}",
                    year, month, day, hour, minute, second, nanos
                );
                DateTime::null()
            })
    }

    /// Returns the time in ticks, of 100 nanosecond intervals
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Ticks as they go on the wire, the end of time is sent as `i64::MAX`
    pub fn checked_ticks(&self) -> i64 {
        if self.ticks >= ENDTIMES_TICKS {
            i64::MAX
        } else {
            self.ticks
        }
    }

    /// Time as chrono
    pub fn as_chrono(&self) -> DateTimeUtc {
        let seconds = self.ticks / TICKS_PER_SECOND - EPOCH_OFFSET_SECONDS;
        let nanos = (self.ticks % TICKS_PER_SECOND) * NANOS_PER_TICK;
        Utc.timestamp_opt(seconds, nanos as u32)
            .single()
            .unwrap_or_default()
    }

    /// ISO 8601 form used by the XML and JSON encodings
    pub fn to_iso8601(&self) -> String {
        self.as_chrono().to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}
