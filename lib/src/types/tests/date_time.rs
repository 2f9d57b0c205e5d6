use std::str::FromStr;

use serde_json::json;

use crate::types::tests::*;

fn ticks_bytes(ticks: i64) -> [u8; 8] {
    ticks.to_le_bytes()
}

#[test]
fn null_and_epoch() {
    assert!(DateTime::null().is_null());
    assert_eq!(DateTime::epoch(), DateTime::null());
    assert_eq!(DateTime::ymd_hms(1601, 1, 1, 0, 0, 0).ticks(), 0);
    assert_eq!(DateTime::ymd_hms_nano(1601, 1, 1, 0, 0, 0, 100).ticks(), 1);
    serialize_and_compare(DateTime::null(), &ticks_bytes(0));
}

#[test]
fn decode_ticks_before_epoch_as_null() {
    for ticks in [-1i64, -10_000_000, i64::MIN].iter() {
        let dt = decode_bytes::<DateTime>(&ticks_bytes(*ticks)).unwrap();
        assert!(dt.is_null(), "{}", ticks);
        serialize_and_compare(dt, &ticks_bytes(0));
    }
    // Dates before 1601 made from parts are null too
    assert!(DateTime::ymd_hms(1600, 12, 31, 23, 59, 59).is_null());
}

#[test]
fn decode_ticks_past_endtimes_clamp() {
    let endtimes = DateTime::ymd_hms(9999, 12, 31, 23, 59, 59);
    assert_eq!(endtimes, DateTime::endtimes());
    assert_eq!(endtimes.ticks(), DateTime::endtimes_ticks());

    for ticks in [DateTime::endtimes_ticks() + 1, i64::MAX].iter() {
        let dt = decode_bytes::<DateTime>(&ticks_bytes(*ticks)).unwrap();
        assert_eq!(dt, DateTime::endtimes());
        // The end of time goes on the wire as i64::MAX
        serialize_and_compare(dt, &ticks_bytes(i64::MAX));
    }
    assert_eq!(DateTime::endtimes().to_iso8601(), "9999-12-31T23:59:59Z");
}

#[test]
fn decode_truncated() {
    assert_eq!(
        decode_bytes::<DateTime>(&[0u8; 7]).unwrap_err(),
        EncodingError::UnexpectedEof
    );
}

#[test]
fn iso8601_text() {
    let dt = DateTime::ymd_hms_nano(2024, 3, 7, 11, 22, 33, 123_456_700);
    assert_eq!(dt.to_string(), "2024-03-07T11:22:33.123456700Z");
    assert_eq!(DateTime::from_str(&dt.to_string()).unwrap(), dt);
    assert_eq!(DateTime::epoch().to_iso8601(), "1601-01-01T00:00:00Z");

    // Offsets are converted to UTC
    assert_eq!(
        DateTime::from_str("2024-03-07T13:22:33+02:00").unwrap(),
        DateTime::ymd_hms(2024, 3, 7, 11, 22, 33)
    );
    assert!(DateTime::from_str("1500-01-01T00:00:00Z").unwrap().is_null());

    for bad in ["", "2024-03-07", "yesterday", "2024-13-01T00:00:00Z"].iter() {
        assert!(
            matches!(DateTime::from_str(bad), Err(EncodingError::InvalidEncoding(_))),
            "{}",
            bad
        );
    }
}

#[test]
fn text_encodings_use_iso8601() {
    let ctx = EncodingContext::default();
    let dt = DateTime::ymd_hms_nano(2024, 3, 7, 11, 22, 33, 123_456_700);

    let mut encoder = XmlStreamEncoder::new();
    encoder.begin_struct("Root").unwrap();
    encoder.date_time("Time", &dt).unwrap();
    encoder.date_time("End", &DateTime::endtimes()).unwrap();
    encoder.end_struct().unwrap();
    let xml = encoder.into_string();
    assert!(xml.contains("<Time>2024-03-07T11:22:33.123456700Z</Time>"));
    assert!(xml.contains("<End>9999-12-31T23:59:59Z</End>"));
    let mut decoder = XmlStreamDecoder::from_body(&xml, &ctx).unwrap();
    assert_eq!(decoder.date_time("Time").unwrap(), dt);
    assert_eq!(decoder.date_time("End").unwrap(), DateTime::endtimes());
    // Missing dates are null
    assert!(decoder.date_time("Missing").unwrap().is_null());

    let mut encoder = JsonStreamEncoder::new();
    encoder.begin_struct("Root").unwrap();
    encoder.date_time("Time", &dt).unwrap();
    encoder.end_struct().unwrap();
    let value = encoder.into_value();
    assert_eq!(value, json!({"Time": "2024-03-07T11:22:33.123456700Z"}));
    let mut decoder = JsonStreamDecoder::from_body(&value, &ctx).unwrap();
    assert_eq!(decoder.date_time("Time").unwrap(), dt);
    assert!(decoder.date_time("Missing").unwrap().is_null());

    let value = json!({"Time": "not a date"});
    let mut decoder = JsonStreamDecoder::from_body(&value, &ctx).unwrap();
    assert!(matches!(
        decoder.date_time("Time"),
        Err(EncodingError::InvalidEncoding(_))
    ));
}

#[test]
fn now() {
    use chrono::Datelike;
    let now = DateTime::now();
    assert!(!now.is_null());
    let year = now.as_chrono().year();
    assert!(year > 2000 && year < 2100);
}
