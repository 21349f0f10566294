//! End-to-end conversion tests over inline calendars.

use std::collections::HashSet;

use blockjuggler_rfc::ical::expand::Window;
use blockjuggler_service::{ConversionOptions, Converter};
use chrono::{DateTime, TimeZone, Utc};

fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn calendar(events: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//blockjuggler//tests//EN\r\n{events}END:VCALENDAR\r\n"
    )
}

fn convert(input: &str, options: ConversionOptions, now: DateTime<Utc>) -> String {
    let window = Window::around(now, options.days).unwrap();
    Converter::new(options)
        .convert_in(input.as_bytes(), &window)
        .unwrap()
        .text
}

fn leaves(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|l| l.trim_start().starts_with("leaves project"))
        .collect()
}

#[test_log::test]
fn single_event_scenario() {
    let input = calendar(
        "BEGIN:VEVENT\r\n\
UID:standup-1\r\n\
SUMMARY:Standup\r\n\
DTSTART:20240110T090000Z\r\n\
DTEND:20240110T093000Z\r\n\
END:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));

    assert_eq!(
        text,
        "supplement resource r1 {\n\
         \x20 # Standup\n\
         \x20 # 2024-01-10 09:00:00+00:00 - 2024-01-10 09:30:00+00:00\n\
         \x20 leaves project ${projectstart} - 2024-01-10-09:00-+0000\n\
         \x20 leaves project 2024-01-10-09:30-+0000 - ${projectend}\n\
         }\n"
    );
}

#[test_log::test]
fn event_outside_window_is_ignored() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:old\r\nSUMMARY:Old\r\n\
DTSTART:20230110T090000Z\r\nDTEND:20230110T093000Z\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 5,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert_eq!(
        leaves(&text),
        vec!["  leaves project ${projectstart} - ${projectend}"]
    );
}

#[test_log::test]
fn declined_event_is_excluded() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:declined\r\nSUMMARY:Skip me\r\n\
DTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
ATTENDEE;CN=Jane Doe;PARTSTAT=DECLINED:mailto:jane@example.com\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:kept\r\nSUMMARY:Keep me\r\n\
DTSTART:20240110T110000Z\r\nDTEND:20240110T120000Z\r\n\
ATTENDEE;CN=Jane Doe;PARTSTAT=ACCEPTED:mailto:jane@example.com\r\n\
END:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        self_ids: HashSet::from(["Jane Doe".to_string()]),
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert!(!text.contains("Skip me"));
    assert!(text.contains("  # Keep me\n"));
    assert_eq!(leaves(&text).len(), 2);
}

#[test_log::test]
fn declined_by_unknown_name_is_kept() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:declined\r\nSUMMARY:Someone else declined\r\n\
DTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\n\
ATTENDEE;CN=John Roe;PARTSTAT=DECLINED:mailto:john@example.com\r\n\
END:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        self_ids: HashSet::from(["Jane Doe".to_string()]),
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert!(text.contains("  # Someone else declined\n"));
}

#[test_log::test]
fn escaped_comma_and_location_label() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:sync\r\nSUMMARY:Team\\, sync\r\nLOCATION:Room 4\\, east\r\n\
DTSTART:20240110T090000Z\r\nDTEND:20240110T100000Z\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        include_location: true,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert!(text.contains("  # Team, sync - Room 4, east\n"));
}

#[test_log::test]
fn zoned_event_renders_local_offset() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:prague\r\nSUMMARY:Talk\r\n\
DTSTART;TZID=Europe/Prague:20171215T183500\r\n\
DTEND;TZID=Europe/Prague:20171215T193500\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 2,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2017, 12, 15));
    assert_eq!(
        leaves(&text),
        vec![
            "  leaves project ${projectstart} - 2017-12-15-18:35-+0100",
            "  leaves project 2017-12-15-19:35-+0100 - ${projectend}",
        ]
    );
}

#[test_log::test]
fn recurring_event_fills_gaps() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:daily\r\nSUMMARY:Daily\r\n\
DTSTART:20240101T090000Z\r\nDTEND:20240101T100000Z\r\n\
RRULE:FREQ=DAILY\r\nEXDATE:20240110T090000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:daily\r\nRECURRENCE-ID:20240111T090000Z\r\nSUMMARY:Daily (moved)\r\n\
DTSTART:20240111T140000Z\r\nDTEND:20240111T150000Z\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 2,
        ..ConversionOptions::default()
    };

    // Window is 2024-01-08 to 2024-01-12.
    let text = convert(&input, options, noon(2024, 1, 10));
    assert_eq!(
        leaves(&text),
        vec![
            "  leaves project ${projectstart} - 2024-01-08-09:00-+0000",
            "  leaves project 2024-01-08-10:00-+0000 - 2024-01-09-09:00-+0000",
            "  leaves project 2024-01-09-10:00-+0000 - 2024-01-11-14:00-+0000",
            "  leaves project 2024-01-11-15:00-+0000 - ${projectend}",
        ]
    );
    assert!(text.contains("  # Daily (moved)\n"));
}

#[test_log::test]
fn all_day_event_spans_midnight_utc() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:holiday\r\nSUMMARY:Holiday\r\n\
DTSTART;VALUE=DATE:20240110\r\nDTEND;VALUE=DATE:20240111\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 3,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert_eq!(
        leaves(&text),
        vec![
            "  leaves project ${projectstart} - 2024-01-10-00:00-+0000",
            "  leaves project 2024-01-11-00:00-+0000 - ${projectend}",
        ]
    );
}

#[test_log::test]
fn overlapping_events_do_not_reopen_gap() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:long\r\nSUMMARY:Workshop\r\n\
DTSTART:20240110T080000Z\r\nDTEND:20240110T120000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:short\r\nSUMMARY:Call\r\n\
DTSTART:20240110T090000Z\r\nDURATION:PT30M\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert_eq!(
        leaves(&text),
        vec![
            "  leaves project ${projectstart} - 2024-01-10-08:00-+0000",
            "  leaves project 2024-01-10-12:00-+0000 - ${projectend}",
        ]
    );
}

#[test_log::test]
fn overflowing_duration_is_skipped_when_continuing() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:forever\r\nSUMMARY:Forever\r\n\
DTSTART:20240110T090000Z\r\nDURATION:P4000000000W\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:call\r\nSUMMARY:Call\r\n\
DTSTART:20240110T110000Z\r\nDURATION:PT30M\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        continue_on_error: true,
        ..ConversionOptions::default()
    };
    let window = Window::around(noon(2024, 1, 10), options.days).unwrap();

    let conversion = Converter::new(options)
        .convert_in(input.as_bytes(), &window)
        .unwrap();

    assert_eq!(conversion.failures.len(), 1);
    assert!(conversion.failures[0].raw.contains("UID:forever"));
    assert!(conversion.text.contains("  # Call\n"));
    assert!(!conversion.text.contains("Forever"));
}

#[test_log::test]
fn overflowing_duration_aborts_by_default() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:forever\r\nSUMMARY:Forever\r\n\
DTSTART:20240110T090000Z\r\nDURATION:P4000000000W\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        ..ConversionOptions::default()
    };
    let window = Window::around(noon(2024, 1, 10), options.days).unwrap();

    let result = Converter::new(options).convert_in(input.as_bytes(), &window);
    assert!(matches!(
        result,
        Err(blockjuggler_service::ConvertError::Occurrence(_))
    ));
}

#[test_log::test]
fn malformed_unused_property_does_not_fail_document() {
    let input = calendar(
        "BEGIN:VEVENT\r\nUID:a\r\nDTSTAMP:2024-01-10\r\nSUMMARY:Sloppy\r\n\
DTSTART:20240110T090000Z\r\nDTEND:20240110T093000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:b\r\nDTSTAMP:20240101T000000Z\r\nSUMMARY:Tidy\r\n\
DTSTART:20240110T110000Z\r\nDTEND:20240110T113000Z\r\nEND:VEVENT\r\n",
    );
    let options = ConversionOptions {
        days: 1,
        ..ConversionOptions::default()
    };

    let text = convert(&input, options, noon(2024, 1, 10));
    assert!(text.contains("  # Sloppy\n"));
    assert!(text.contains("  # Tidy\n"));
    assert_eq!(leaves(&text).len(), 3);
}
