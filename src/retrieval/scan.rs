//! Line selection over the persisted log.
//!
//! Both scans read the file front to back. The tail scan keeps a rolling
//! window of the last `n` lines; the range scan parses a timestamp from the
//! start of every line and skips lines it cannot parse.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::logger::format::{DATE_TIME_FORMAT, TIME_FORMAT};

/// The most recent `n` lines, oldest first.
pub fn tail_lines<R: BufRead>(reader: R, n: usize) -> io::Result<Vec<String>> {
    let mut window = VecDeque::with_capacity(n.min(1024));
    for line in lines(reader) {
        let line = line?;
        if window.len() == n {
            window.pop_front();
        }
        if n > 0 {
            window.push_back(line);
        }
    }
    Ok(window.into())
}

/// Lines stamped within `[from, to]`. Time-only stamps are read against
/// `today`.
///
/// Stamps carry no offset. A stamp from the repeated hour at a DST fall-back
/// names two instants; the line is kept if either lies in the window.
pub fn range_lines<R: BufRead>(
    reader: R,
    from: DateTime<Utc>,
    to: Option<DateTime<Utc>>,
    today: NaiveDate,
) -> io::Result<Vec<String>> {
    let mut selected = Vec::new();
    for line in lines(reader) {
        let line = line?;
        let Some(naive) = parse_stamp(&line, today) else {
            continue;
        };
        if stamped_within(local_instants(&naive), from, to) {
            selected.push(line);
        }
    }
    Ok(selected)
}

/// Parse the leading `YYYY/MM/DD HH:MM:SS` (or bare `HH:MM:SS`, dated
/// `today`) of a line as local time. Ambiguous local times resolve to the
/// earlier instant.
pub fn extract_timestamp(line: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    local_instants(&parse_stamp(line, today)?).earliest()
}

fn parse_stamp(line: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let mut parts = line.splitn(3, ' ');
    let first = parts.next()?;
    let second = parts.next()?;

    NaiveDateTime::parse_from_str(&format!("{} {}", first, second), DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveTime::parse_from_str(first, TIME_FORMAT)
                .ok()
                .map(|time| today.and_time(time))
        })
}

fn local_instants(naive: &NaiveDateTime) -> LocalResult<DateTime<Utc>> {
    Local
        .from_local_datetime(naive)
        .map(|local| local.with_timezone(&Utc))
}

fn stamped_within(
    stamp: LocalResult<DateTime<Utc>>,
    from: DateTime<Utc>,
    to: Option<DateTime<Utc>>,
) -> bool {
    let inside = |t: DateTime<Utc>| t >= from && to.map_or(true, |to| t <= to);
    match stamp {
        LocalResult::Single(t) => inside(t),
        LocalResult::Ambiguous(first, second) => inside(first) || inside(second),
        // a local time skipped by a DST gap is never written
        LocalResult::None => false,
    }
}

fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|raw| {
        raw.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Level};
    use crate::logger::format::format_line;
    use chrono::Duration;
    use std::io::Cursor;

    fn local(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 3, 10, h, m, s)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn sample() -> String {
        (0..5)
            .map(|i| format!("2024/03/10 10:00:0{} [INFO] event {}\n", i, i))
            .collect()
    }

    #[test]
    fn test_tail_returns_most_recent_in_order() {
        let lines = tail_lines(Cursor::new(sample()), 2).unwrap();
        assert_eq!(
            lines,
            vec![
                "2024/03/10 10:00:03 [INFO] event 3",
                "2024/03/10 10:00:04 [INFO] event 4",
            ]
        );
    }

    #[test]
    fn test_tail_larger_than_file() {
        assert_eq!(tail_lines(Cursor::new(sample()), 50).unwrap().len(), 5);
        assert!(tail_lines(Cursor::new(""), 3).unwrap().is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let lines = range_lines(
            Cursor::new(sample()),
            local(10, 0, 1),
            Some(local(10, 0, 3)),
            today(),
        )
        .unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("event 1"));
        assert!(lines[2].ends_with("event 3"));
    }

    #[test]
    fn test_range_skips_unparseable_lines() {
        let input = "garbage\n\n2024/03/10 10:00:02 [WARN] kept\nnot a 10:00:02 line\n";
        let lines = range_lines(Cursor::new(input), local(9, 0, 0), None, today()).unwrap();
        assert_eq!(lines, vec!["2024/03/10 10:00:02 [WARN] kept"]);
    }

    #[test]
    fn test_time_only_lines_use_today() {
        assert_eq!(
            extract_timestamp("10:32:30 [INFO] Starting server...", today()),
            Some(local(10, 32, 30))
        );
        assert_eq!(
            extract_timestamp("2024/03/10 10:32:30 [INFO] Starting server...", today()),
            Some(local(10, 32, 30))
        );
        assert_eq!(extract_timestamp("10:32:30", today()), None);
    }

    #[test]
    fn test_crlf_is_trimmed() {
        let lines = tail_lines(Cursor::new("a\r\nb\r\n"), 5).unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_formatted_line_round_trips_to_the_second() {
        let at = Utc::now() - Duration::days(2);
        let entry = Entry::at(at, Level::Error, "disk full");
        let line = format_line(&entry);

        let parsed = extract_timestamp(line.trim_end(), today()).unwrap();
        assert_eq!(parsed.timestamp(), at.timestamp());
    }

    #[test]
    fn test_repeated_hour_matches_either_instant() {
        let first = Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap();
        let second = first + Duration::hours(1);
        let repeated = LocalResult::Ambiguous(first, second);

        // window covering only the later occurrence
        let from = second - Duration::minutes(5);
        assert!(stamped_within(repeated, from, Some(second + Duration::minutes(5))));
        assert!(!stamped_within(LocalResult::Single(first), from, None));

        // window covering only the earlier occurrence
        assert!(stamped_within(repeated, first, Some(first + Duration::minutes(5))));

        // neither occurrence
        assert!(!stamped_within(repeated, second + Duration::seconds(1), None));
        assert!(!stamped_within(LocalResult::None, first, None));
    }
}
