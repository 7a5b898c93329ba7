//! Minute bar parsing from CryptoDataDownload-style CSV text.

use std::collections::HashMap;

use cddbars_types::{CddError, MinuteBar};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};

/// Local date-time layout accepted in the time column, read as UTC.
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of [`DATE_TIME_FORMAT`]: `d` is an ASCII digit, anything else literal.
const DATE_TIME_SHAPE: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";

/// Epoch values longer than this many digits are milliseconds.
const EPOCH_SECONDS_MAX_DIGITS: usize = 10;

/// Logical columns a file must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Time,
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Recognized normalized header names per field, in preference order.
static COLUMN_ALIASES: [(Field, &[&str]); 6] = [
    (Field::Time, &["unix", "timestamp", "date"]),
    (Field::Open, &["open"]),
    (Field::High, &["high"]),
    (Field::Low, &["low"]),
    (Field::Close, &["close"]),
    (
        Field::Volume,
        &[
            "volumebtc",
            "volume(crypto)",
            "volume crypto",
            "volume",
            "volumebaseccy",
            "volumebase",
        ],
    ),
];

/// Column positions resolved from a header line.
#[derive(Debug, Clone, Copy)]
struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
    /// Number of header columns; shorter rows are skipped.
    width: usize,
}

impl Columns {
    /// Resolves every [`Field`] against the header record.
    ///
    /// `header` is the raw line, reported on failure.
    fn resolve(names: &StringRecord, header: &str) -> Result<Self, CddError> {
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize(name), i))
            .collect();

        let lookup = |field: Field| {
            COLUMN_ALIASES
                .iter()
                .find(|(f, _)| *f == field)
                .and_then(|(_, aliases)| aliases.iter().find_map(|a| index.get(*a).copied()))
                .ok_or_else(|| CddError::Schema {
                    header: header.to_string(),
                })
        };

        Ok(Self {
            time: lookup(Field::Time)?,
            open: lookup(Field::Open)?,
            high: lookup(Field::High)?,
            low: lookup(Field::Low)?,
            close: lookup(Field::Close)?,
            volume: lookup(Field::Volume)?,
            width: names.len(),
        })
    }
}

/// Normalizes a header name: lower-case, no spaces or underscores.
fn normalize(name: &str) -> String {
    name.to_lowercase().replace([' ', '_'], "").trim().to_string()
}

/// Parses a numeric field, substituting `NaN` for anything unparseable.
fn parse_number(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

/// Parses the time column.
///
/// All-digit values are epoch seconds, or epoch milliseconds when longer
/// than ten digits. Anything else must be `yyyy-MM-dd HH:mm:ss` in UTC.
pub fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let value: i64 = raw.parse().ok()?;
        if raw.len() > EPOCH_SECONDS_MAX_DIGITS {
            DateTime::from_timestamp_millis(value)
        } else {
            DateTime::from_timestamp(value, 0)
        }
    } else if has_date_time_shape(raw) {
        NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
            .ok()
            .map(|dt| dt.and_utc())
    } else {
        None
    }
}

/// Checks the fixed-width `yyyy-MM-dd HH:mm:ss` layout; chrono alone also
/// accepts unpadded fields.
fn has_date_time_shape(raw: &str) -> bool {
    raw.len() == DATE_TIME_SHAPE.len()
        && raw
            .bytes()
            .zip(DATE_TIME_SHAPE)
            .all(|(b, &s)| if s == b'd' { b.is_ascii_digit() } else { b == s })
}

/// Splits text into lines ending at `\n`, `\r\n` or a lone `\r`.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(end) = rest.find(['\r', '\n']) {
        lines.push(&rest[..end]);
        let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + skip..];
    }
    if !rest.is_empty() {
        lines.push(rest);
    }
    lines
}

/// Parses one file's worth of CSV text into minute bars.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Blank lines and lines starting
/// with `#` are ignored anywhere in the text. Fields are split on `,` with no
/// quoting. The first remaining line is the header; columns are located by name, not
/// position. Rows with fewer fields than the header are skipped. Unparseable
/// prices or volumes become `NaN`. The result is sorted by time.
///
/// # Errors
///
/// Returns [`CddError::Schema`] when the header lacks a time, OHLC or volume
/// column, and [`CddError::Parse`] when a row's time value cannot be read.
pub fn parse_minute_bars(csv: &str) -> Result<Vec<MinuteBar>, CddError> {
    let csv = csv.strip_prefix('\u{feff}').unwrap_or(csv);
    let lines: Vec<(usize, &str)> = split_lines(csv)
        .into_iter()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect();

    let Some(&(_, header)) = lines.first() else {
        return Ok(Vec::new());
    };

    let data = lines.iter().map(|(_, line)| *line).collect::<Vec<_>>().join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(data.as_bytes());
    let mut records = reader.records();

    let names = match records.next() {
        Some(record) => record.map_err(|e| CddError::Parse(e.to_string()))?,
        None => return Ok(Vec::new()),
    };
    let cols = Columns::resolve(&names, header)?;

    let mut bars = Vec::new();
    let mut short_rows = 0usize;

    for ((line_no, _), record) in lines.iter().skip(1).zip(records) {
        let record =
            record.map_err(|e| CddError::Parse(format!("line {}: {e}", line_no + 1)))?;
        if record.len() < cols.width {
            short_rows += 1;
            continue;
        }

        let raw_time = &record[cols.time];
        let time = parse_time(raw_time).ok_or_else(|| {
            CddError::Parse(format!(
                "line {}: unrecognized time value '{}'",
                line_no + 1,
                raw_time.trim()
            ))
        })?;

        bars.push(MinuteBar::new(
            time,
            parse_number(&record[cols.open]),
            parse_number(&record[cols.high]),
            parse_number(&record[cols.low]),
            parse_number(&record[cols.close]),
            parse_number(&record[cols.volume]),
        ));
    }

    if short_rows > 0 {
        tracing::debug!(short_rows, "skipped rows shorter than the header");
    }

    bars.sort_by_key(|bar| bar.time);
    Ok(bars)
}
