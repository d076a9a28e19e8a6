//! Deterministic time-expression resolution.
//!
//! Resolution applies an ordered list of pure strategies; the first strategy
//! producing any ranges short-circuits the rest:
//!
//! 1. Week keywords: "this/current week", "last week"
//! 2. Dual-range phrasing joined by an explicit connector ("and then",
//!    "vs", "versus", "compared to/with")
//! 3. Relative keywords: "today", "yesterday", "this/last month",
//!    "last N days" (N in 1-365)
//! 4. Generic scan: month-name day ranges, month-year, quarters, numeric
//!    slash ranges, ISO ranges; non-overlapping matches accumulate
//!
//! Reporting data lags one day, so "current" windows end at yesterday and
//! never include the evaluation date.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::Regex;

use super::types::TimeRange;

/// Candidate years outside these bounds are dropped silently.
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 3000;

/// Month-name alternation shared with the AI extraction validator's
/// evidence patterns. Long forms precede their abbreviations.
pub(crate) const MONTH_ALTERNATION: &str = "january|february|march|april|june|july|august|september|october|november|december|jan|feb|mar|apr|may|jun|jul|aug|sept|sep|oct|nov|dec";

// ============================================================================
// Time Expression Resolver
// ============================================================================

/// Pure, deterministic text-to-range parser.
pub struct TimeExpressionResolver {
    /// Reference date for relative calculations (defaults to today).
    reference_date: NaiveDate,
}

impl Default for TimeExpressionResolver {
    fn default() -> Self {
        Self::new()
    }
}

type Strategy = fn(&TimeExpressionResolver, &str) -> Vec<TimeRange>;

/// Strategy chain in precedence order.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("week_keywords", TimeExpressionResolver::resolve_week_keywords),
    ("dual_range", TimeExpressionResolver::resolve_dual_range),
    (
        "relative_keyword",
        TimeExpressionResolver::resolve_relative_keyword,
    ),
    ("generic_scan", TimeExpressionResolver::resolve_generic_scan),
];

impl TimeExpressionResolver {
    /// Create a resolver with today as the reference date.
    pub fn new() -> Self {
        Self {
            reference_date: Local::now().date_naive(),
        }
    }

    /// Create a resolver with a specific reference date.
    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    /// Resolve all date ranges from text. Returns zero, one, or two ranges.
    pub fn resolve(&self, text: &str) -> Vec<TimeRange> {
        for (name, strategy) in STRATEGIES {
            let mut ranges = strategy(self, text);
            if !ranges.is_empty() {
                ranges.truncate(2);
                tracing::debug!(strategy = name, count = ranges.len(), "resolved date ranges");
                return ranges;
            }
        }
        Vec::new()
    }

    // ========================================================================
    // Strategy 1: week keywords
    // ========================================================================

    fn resolve_week_keywords(&self, text: &str) -> Vec<TimeRange> {
        let mut found: Vec<(usize, TimeRange)> = Vec::new();

        if let Some(m) = THIS_WEEK.find(text) {
            // End at yesterday; start at the Monday on/before that end.
            let end = self.reference_date - Duration::days(1);
            let start = monday_on_or_before(end);
            if let Some(range) = TimeRange::new(start, end) {
                found.push((m.start(), range));
            }
        }

        if let Some(m) = LAST_WEEK.find(text) {
            let this_monday = monday_on_or_before(self.reference_date);
            let start = this_monday - Duration::days(7);
            let end = this_monday - Duration::days(1);
            if let Some(range) = TimeRange::new(start, end) {
                found.push((m.start(), range));
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, range)| range).collect()
    }

    // ========================================================================
    // Strategy 2: dual-range phrasing
    // ========================================================================

    fn resolve_dual_range(&self, text: &str) -> Vec<TimeRange> {
        let Some(connector) = DUAL_CONNECTOR.find(text) else {
            return Vec::new();
        };

        let left = &text[..connector.start()];
        let right = &text[connector.end()..];

        match (self.parse_side(left), self.parse_side(right)) {
            (Some(a), Some(b)) => vec![a, b],
            _ => Vec::new(),
        }
    }

    /// Parse one side of a dual-range expression into a single range.
    fn parse_side(&self, text: &str) -> Option<TimeRange> {
        // Full range expressions (with explicit years) win.
        if let Some((_, _, range)) = self.scan_ranges(text).into_iter().next() {
            return Some(range);
        }

        // Otherwise pair up bare dates ("June 1 to June 15", "6/1 - 6/15"),
        // which may omit the year and default to the reference year.
        let dates = self.single_dates(text);
        match dates.len() {
            0 => None,
            1 => Some(TimeRange::single(dates[0].1)),
            _ => TimeRange::new(dates[0].1, dates[1].1),
        }
    }

    // ========================================================================
    // Strategy 3: relative keywords
    // ========================================================================

    fn resolve_relative_keyword(&self, text: &str) -> Vec<TimeRange> {
        let yesterday = self.reference_date - Duration::days(1);

        // "last N days": an exact N-day window ending yesterday. N is never
        // snapped to a nearest bucket; out-of-bounds N simply does not match.
        if let Some(caps) = LAST_N_DAYS.captures(text) {
            if let Ok(n) = caps[1].parse::<i64>() {
                if (1..=365).contains(&n) {
                    let start = yesterday - Duration::days(n - 1);
                    if let Some(range) = TimeRange::new(start, yesterday) {
                        return vec![range];
                    }
                }
            }
        }

        if TODAY.is_match(text) {
            return vec![TimeRange::single(self.reference_date)];
        }

        if YESTERDAY.is_match(text) {
            return vec![TimeRange::single(yesterday)];
        }

        if THIS_MONTH.is_match(text) {
            let first = NaiveDate::from_ymd_opt(
                self.reference_date.year(),
                self.reference_date.month(),
                1,
            );
            if let Some(first) = first {
                // On the 1st the month has no elapsed days yet; clamp to a
                // single-day window ending yesterday.
                let start = first.min(yesterday);
                if let Some(range) = TimeRange::new(start, yesterday) {
                    return vec![range];
                }
            }
        }

        if LAST_MONTH.is_match(text) {
            let (year, month) = previous_month(self.reference_date);
            if let Some(range) = TimeRange::full_month(year, month) {
                return vec![range];
            }
        }

        Vec::new()
    }

    // ========================================================================
    // Strategy 4: generic scan
    // ========================================================================

    fn resolve_generic_scan(&self, text: &str) -> Vec<TimeRange> {
        self.scan_ranges(text)
            .into_iter()
            .map(|(_, _, range)| range)
            .collect()
    }

    /// Scan for explicit range expressions, accumulating non-overlapping
    /// matches in text order. Families are tried in a fixed precedence, so
    /// a month-day range is never shadowed by its own month-year suffix.
    fn scan_ranges(&self, text: &str) -> Vec<(usize, usize, TimeRange)> {
        let mut accepted: Vec<(usize, usize, TimeRange)> = Vec::new();

        // Month-name day range with year: "June 5-10, 2025"
        for caps in MONTH_DAY_RANGE.captures_iter(text) {
            let Some(month) = month_number(&caps[1]) else {
                continue;
            };
            let (Ok(day1), Ok(day2), Ok(year)) = (
                caps[2].parse::<u32>(),
                caps[3].parse::<u32>(),
                caps[4].parse::<i32>(),
            ) else {
                continue;
            };
            if !year_in_bounds(year) {
                continue;
            }
            let Some(start) = NaiveDate::from_ymd_opt(year, month, day1) else {
                continue;
            };
            let Some(end) = NaiveDate::from_ymd_opt(year, month, day2) else {
                continue;
            };
            if let Some(range) = TimeRange::new(start, end) {
                push_candidate(&mut accepted, span_of(&caps), range);
            }
        }

        // Month-name with year: "January 2025" covers the full month
        for caps in MONTH_YEAR.captures_iter(text) {
            let Some(month) = month_number(&caps[1]) else {
                continue;
            };
            let Ok(year) = caps[2].parse::<i32>() else {
                continue;
            };
            if !year_in_bounds(year) {
                continue;
            }
            if let Some(range) = TimeRange::full_month(year, month) {
                push_candidate(&mut accepted, span_of(&caps), range);
            }
        }

        // Quarters: "Q1 2025"
        for caps in QUARTER.captures_iter(text) {
            let (Ok(quarter), Ok(year)) = (caps[1].parse::<u32>(), caps[2].parse::<i32>()) else {
                continue;
            };
            if !year_in_bounds(year) {
                continue;
            }
            if let Some(range) = TimeRange::quarter(year, quarter) {
                push_candidate(&mut accepted, span_of(&caps), range);
            }
        }

        // Numeric slash range: "6/1/2025 to 6/15/2025". Always M/D/Y.
        for caps in SLASH_RANGE.captures_iter(text) {
            let parsed = (
                parse_slash_date(&caps[1], &caps[2], Some(&caps[3]), self.reference_date),
                parse_slash_date(&caps[4], &caps[5], Some(&caps[6]), self.reference_date),
            );
            if let (Some(start), Some(end)) = parsed {
                if let Some(range) = TimeRange::new(start, end) {
                    push_candidate(&mut accepted, span_of(&caps), range);
                }
            }
        }

        // ISO range: "2025-01-01 to 2025-01-31"
        for caps in ISO_RANGE.captures_iter(text) {
            let parsed = (
                parse_iso_date(&caps[1], &caps[2], &caps[3]),
                parse_iso_date(&caps[4], &caps[5], &caps[6]),
            );
            if let (Some(start), Some(end)) = parsed {
                if let Some(range) = TimeRange::new(start, end) {
                    push_candidate(&mut accepted, span_of(&caps), range);
                }
            }
        }

        accepted.sort_by_key(|(start, _, _)| *start);
        accepted
    }

    /// Collect bare single dates in text order, year defaulting to the
    /// reference year where omitted.
    fn single_dates(&self, text: &str) -> Vec<(usize, NaiveDate)> {
        let mut found: Vec<(usize, usize, NaiveDate)> = Vec::new();

        for caps in MONTH_DAY.captures_iter(text) {
            let Some(month) = month_number(&caps[1]) else {
                continue;
            };
            let Ok(day) = caps[2].parse::<u32>() else {
                continue;
            };
            let year = match caps.get(3) {
                Some(m) => match m.as_str().parse::<i32>() {
                    Ok(y) if year_in_bounds(y) => y,
                    _ => continue,
                },
                None => self.reference_date.year(),
            };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let span = span_of(&caps);
                push_date(&mut found, span, date);
            }
        }

        for caps in SLASH_DATE.captures_iter(text) {
            let year = caps.get(3).map(|m| m.as_str());
            if let Some(date) = parse_slash_date(&caps[1], &caps[2], year, self.reference_date) {
                let span = span_of(&caps);
                push_date(&mut found, span, date);
            }
        }

        for caps in ISO_DATE.captures_iter(text) {
            if let Some(date) = parse_iso_date(&caps[1], &caps[2], &caps[3]) {
                let span = span_of(&caps);
                push_date(&mut found, span, date);
            }
        }

        found.sort_by_key(|(start, _, _)| *start);
        found
            .into_iter()
            .map(|(start, _, date)| (start, date))
            .collect()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

fn year_in_bounds(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

pub(crate) fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, number)| *number)
}

/// Parse a slash date. Ambiguous orderings are always read as M/D/Y;
/// two-digit years expand into the 2000s.
fn parse_slash_date(
    month: &str,
    day: &str,
    year: Option<&str>,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    let year = match year {
        Some(y) => {
            let y = y.parse::<i32>().ok()?;
            if y < 100 {
                2000 + y
            } else {
                y
            }
        }
        None => reference.year(),
    };
    if !year_in_bounds(year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = year.parse::<i32>().ok()?;
    if !year_in_bounds(year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn span_of(caps: &regex::Captures<'_>) -> (usize, usize) {
    let m = caps.get(0).expect("capture group 0 always present");
    (m.start(), m.end())
}

fn push_candidate(
    accepted: &mut Vec<(usize, usize, TimeRange)>,
    (start, end): (usize, usize),
    range: TimeRange,
) {
    let overlaps = accepted.iter().any(|(s, e, _)| start < *e && *s < end);
    if !overlaps {
        accepted.push((start, end, range));
    }
}

fn push_date(
    accepted: &mut Vec<(usize, usize, NaiveDate)>,
    (start, end): (usize, usize),
    date: NaiveDate,
) {
    let overlaps = accepted.iter().any(|(s, e, _)| start < *e && *s < end);
    if !overlaps {
        accepted.push((start, end, date));
    }
}

// ============================================================================
// Regex Patterns
// ============================================================================

static THIS_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:this|current)\s+week\b").expect("Invalid regex"));
static LAST_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blast\s+week\b").expect("Invalid regex"));

static DUAL_CONNECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:and\s+then|versus|vs\.?|compared\s+(?:to|with))\s+")
        .expect("Invalid regex")
});

static LAST_N_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blast\s+(\d{1,3})\s+days?\b").expect("Invalid regex"));
static TODAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btoday\b").expect("Invalid regex"));
static YESTERDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\byesterday\b").expect("Invalid regex"));
static THIS_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:this|current)\s+month\b").expect("Invalid regex"));
static LAST_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\blast\s+month\b").expect("Invalid regex"));

static MONTH_DAY_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_ALTERNATION})\s+(\d{{1,2}})(?:st|nd|rd|th)?\s*(?:-|–|to|through)\s*(\d{{1,2}})(?:st|nd|rd|th)?,?\s*(\d{{4}})\b"
    ))
    .expect("Invalid regex")
});
static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTH_ALTERNATION})\s+(\d{{4}})\b")).expect("Invalid regex")
});
static QUARTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bq([1-4])\s+(\d{4})\b").expect("Invalid regex"));
static SLASH_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{2,4})\s*(?:-|–|\bto\b|\bthrough\b)\s*(\d{1,2})/(\d{1,2})/(\d{2,4})\b",
    )
    .expect("Invalid regex")
});
static ISO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\s*(?:to|through|–|-)\s*(\d{4})-(\d{1,2})-(\d{1,2})\b",
    )
    .expect("Invalid regex")
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH_ALTERNATION})\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s*(\d{{4}}))?\b"
    ))
    .expect("Invalid regex")
});
static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").expect("Invalid regex"));
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("Invalid regex"));

// ============================================================================
// Tests
// ============================================================================
