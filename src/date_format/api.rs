use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, ParseError};
use pest::error::InputLocation;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::binder::error::{BindError, Result};

#[derive(Parser)]
#[grammar = "date_format/date_format.pest"] // relative to src
pub struct DatePatternParser;

/// Pattern stores fall back to when none is configured.
pub const DEFAULT_PATTERN: &str = "M/d/yy h:mm a";

const DEFAULT_STRFTIME: &str = "%-m/%-d/%y %-I:%M %p";

/// Date fields a pattern leaves out start from 1970-01-01.
const EPOCH_YEAR: i64 = 1970;

/// Two-digit years land within this many years before the current year.
const TWO_DIGIT_YEARS_BACK: i32 = 80;

/// A compiled date pattern. Parses and formats `NaiveDateTime` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
}

impl DateFormat {
    pub fn compile(pattern: &str) -> Result<Self> {
        let pairs = DatePatternParser::parse(Rule::pattern, pattern).map_err(|e| {
            let position = match e.location {
                InputLocation::Pos(p) => p,
                InputLocation::Span((start, _)) => start,
            };
            BindError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: format!("unsupported pattern character at position {}", position),
            }
        })?;

        let mut strftime = String::with_capacity(pattern.len() * 2);
        for pair in pairs.flatten() {
            append_item(&mut strftime, pair);
        }
        Ok(DateFormat {
            pattern: pattern.to_string(),
            strftime,
        })
    }

    /// The pattern in its original letter form.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse `text`. Patterns that carry no time of day yield midnight and
    /// missing date fields default to 1970-01-01. Two-digit years resolve
    /// into the century starting 80 years before the current year.
    pub fn parse(&self, text: &str) -> std::result::Result<NaiveDateTime, ParseError> {
        let mut parsed = Parsed::new();
        parse(&mut parsed, text.trim(), StrftimeItems::new(&self.strftime))?;
        if parsed.year.is_none() {
            match (parsed.year_div_100, parsed.year_mod_100) {
                (None, Some(yy)) => {
                    let year = two_digit_year(yy, Local::now().year());
                    parsed.set_year(i64::from(year))?;
                }
                (None, None) => parsed.set_year(EPOCH_YEAR)?,
                _ => {}
            }
        }
        if parsed.month.is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day.is_none() {
            parsed.set_day(1)?;
        }
        let date = parsed.to_naive_date()?;
        let time = match parsed.to_naive_time() {
            Ok(t) => t,
            Err(_) => NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default(),
        };
        Ok(NaiveDateTime::new(date, time))
    }

    pub fn format(&self, value: &NaiveDateTime) -> String {
        value.format(&self.strftime).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        DateFormat {
            pattern: DEFAULT_PATTERN.to_string(),
            strftime: DEFAULT_STRFTIME.to_string(),
        }
    }
}

/// Expand a two-digit year into the hundred-year window that starts
/// `TWO_DIGIT_YEARS_BACK` years before `current_year`.
pub(super) fn two_digit_year(yy: i32, current_year: i32) -> i32 {
    let start = current_year - TWO_DIGIT_YEARS_BACK;
    let candidate = start - start.rem_euclid(100) + yy;
    if candidate < start {
        candidate + 100
    } else {
        candidate
    }
}

fn append_item(out: &mut String, pair: Pair<Rule>) {
    let width = pair.as_str().len();
    match pair.as_rule() {
        Rule::year => out.push_str(if width == 2 { "%y" } else { "%Y" }),
        Rule::month => out.push_str(match width {
            1 => "%-m",
            2 => "%m",
            3 => "%b",
            _ => "%B",
        }),
        Rule::day => out.push_str(if width == 1 { "%-d" } else { "%d" }),
        Rule::hour_of_day => out.push_str(if width == 1 { "%-H" } else { "%H" }),
        Rule::hour_of_half_day => out.push_str(if width == 1 { "%-I" } else { "%I" }),
        Rule::minute => out.push_str(if width == 1 { "%-M" } else { "%M" }),
        Rule::second => out.push_str(if width == 1 { "%-S" } else { "%S" }),
        Rule::millisecond => out.push_str("%3f"),
        Rule::am_pm => out.push_str("%p"),
        Rule::day_of_week => out.push_str(if width <= 3 { "%a" } else { "%A" }),
        Rule::escaped_quote => out.push('\''),
        Rule::quoted_text => push_literal(out, &pair.as_str().replace("''", "'")),
        Rule::literal => push_literal(out, pair.as_str()),
        _ => {}
    }
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}
