//! Rewrites Grafana-style time macros into SLS SQL fragments.
//!
//! Four forms are recognised and expanded in a fixed order:
//!
//! | macro | expansion |
//! |---|---|
//! | `$__time(col)` | `to_unixtime(col) as time` |
//! | `$__timeFilter(col)` | `col >= <from> AND col < <to>` |
//! | `$__timeGroup(col, 'interval'[, fill])` | `time_series(col, 'interval', '%Y-%m-%d %H:%i:%s', <fill>)` |
//! | `$__timeGroupAlias(col, 'interval')` | `time_series(col, 'interval', '%Y-%m-%d %H:%i:%s', '0') as time` |
//!
//! Anything that does not match one of these shapes is copied through as-is.

use crate::time::TimeRange;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, trace};

const MACRO_PREFIX: &str = "$__";
const TIME_SERIES_FORMAT: &str = "'%Y-%m-%d %H:%i:%s'";

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$__time\(([^)]+)\)").unwrap());

static TIME_FILTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$__timeFilter\(([^)]+)\)").unwrap());

// Separators accept only `[\t\n\f\r ]`, never vertical tab or Unicode spaces.
static TIME_GROUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$__timeGroup\([\t\n\f\r ]*([^,]+)[\t\n\f\r ]*,[\t\n\f\r ]*'([^']+)'(?:[\t\n\f\r ]*,[\t\n\f\r ]*([^)]+))?[\t\n\f\r ]*\)",
    )
    .unwrap()
});

static TIME_GROUP_ALIAS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$__timeGroupAlias\([\t\n\f\r ]*([^,]+)[\t\n\f\r ]*,[\t\n\f\r ]*'([^']+)'[\t\n\f\r ]*\)")
        .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    Time,
    TimeFilter,
    TimeGroup,
    TimeGroupAlias,
}

impl Macro {
    /// Application order. Later passes see the output of earlier ones.
    pub const ALL: [Macro; 4] = [
        Macro::Time,
        Macro::TimeFilter,
        Macro::TimeGroup,
        Macro::TimeGroupAlias,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Macro::Time => "$__time",
            Macro::TimeFilter => "$__timeFilter",
            Macro::TimeGroup => "$__timeGroup",
            Macro::TimeGroupAlias => "$__timeGroupAlias",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Macro::Time => &*TIME_RE,
            Macro::TimeFilter => &*TIME_FILTER_RE,
            Macro::TimeGroup => &*TIME_GROUP_RE,
            Macro::TimeGroupAlias => &*TIME_GROUP_ALIAS_RE,
        }
    }
}

/// Padding used by `time_series` for empty buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillStrategy {
    Zero,
    Null,
    /// Carry the previous bucket forward (`'last'` in SLS).
    Previous,
    /// Caller-supplied text, quoted as-is. Already-quoted input ends up
    /// double quoted.
    Literal(String),
}

impl FillStrategy {
    pub fn from_arg(arg: Option<&str>) -> Self {
        let Some(raw) = arg else {
            return FillStrategy::Zero;
        };

        let value = raw.trim();
        if value == "0" {
            FillStrategy::Zero
        } else if value.eq_ignore_ascii_case("null") {
            FillStrategy::Null
        } else if value.eq_ignore_ascii_case("previous") {
            FillStrategy::Previous
        } else {
            FillStrategy::Literal(value.to_string())
        }
    }

    pub fn as_literal(&self) -> String {
        match self {
            FillStrategy::Zero => "'0'".to_string(),
            FillStrategy::Null => "'null'".to_string(),
            FillStrategy::Previous => "'last'".to_string(),
            FillStrategy::Literal(value) => format!("'{value}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroCount {
    #[serde(rename = "macro")]
    pub kind: Macro,
    pub count: usize,
}

/// Result of a single interpolation along with how many invocations of each
/// macro were rewritten. Macros with no rewrites are omitted from `counts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub sql: String,
    pub counts: Vec<MacroCount>,
}

impl Expansion {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroInterpolator {
    range: TimeRange,
}

impl MacroInterpolator {
    pub fn new(range: TimeRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn interpolate(&self, query: &str) -> String {
        self.interpolate_with_report(query).sql
    }

    pub fn interpolate_with_report(&self, query: &str) -> Expansion {
        if !query.contains(MACRO_PREFIX) {
            return Expansion {
                sql: query.to_string(),
                counts: Vec::new(),
            };
        }

        let mut sql = query.to_string();
        let mut counts = Vec::new();

        for kind in Macro::ALL {
            let mut count = 0usize;
            let replaced = kind
                .pattern()
                .replace_all(&sql, |caps: &Captures<'_>| {
                    count += 1;
                    let expanded = self.expand(kind, caps);
                    trace!(macro_name = kind.name(), matched = &caps[0], %expanded, "expanded macro");
                    expanded
                })
                .into_owned();

            if count > 0 {
                sql = replaced;
                counts.push(MacroCount { kind, count });
            }
        }

        debug!(
            from = self.range.from,
            to = self.range.to,
            expanded = counts.iter().map(|entry| entry.count).sum::<usize>(),
            "interpolated query macros"
        );

        Expansion { sql, counts }
    }

    fn expand(&self, kind: Macro, caps: &Captures<'_>) -> String {
        match kind {
            Macro::Time => format!("to_unixtime({}) as time", &caps[1]),
            Macro::TimeFilter => {
                let column = &caps[1];
                format!(
                    "{column} >= {} AND {column} < {}",
                    self.range.from, self.range.to
                )
            }
            Macro::TimeGroup => {
                let column = caps[1].trim();
                let interval = &caps[2];
                let fill = FillStrategy::from_arg(caps.get(3).map(|m| m.as_str()));
                format!(
                    "time_series({column}, '{interval}', {TIME_SERIES_FORMAT}, {})",
                    fill.as_literal()
                )
            }
            Macro::TimeGroupAlias => {
                let column = caps[1].trim();
                let interval = &caps[2];
                format!("time_series({column}, '{interval}', {TIME_SERIES_FORMAT}, '0') as time")
            }
        }
    }
}

/// Expands every recognised macro in `query` against the `[from, to)` range
/// given in epoch seconds.
pub fn interpolate(query: &str, from: i64, to: i64) -> String {
    MacroInterpolator::new(TimeRange::new(from, to)).interpolate(query)
}
