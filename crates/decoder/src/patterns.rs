// crates/decoder/src/patterns.rs
//! The fixed table of label patterns that open a log entry.
//!
//! Every entry in the client log starts with a `[UnityCrossThreadLogger]`
//! prefix followed by one of three label shapes. The JSON payload follows the
//! label either on the same line or on the next one.
//!
//! The patterns are tried in [`LabelPattern::ALL`] order, both when searching
//! the buffer and when re-matching a found label, so the arrow form wins any
//! tie with the plain forms.

use regex_lite::Regex;
use serde::Serialize;
use std::sync::LazyLock;

const ARROW_SOURCE: &str =
    r"\[UnityCrossThreadLogger\](?P<arrow>[<=]=[=>]) (?P<label>[^\r\n]*?) ";

const PLAYER_LINE_SOURCE: &str = r"\[UnityCrossThreadLogger\](?P<timestamp>[^\r\n]*): (?:Match to )?(?P<player_id>\w*)(?: to Match)?: (?P<label>[^\r\n{\[]*)(?:\r\n|\n)*";

const UNHANDLED_GRE_SOURCE: &str =
    r"\[UnityCrossThreadLogger\]Received unhandled GREMessageType: (?P<label>[^\r\n{\[]*)(?:\r\n|\n)*";

/// Discriminator carried by every emitted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A plain label followed by a JSON payload.
    LabelJson,
    /// A directional `==>` / `<==` label followed by a JSON payload.
    LabelArrowJson,
}

/// One row of the pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelPattern {
    /// `[UnityCrossThreadLogger]==> Label {json}`
    Arrow,
    /// `[UnityCrossThreadLogger]<timestamp>: Match to <player>: <label>`
    PlayerLine,
    /// `[UnityCrossThreadLogger]Received unhandled GREMessageType: <label>`
    UnhandledGreMessage,
}

impl LabelPattern {
    /// All patterns in priority order.
    pub const ALL: [LabelPattern; 3] = [
        LabelPattern::Arrow,
        LabelPattern::PlayerLine,
        LabelPattern::UnhandledGreMessage,
    ];

    pub fn source(self) -> &'static str {
        match self {
            LabelPattern::Arrow => ARROW_SOURCE,
            LabelPattern::PlayerLine => PLAYER_LINE_SOURCE,
            LabelPattern::UnhandledGreMessage => UNHANDLED_GRE_SOURCE,
        }
    }

    pub fn kind(self) -> EntryKind {
        match self {
            LabelPattern::Arrow => EntryKind::LabelArrowJson,
            LabelPattern::PlayerLine | LabelPattern::UnhandledGreMessage => EntryKind::LabelJson,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            LabelPattern::Arrow => &ARROW_RE,
            LabelPattern::PlayerLine => &PLAYER_LINE_RE,
            LabelPattern::UnhandledGreMessage => &UNHANDLED_GRE_RE,
        }
    }
}

static ARROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ARROW_SOURCE).expect("arrow label pattern compiles"));

static PLAYER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLAYER_LINE_SOURCE).expect("player label pattern compiles"));

static UNHANDLED_GRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(UNHANDLED_GRE_SOURCE).expect("unhandled GRE label pattern compiles")
});

/// Alternation of every pattern with its named groups stripped, used to find
/// the next candidate label in the buffer.
static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    let group_name = Regex::new(r"\(\?P<\w+>").expect("group name pattern compiles");
    let alternation = LabelPattern::ALL
        .iter()
        .map(|p| format!("(?:{})", group_name.replace_all(p.source(), "(?:")))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("combined label pattern compiles")
});

/// Counts the `\n` escapes that match a line break. Negated classes such as
/// `[^\r\n]` mention `\n` too but never match one, so they are removed first.
static MAX_LINE_SPAN: LazyLock<usize> = LazyLock::new(|| {
    let negated_class = Regex::new(r"\[\^[^\]]*\]").expect("class pattern compiles");
    LabelPattern::ALL
        .iter()
        .map(|p| negated_class.replace_all(p.source(), "").matches(r"\n").count())
        .max()
        .unwrap_or(0)
});

pub(crate) fn search_regex() -> &'static Regex {
    &SEARCH_RE
}

/// Largest number of line breaks any single pattern can span.
///
/// The decoder's fallback trim keeps at least this many trailing lines so a
/// multi-line label is never cut in half.
pub fn max_pattern_line_span() -> usize {
    *MAX_LINE_SPAN
}

/// Named groups recovered from a label, as owned strings.
///
/// A field is `Some` when its group took part in the match, even if it
/// matched the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCaptures {
    pub pattern: LabelPattern,
    pub timestamp: Option<String>,
    pub player_id: Option<String>,
    pub label: Option<String>,
    pub arrow: Option<String>,
}

impl LabelCaptures {
    pub fn kind(&self) -> EntryKind {
        self.pattern.kind()
    }
}

/// Re-match a found label against the table, in priority order.
pub fn rematch(text: &str) -> Option<LabelCaptures> {
    LabelPattern::ALL.iter().find_map(|&pattern| {
        let caps = pattern.regex().captures(text)?;
        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        Some(LabelCaptures {
            pattern,
            timestamp: group("timestamp"),
            player_id: group("player_id"),
            label: group("label"),
            arrow: group("arrow"),
        })
    })
}
