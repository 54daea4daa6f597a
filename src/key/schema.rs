//! Key data model.
//!
//! Step identifiers, successor references, the ephemeral records produced by
//! the line parser, and the persisted nodes of a resolved key.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{KeyError, KeyResult};

/// Canonical prime mark used in normalized step ids.
pub const PRIME: char = '\'';

/// Sentinel written for a choice that concludes the key.
pub const END: &str = "END";

/// A normalized step identifier: a base number followed by zero or more
/// canonical prime marks (`2`, `2'`, `2''`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StepId(String);

impl StepId {
    /// Build an id from a raw token, normalizing every prime variant.
    pub fn parse(raw: &str) -> KeyResult<Self> {
        let token = raw.trim().trim_end_matches('.');
        let digits = token.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return Err(KeyError::InvalidStepId(raw.to_string()));
        }

        let (base, marks) = token.split_at(digits);
        let mut id = String::with_capacity(token.len());
        id.push_str(base);
        for c in marks.chars() {
            match prime_weight(c) {
                Some(n) => id.extend(std::iter::repeat(PRIME).take(n)),
                None => return Err(KeyError::InvalidStepId(raw.to_string())),
            }
        }

        Ok(Self(id))
    }

    /// Depth of this step, i.e. its prime-mark count.
    pub fn level(&self) -> u32 {
        self.0.chars().filter(|&c| c == PRIME).count() as u32
    }

    /// The numeric part of the id, without primes.
    pub fn base(&self) -> &str {
        self.0.trim_end_matches(PRIME)
    }

    /// The base as a number, saturating on absurdly long OCR digit runs.
    pub fn number(&self) -> u64 {
        self.base().parse().unwrap_or(u64::MAX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Number of canonical primes a mark stands for, or `None` if `c` is not a
/// prime mark.
pub fn prime_weight(c: char) -> Option<usize> {
    match c {
        '\'' | '\u{2019}' | '\u{2018}' | '\u{00B4}' | '\u{2032}' => Some(1),
        '\u{2033}' => Some(2),
        '\u{2034}' => Some(3),
        _ => None,
    }
}

impl Ord for StepId {
    /// Numeric base first, then depth, then text.
    fn cmp(&self, other: &Self) -> Ordering {
        self.number()
            .cmp(&other.number())
            .then_with(|| self.level().cmp(&other.level()))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for StepId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StepId {
    type Error = KeyError;

    fn try_from(value: String) -> KeyResult<Self> {
        Self::parse(&value)
    }
}

impl From<StepId> for String {
    fn from(id: StepId) -> Self {
        id.0
    }
}

/// Where a choice leads: another step or the end of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Goto {
    End,
    Step(StepId),
}

impl Goto {
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    pub fn step(&self) -> Option<&StepId> {
        match self {
            Self::End => None,
            Self::Step(id) => Some(id),
        }
    }
}

impl fmt::Display for Goto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => f.write_str(END),
            Self::Step(id) => id.fmt(f),
        }
    }
}

impl TryFrom<String> for Goto {
    type Error = KeyError;

    fn try_from(value: String) -> KeyResult<Self> {
        if value.trim().eq_ignore_ascii_case(END) {
            Ok(Self::End)
        } else {
            StepId::parse(&value).map(Self::Step)
        }
    }
}

impl From<Goto> for String {
    fn from(goto: Goto) -> Self {
        goto.to_string()
    }
}

/// One step line as read from OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub id: StepId,
    pub text: String,
    pub goto: Goto,
}

/// A resolved step of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: StepId,

    /// Description shown for this choice
    #[serde(rename = "texte")]
    pub text: String,

    pub goto: Goto,

    /// Enclosing step, `None` for roots
    pub parent: Option<StepId>,

    pub level: u32,
}

impl Node {
    /// Create a node from a parsed record and its resolved parent.
    pub fn from_record(record: StepRecord, parent: Option<StepId>) -> Self {
        let level = record.id.level();
        Self { id: record.id, text: record.text, goto: record.goto, parent, level }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
