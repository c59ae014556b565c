//! Path representation and the dot/bracket path grammar.
//!
//! A path string such as `users[id:7].roles[0]` is tokenized into a sequence
//! of segments: object keys, array indices, and filter selectors that pick
//! the first array element whose field loosely equals a value.

use crate::error::{UndoError, UndoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single segment in a path.
#[derive(Clone, Debug, PartialEq)]
pub enum Seg {
    /// Object key access: `name`
    Key(String),
    /// Array index access: `[index]`
    Index(usize),
    /// Array element selection: `[field:value]`
    Filter {
        /// Field compared on each element.
        field: String,
        /// Scalar the field must loosely equal.
        value: Value,
    },
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Create a filter segment.
    #[inline]
    pub fn filter(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Seg::Filter {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, "{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
            Seg::Filter { field, value } => match value {
                Value::String(s) => write!(f, "[{}:\"{}\"]", field, s),
                other => write!(f, "[{}:{}]", field, other),
            },
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path into a JSON structure.
///
/// On the wire a path is its display string; deserialization goes through
/// [`parse_path`].
///
/// # Examples
///
/// ```
/// use tirea_undo::{parse_path, Path};
///
/// let path = Path::root().key("items").filter("id", 1).key("name");
/// assert_eq!(path.to_string(), "items[id:1].name");
/// assert_eq!(parse_path("items[id:1].name"), path);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Append a filter segment and return self (builder pattern).
    #[inline]
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(Seg::filter(field, value));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first `len` segments as a new path.
    ///
    /// `len` past the end yields the whole path.
    #[inline]
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Get the parent path (path without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.prefix(self.0.len() - 1))
        }
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 && matches!(seg, Seg::Key(_)) {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        parse_path(&s)
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        parse_path(s)
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// # Examples
///
/// ```
/// use tirea_undo::{path, Seg};
///
/// // String literals become Key segments, numbers become Index segments
/// let p = path!("items", 0, "name");
/// assert_eq!(p.to_string(), "items[0].name");
///
/// // Filters are spelled out
/// let p = path!("items", Seg::filter("id", 7), "name");
/// assert_eq!(p.to_string(), "items[id:7].name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}

/// Parse a path string into segments.
///
/// Total: fragments that do not match the grammar are skipped.
///
/// - a run of characters other than `.`, `[` and `]` is a key
/// - `[<digits>]` is an index
/// - `[<word>:<value>]` is a filter; the value becomes a number when it
///   parses as one, loses matching surrounding quotes otherwise
pub fn parse_path(path: &str) -> Path {
    Scanner::new(path)
        .filter_map(|fragment| match fragment {
            Fragment::Seg(seg) => Some(seg),
            Fragment::Separator | Fragment::Malformed { .. } => None,
        })
        .collect()
}

/// Parse a path string, rejecting anything [`parse_path`] would skip.
///
/// # Examples
///
/// ```
/// use tirea_undo::validate_path;
///
/// assert!(validate_path("items[id:1].name").is_ok());
/// assert!(validate_path("items[id].name").is_err());
/// ```
pub fn validate_path(path: &str) -> UndoResult<Path> {
    let mut segments = Vec::new();
    for fragment in Scanner::new(path) {
        match fragment {
            Fragment::Seg(seg) => segments.push(seg),
            Fragment::Separator => {}
            Fragment::Malformed { offset, reason } => {
                return Err(UndoError::invalid_path(path, offset, reason));
            }
        }
    }
    Ok(Path(segments))
}

enum Fragment {
    Seg(Seg),
    Separator,
    Malformed { offset: usize, reason: &'static str },
}

/// Left-to-right tokenizer shared by the lenient and strict parsers.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        let rest = &self.src[self.pos..];
        let offset = self.pos;
        match rest.chars().next()? {
            '.' => {
                self.pos += 1;
                Some(Fragment::Separator)
            }
            ']' => {
                self.pos += 1;
                Some(Fragment::Malformed {
                    offset,
                    reason: "unmatched `]`",
                })
            }
            '[' => match scan_bracket(rest) {
                Some((seg, consumed)) => {
                    self.pos += consumed;
                    Some(Fragment::Seg(seg))
                }
                None => {
                    // Only the bracket itself is dropped; what follows is rescanned.
                    self.pos += 1;
                    Some(Fragment::Malformed {
                        offset,
                        reason: "expected `[<index>]` or `[<field>:<value>]`",
                    })
                }
            },
            _ => {
                let len = rest
                    .find(|c| matches!(c, '.' | '[' | ']'))
                    .unwrap_or(rest.len());
                self.pos += len;
                Some(Fragment::Seg(Seg::Key(rest[..len].to_owned())))
            }
        }
    }
}

/// Match `[<digits>]` or `[<word>:<rest>]` at the start of `rest`.
///
/// Returns the segment and the number of bytes consumed.
fn scan_bracket(rest: &str) -> Option<(Seg, usize)> {
    let inner = &rest[1..];

    let digits = inner.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && inner[digits..].starts_with(']') {
        if let Ok(index) = inner[..digits].parse::<usize>() {
            return Some((Seg::Index(index), digits + 2));
        }
    }

    let word = inner
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if word == 0 || !inner[word..].starts_with(':') {
        return None;
    }
    let after = &inner[word + 1..];
    let end = after.find(']')?;
    if end == 0 {
        return None;
    }
    let seg = Seg::Filter {
        field: inner[..word].to_owned(),
        value: coerce_filter_value(&after[..end]),
    };
    Some((seg, word + end + 3))
}

/// Numeric text becomes a number, quoted text loses its quotes.
fn coerce_filter_value(raw: &str) -> Value {
    if let Some(number) = parse_number(raw) {
        return number;
    }
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::String(raw[1..raw.len() - 1].to_owned());
        }
    }
    Value::String(raw.to_owned())
}

/// Parse text as a finite JSON number, ignoring surrounding whitespace.
pub(crate) fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    let f = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    serde_json::Number::from_f64(f).map(Value::Number)
}
