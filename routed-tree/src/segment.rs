//! Path segments: the individual steps of a route.

use core::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

/// A single step in a path through tree content.
///
/// Paths address map entries by name and sequence elements by position, so a
/// segment is either a string key or a non-negative index. `/`-delimited path
/// strings normalize digit-only pieces to [`Segment::Index`] on both the
/// registration and the lookup side, so `items/0` addresses the same slot no
/// matter which side wrote it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// A map key.
    Key(SmolStr),
    /// A sequence index.
    Index(usize),
}

impl Segment {
    /// Parse one path piece: digit-only text becomes an index, everything
    /// else a key.
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = text.parse::<usize>() {
                return Segment::Index(i);
            }
        }
        Segment::Key(SmolStr::new(text))
    }

    /// Split a `/`-delimited path into segments. Empty pieces (leading,
    /// trailing, or doubled separators) are skipped.
    pub fn parse_path(path: &str) -> Vec<Segment> {
        path.split('/')
            .filter(|piece| !piece.is_empty())
            .map(Segment::parse)
            .collect()
    }

    /// The sequence position this segment addresses, if any. Digit-only keys
    /// coerce, matching how sequence content is indexed.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(i) => Some(*i),
            Segment::Key(k) => k.parse::<usize>().ok(),
        }
    }

    /// The key text of this segment. Indices render in decimal, matching how
    /// map content stores numeric-looking keys.
    pub fn as_text(&self) -> SmolStr {
        match self {
            Segment::Key(k) => k.clone(),
            Segment::Index(i) => SmolStr::new(i.to_string()),
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(k) => f.write_str(k),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Segment::parse(text)
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Segment::parse(&text)
    }
}

impl From<&SmolStr> for Segment {
    fn from(text: &SmolStr) -> Self {
        Segment::parse(text)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Render a segment slice as a `/`-joined path, for diagnostics.
pub(crate) fn join(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(&seg.to_string());
    }
    out
}
