use std::fmt::Display;

/// Separator between the segments of a dotted path
const PATH_SEPARATOR: char = '.';

/// A simple dotted path such as `member3.sub1` or `member2.0`, used to address nodes relative to
/// some starting point within a document. Each segment names an object member, or indexes into
/// an array when the segment is a plain decimal number and the node reached so far is an array.
/// The empty path addresses the starting node itself
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DottedPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> DottedPath<'a> {
    pub fn parse(path: &'a str) -> Self {
        if path.is_empty() {
            return DottedPath::default();
        }
        DottedPath {
            segments: path.split(PATH_SEPARATOR).collect(),
        }
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split off the final segment, returning it along with the segments leading up to it
    pub fn split_last(&self) -> Option<(&'a str, &[&'a str])> {
        self.segments
            .split_last()
            .map(|(last, parents)| (*last, parents))
    }
}

impl<'a> Display for DottedPath<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Interpret a segment as an array index. Only plain decimal digits qualify
pub(crate) fn as_index(segment: &str) -> Option<usize> {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.parse().ok()
    } else {
        None
    }
}
