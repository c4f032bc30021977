//! Source text and spans over it.
//!
//! A [`Source`] owns the raw text of one document. Every token and AST node
//! points back into it through a [`Location`], a half-open byte range that
//! knows how to render itself as `line:column` for diagnostics.

use std::fmt;
use std::sync::Arc;

/// Raw text of a document plus an optional origin (path or URL).
pub struct Source {
    text: String,
    origin: Option<String>,
    /// Byte offset of the first character of every line.
    line_starts: Vec<usize>,
}

impl Source {
    /// Create a new shared source.
    pub fn new(text: impl Into<String>, origin: Option<String>) -> Arc<Self> {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Arc::new(Self {
            text,
            origin,
            line_starts,
        })
    }

    /// Shorthand for a source with no origin.
    pub fn anonymous(text: impl Into<String>) -> Arc<Self> {
        Self::new(text, None)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Convert a byte offset into a 1-based `(line, column)` pair.
    ///
    /// Columns count characters, not bytes. Offsets past the end are clamped.
    pub fn linecol(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= pos) - 1;
        let start = self.line_starts[line];
        let column = self.text[start..pos].chars().count() + 1;
        (line + 1, column)
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("origin", &self.origin)
            .field("len", &self.text.len())
            .finish()
    }
}

/// A half-open byte span `[start, end)` over a [`Source`].
#[derive(Clone)]
pub struct Location {
    source: Arc<Source>,
    start: usize,
    end: usize,
}

impl Location {
    pub fn new(source: &Arc<Source>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted span {start}..{end}");
        debug_assert!(end <= source.len(), "span {start}..{end} past end of source");
        Self {
            source: Arc::clone(source),
            start,
            end: end.max(start),
        }
    }

    /// Smallest span covering every given non-empty location.
    ///
    /// Zero-width locations (synthetic tokens, voids) do not stretch the
    /// result; when every location is empty the first one is returned.
    /// Returns `None` when the iterator is empty. All locations must point
    /// into the same source.
    pub fn merge<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Option<Location> {
        let mut locations = locations.into_iter();
        let first = locations.next()?;
        let mut merged: Option<Location> = (!first.is_empty()).then(|| first.clone());
        for loc in locations.filter(|loc| !loc.is_empty()) {
            debug_assert!(
                Arc::ptr_eq(&first.source, &loc.source),
                "merging locations from different sources"
            );
            merged = Some(match merged {
                Some(m) => m.with_span(m.start.min(loc.start), m.end.max(loc.end)),
                None => loc.clone(),
            });
        }
        Some(merged.unwrap_or_else(|| first.clone()))
    }

    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The excerpt of source text this location covers.
    pub fn text(&self) -> &str {
        &self.source.text()[self.start..self.end]
    }

    /// Zero-width location at the start of this one.
    pub fn at_start(&self) -> Location {
        Location::new(&self.source, self.start, self.start)
    }

    /// Zero-width location at the end of this one.
    pub fn at_end(&self) -> Location {
        Location::new(&self.source, self.end, self.end)
    }

    /// A copy of this location with a different extent in the same source.
    pub fn with_span(&self, start: usize, end: usize) -> Location {
        Location::new(&self.source, start, end)
    }

    /// Line/column of the first character and, unless the span is empty,
    /// of the last one (inclusive).
    pub fn linecol(&self) -> ((usize, usize), Option<(usize, usize)>) {
        let first = self.source.linecol(self.start);
        let last = self.text()
            .char_indices()
            .last()
            .map(|(i, _)| self.source.linecol(self.start + i));
        (first, last)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
            && self.start == other.start
            && self.end == other.end
    }
}

impl Eq for Location {}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = self.source.origin() {
            write!(f, "{origin}:")?;
        }
        match self.linecol() {
            ((l1, c1), None) => write!(f, "{l1}:{c1}<"),
            ((l1, c1), Some((l2, c2))) if l1 == l2 && c1 == c2 => write!(f, "{l1}:{c1}"),
            ((l1, c1), Some((l2, c2))) if l1 == l2 => write!(f, "{l1}:{c1}-{c2}"),
            ((l1, c1), Some((l2, c2))) => write!(f, "{l1}:{c1}-{l2}:{c2}"),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({}..{} @ {self})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Source
    // =========================================================================

    #[test]
    fn test_linecol_first_line() {
        let src = Source::anonymous("abc\ndef");
        assert_eq!(src.linecol(0), (1, 1));
        assert_eq!(src.linecol(2), (1, 3));
    }

    #[test]
    fn test_linecol_after_newline() {
        let src = Source::anonymous("abc\ndef\n");
        assert_eq!(src.linecol(3), (1, 4));
        assert_eq!(src.linecol(4), (2, 1));
        assert_eq!(src.linecol(8), (3, 1));
    }

    #[test]
    fn test_linecol_counts_characters() {
        let src = Source::anonymous("é=x");
        assert_eq!(src.linecol(2), (1, 2));
    }

    // =========================================================================
    // Location
    // =========================================================================

    #[test]
    fn test_text_excerpt() {
        let src = Source::anonymous("hello world");
        assert_eq!(Location::new(&src, 6, 11).text(), "world");
    }

    #[test]
    fn test_merge_covers_all() {
        let src = Source::anonymous("a b c d");
        let a = Location::new(&src, 2, 3);
        let b = Location::new(&src, 6, 7);
        let z = Location::new(&src, 4, 4);
        let merged = Location::merge([&b, &z, &a]).unwrap();
        assert_eq!((merged.start(), merged.end()), (2, 7));
        assert_eq!(merged.text(), "b c d");
    }

    #[test]
    fn test_merge_ignores_empty_spans() {
        let src = Source::anonymous("a b c d e f");
        let a = Location::new(&src, 2, 3);
        let far = Location::new(&src, 10, 10);
        let before = Location::new(&src, 0, 0);
        assert_eq!(Location::merge([&a, &far]).unwrap(), a);
        assert_eq!(Location::merge([&before, &a, &far]).unwrap(), a);
    }

    #[test]
    fn test_merge_all_empty_keeps_first() {
        let src = Source::anonymous("a b c");
        let first = Location::new(&src, 1, 1);
        let second = Location::new(&src, 4, 4);
        assert_eq!(Location::merge([&first, &second]).unwrap(), first);
    }

    #[test]
    fn test_zero_width_edges() {
        let src = Source::anonymous("a bc d");
        let loc = Location::new(&src, 2, 4);
        assert_eq!(loc.at_start(), loc.with_span(2, 2));
        assert_eq!(loc.at_end(), loc.with_span(4, 4));
        assert!(loc.at_end().is_empty());
        assert_eq!(loc.len(), 2);
    }

    #[test]
    fn test_merge_empty() {
        assert!(Location::merge(std::iter::empty()).is_none());
    }

    #[test]
    fn test_display_single_char() {
        let src = Source::anonymous("ab\ncd");
        assert_eq!(Location::new(&src, 3, 4).to_string(), "2:1");
    }

    #[test]
    fn test_display_same_line() {
        let src = Source::anonymous("ab\ncdef");
        assert_eq!(Location::new(&src, 4, 7).to_string(), "2:2-4");
    }

    #[test]
    fn test_display_multi_line() {
        let src = Source::anonymous("ab\ncd");
        assert_eq!(Location::new(&src, 1, 4).to_string(), "1:2-2:1");
    }

    #[test]
    fn test_display_zero_width() {
        let src = Source::anonymous("ab");
        assert_eq!(Location::new(&src, 1, 1).to_string(), "1:2<");
    }

    #[test]
    fn test_display_with_origin() {
        let src = Source::new("ab", Some("doc.q".into()));
        assert_eq!(Location::new(&src, 0, 2).to_string(), "doc.q:1:1-2");
    }

    #[test]
    fn test_equality_requires_same_source() {
        let a = Source::anonymous("ab");
        let b = Source::anonymous("ab");
        assert_eq!(Location::new(&a, 0, 1), Location::new(&a, 0, 1));
        assert!(Location::new(&a, 0, 1) != Location::new(&b, 0, 1));
    }
}
