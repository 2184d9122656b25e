//! Source locations: byte-offset spans, file identifiers, and the map that
//! turns an offset back into a human-readable line/column.

use std::sync::Arc;

/// Identifies one source file handed to the pipeline.
///
/// The core only ever compiles a single file per `compile_and_run` call, but
/// keeping a real `FileId` (rather than assuming "the" file) means
/// diagnostics stay meaningful if a caller ever feeds the pipeline an
/// in-memory fragment with its own synthetic name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// A half-open byte range in some source file, plus the line/column of its
/// start for direct use in diagnostics without re-walking the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
    pub file_id: FileId,
}

impl Span {
    /// A span carrying no real location, used for synthetic nodes (e.g. the
    /// built-in `cout`/`endl` symbols seeded before any source is read).
    pub const DUMMY: Span = Span {
        start: 0,
        end: 0,
        line: 0,
        column: 0,
        file_id: FileId(usize::MAX),
    };

    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file_id: FileId(0),
        }
    }

    pub fn with_file(start: usize, end: usize, line: u32, column: u32, file_id: FileId) -> Self {
        Self {
            start,
            end,
            line,
            column,
            file_id,
        }
    }

    /// A zero-width span at a single position.
    pub fn point(offset: usize, line: u32, column: u32) -> Self {
        Self::new(offset, offset, line, column)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// The smallest span covering both `self` and `other`. Both must belong
    /// to the same file; callers that merge spans across files have a bug.
    pub fn merge(&self, other: &Span) -> Span {
        debug_assert_eq!(self.file_id, other.file_id, "merging spans from different files");
        let (start_span, end_span) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Span {
            start: start_span.start,
            end: other.end.max(self.end),
            line: start_span.line,
            column: start_span.column,
            file_id: self.file_id,
        }
    }
}

/// One source file's text plus precomputed line-start offsets for fast
/// offset-to-line/column lookup.
#[derive(Clone)]
pub struct SourceFile {
    id: FileId,
    name: String,
    content: Arc<str>,
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    pub fn new(id: FileId, name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            id,
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        starts.into()
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 1-based line number containing `offset`.
    pub fn line_at(&self, offset: usize) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }

    /// 1-based column (byte offset within its line, not grapheme-aware) of `offset`.
    pub fn column_at(&self, offset: usize) -> u32 {
        let line = self.line_at(offset) as usize;
        let line_start = self.line_starts[line - 1];
        (offset - line_start) as u32 + 1
    }
}

/// Holds every source file the current `compile_and_run` call is working
/// with. There is exactly one per call; nothing here outlives that call.
#[derive(Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    pub fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.id() == id)
    }

    /// Builds a `Span` for a `start..end` byte range inside `file_id`,
    /// computing line/column from the map's line table.
    pub fn span(&self, file_id: FileId, start: usize, end: usize) -> Span {
        match self.file(file_id) {
            Some(file) => Span::with_file(start, end, file.line_at(start), file.column_at(start), file_id),
            None => Span::with_file(start, end, 0, 0, file_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_track_newlines() {
        let file = SourceFile::new(FileId(0), "t.cpp", "int main() {\n  return 0;\n}\n");
        assert_eq!(file.line_at(0), 1);
        assert_eq!(file.column_at(0), 1);
        let second_line_start = "int main() {\n".len();
        assert_eq!(file.line_at(second_line_start), 2);
        assert_eq!(file.column_at(second_line_start), 1);
    }

    #[test]
    fn merge_produces_smallest_covering_span() {
        let a = Span::new(4, 8, 1, 5);
        let b = Span::new(10, 14, 1, 11);
        let merged = a.merge(&b);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 14);
    }

    #[test]
    fn dummy_span_is_empty() {
        assert!(Span::DUMMY.is_empty());
    }
}
