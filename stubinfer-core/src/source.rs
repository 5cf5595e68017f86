use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u32);

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: SourceId,
    pub path: PathBuf,
    pub contents: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(id: SourceId, path: PathBuf, contents: String) -> Self {
        let line_starts = compute_line_starts(&contents);
        Self {
            id,
            path,
            contents,
            line_starts,
        }
    }

    /// 1-based line and byte column for `offset`.
    pub fn line_column(&self, offset: usize) -> Option<(usize, usize)> {
        if offset > self.contents.len() {
            return None;
        }
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_index).copied().unwrap_or(0);
        Some((line_index + 1, offset - line_start + 1))
    }

    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let line_start = *self.line_starts.get(line - 1)?;
        let line_end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.contents.len() + 1);
        let offset = line_start.checked_add(column - 1)?;
        if offset >= line_end {
            return None;
        }
        Some(offset)
    }
}

fn compute_line_starts(contents: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        contents
            .bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(index, _)| index + 1),
    );
    starts
}

/// The files a type-checked program was built from.
///
/// Handed through inference untouched so a consumer can turn byte offsets
/// back into editor positions.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    pub fn add<P: Into<PathBuf>>(&mut self, path: P, contents: String) -> SourceId {
        let id = SourceId(self.files.len() as u32);
        self.files.push(SourceFile::new(id, path.into(), contents));
        id
    }

    pub fn file(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn line_column(&self, id: SourceId, offset: usize) -> Option<(usize, usize)> {
        self.file(id)?.line_column(offset)
    }

    pub fn offset(&self, id: SourceId, line: usize, column: usize) -> Option<usize> {
        self.file(id)?.offset(line, column)
    }
}
