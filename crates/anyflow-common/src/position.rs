//! Byte offset to line/column conversion for rendered diagnostics.

/// Zero-based line and column. Columns count characters, not bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Starting offset of every line of a source text.
#[derive(Clone, Debug)]
pub struct LineMap {
    /// `line_starts[0]` is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map. `\n`, `\r\n` and a lone `\r` all end a line.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        let bytes = source.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => line_starts.push((i + 1) as u32),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => line_starts.push((i + 1) as u32),
                _ => {}
            }
        }
        LineMap { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where zero-based `line` starts.
    pub fn line_start(&self, line: u32) -> Option<u32> {
        self.line_starts.get(line as usize).copied()
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to
    /// the end of the text; an offset inside a multi-byte character counts
    /// the characters before it.
    pub fn position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let start = line_start.min(end);
        let column = source
            .get(start..)
            .map(|rest| rest.char_indices().take_while(|(i, _)| start + i < end).count())
            .unwrap_or(0);
        Position {
            line: line as u32,
            column: column as u32,
        }
    }

    /// Text of zero-based `line`, without its line terminator.
    pub fn line_text<'s>(&self, line: u32, source: &'s str) -> Option<&'s str> {
        let start = self.line_start(line)? as usize;
        let end = self
            .line_start(line + 1)
            .map(|next| next as usize)
            .unwrap_or(source.len());
        let text = source.get(start..end)?;
        Some(text.trim_end_matches(['\n', '\r']))
    }
}

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod tests;
