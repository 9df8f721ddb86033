/// Ordered sequence of logical lines, each a run of UTF-8 bytes.
///
/// Lines are addressed by index only; the buffer never hands out references
/// that outlive a mutation. It always holds at least one line and lines are
/// never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<Vec<u8>>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// A buffer holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![Vec::new()],
        }
    }

    /// Build from string lines (mainly for tests). An empty iterator still
    /// yields one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<Vec<u8>> = lines
            .into_iter()
            .map(|l| l.as_ref().as_bytes().to_vec())
            .collect();
        if lines.is_empty() {
            lines.push(Vec::new());
        }
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, idx: usize) -> Option<&[u8]> {
        self.lines.get(idx).map(Vec::as_slice)
    }

    /// Line at a signed index; negative or past-the-end indices are `None`.
    pub fn line_at(&self, idx: isize) -> Option<&[u8]> {
        usize::try_from(idx).ok().and_then(|i| self.line(i))
    }

    /// Append a new empty line and return its index.
    pub fn push_line(&mut self) -> usize {
        self.lines.push(Vec::new());
        self.lines.len() - 1
    }

    /// Append bytes to line `idx`. Returns `false` if the line does not exist.
    pub fn append(&mut self, idx: usize, bytes: &[u8]) -> bool {
        match self.lines.get_mut(idx) {
            Some(line) => {
                line.extend_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_one_empty_line() {
        let buf = TextBuffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(&b""[..]));
    }

    #[test]
    fn append_addresses_by_index_across_growth() {
        let mut buf = TextBuffer::new();
        buf.append(0, b"hi");
        let second = buf.push_line();
        for _ in 0..64 {
            buf.push_line();
        }
        assert!(buf.append(second, b"hey"));
        assert_eq!(buf.line(0), Some(&b"hi"[..]));
        assert_eq!(buf.line(1), Some(&b"hey"[..]));
        assert_eq!(buf.line_count(), 66);
    }

    #[test]
    fn append_to_missing_line_is_rejected() {
        let mut buf = TextBuffer::new();
        assert!(!buf.append(3, b"x"));
        assert_eq!(buf.line_count(), 1);
    }

    #[test]
    fn signed_line_lookup() {
        let buf = TextBuffer::from_lines(["a", "b"]);
        assert_eq!(buf.line_at(-1), None);
        assert_eq!(buf.line_at(1), Some(&b"b"[..]));
        assert_eq!(buf.line_at(2), None);
    }

    #[test]
    fn from_empty_lines_keeps_one_line() {
        let buf = TextBuffer::from_lines(Vec::<String>::new());
        assert_eq!(buf.line_count(), 1);
    }
}
