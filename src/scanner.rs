//! Character scanner that tracks line and column while reading up to delimiters.

/// Reads text left to right, keeping a 0-based line and column.
///
/// `\n`, `\r\n` and a lone `\r` each count as a single line break.
pub struct Scanner {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    mark: (usize, usize),
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 0,
            column: 0,
            mark: (0, 0),
        }
    }

    pub fn eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// 0-based (line, column) where the last matched delimiter started.
    pub fn mark(&self) -> (usize, usize) {
        self.mark
    }

    fn advance(&mut self) -> Option<char> {
        let c = *self.chars.get(self.index)?;
        self.index += 1;
        let next = self.chars.get(self.index).copied();
        if c == '\n' || (c == '\r' && next != Some('\n')) {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn matches_at(&self, delimiter: &[char]) -> bool {
        if self.index + delimiter.len() > self.chars.len() {
            return false;
        }
        self.chars[self.index..self.index + delimiter.len()]
            .iter()
            .zip(delimiter)
            .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
    }

    /// Appends everything before the next occurrence of `delimiter` to `out`
    /// and consumes the delimiter. The match ignores case.
    ///
    /// Returns `false` when the input ends first; `out` then holds the rest.
    pub fn read_to(&mut self, delimiter: &str, out: &mut String) -> bool {
        let delimiter: Vec<char> = delimiter.chars().collect();
        while !self.eof() {
            if self.matches_at(&delimiter) {
                self.mark = (self.line, self.column);
                for _ in 0..delimiter.len() {
                    self.advance();
                }
                return true;
            }
            if let Some(c) = self.advance() {
                out.push(c);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_to_tracks_mark() {
        let mut scanner = Scanner::new("ab\ncd{{x}}");
        let mut out = String::new();
        assert!(scanner.read_to("{{", &mut out));
        assert_eq!(out, "ab\ncd");
        assert_eq!(scanner.mark(), (1, 2));

        let mut name = String::new();
        assert!(scanner.read_to("}}", &mut name));
        assert_eq!(name, "x");
        assert!(scanner.eof());
    }

    #[test]
    fn test_crlf_is_one_break() {
        let mut scanner = Scanner::new("a\r\nb\rc");
        let mut out = String::new();
        assert!(!scanner.read_to("{{", &mut out));
        assert_eq!(out, "a\r\nb\rc");
        assert_eq!(scanner.line(), 2);
        assert_eq!(scanner.column(), 1);
    }

    #[test]
    fn test_case_insensitive_delimiter() {
        let mut scanner = Scanner::new("helloEND rest");
        let mut out = String::new();
        assert!(scanner.read_to("end", &mut out));
        assert_eq!(out, "hello");
    }
}
