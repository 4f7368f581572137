//! Line reader.
//!
//! Splits Tern source into significant lines. Comments and trailing
//! whitespace are stripped; blank and comment-only lines are skipped but
//! still counted, so line numbers always refer to the physical source.

/// Columns a tab character contributes to indentation.
pub const TAB_WIDTH: usize = 4;

/// A significant source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based physical line number.
    pub number: usize,
    /// Indentation width in columns.
    pub indent: usize,
    /// Line text without indentation, comment, or trailing whitespace.
    pub text: &'a str,
}

/// Source text to be read line by line.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    text: &'a str,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Iterate over significant lines. Each call starts from the top.
    pub fn lines(&self) -> Lines<'a> {
        Lines {
            inner: self.text.lines().enumerate(),
        }
    }
}

/// Iterator over the significant lines of a [`Source`].
pub struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, raw) = self.inner.next()?;
            if let Some(line) = significant(index + 1, raw) {
                return Some(line);
            }
        }
    }
}

fn significant(number: usize, raw: &str) -> Option<Line<'_>> {
    let code = strip_comment(raw).trim_end();
    let text = code.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(Line {
        number,
        indent: indentation(code),
        text,
    })
}

/// Cut a line at the first `#` that is not inside a string or character
/// literal.
pub fn strip_comment(raw: &str) -> &str {
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in raw.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return &raw[..i],
            None => {}
        }
    }
    raw
}

/// Width of the leading whitespace of a line.
pub fn indentation(raw: &str) -> usize {
    raw.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}
