//! Markup scanner – a forgiving tokenizer over signature HTML.
//!
//! This is not a DOM builder. It walks the input once and reports start and
//! end tags with their byte ranges, which is all the inliner needs to find
//! `<svg>` blocks and `<img src>` references without disturbing anything
//! else in the markup. Attribute values are reported raw (entities are left
//! encoded) so callers can match them textually.

use std::ops::Range;

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// An attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    /// Raw value text, without quotes; entities are not decoded.
    pub value: String,
    /// The quote character around the value, if any.
    pub quote: Option<char>,
    /// Byte range of `value` in the scanned input.
    pub value_range: Range<usize>,
}

/// A start tag such as `<img src="a.png" />`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lower-cased element name.
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Byte range from `<` to `>` inclusive.
    pub range: Range<usize>,
    pub self_closing: bool,
}

impl StartTag {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(StartTag),
    EndTag { name: String, range: Range<usize> },
}

/// Tokenize `html` into start and end tags. Text, comments, doctypes and
/// processing instructions are skipped.
pub fn tokenize(html: &str) -> Vec<Token> {
    Scanner::new(html).run()
}

// ---------------------------------------------------------------------------
// Queries used by the inliner
// ---------------------------------------------------------------------------

/// Byte ranges of every outermost `<svg>…</svg>` block, in document order.
///
/// Nested `<svg>` elements belong to their outer block. An unterminated
/// block is not reported.
pub fn svg_blocks(html: &str) -> Vec<Range<usize>> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for token in tokenize(html) {
        match token {
            Token::StartTag(tag) if tag.name == "svg" => {
                if tag.self_closing {
                    if depth == 0 {
                        blocks.push(tag.range);
                    }
                    continue;
                }
                if depth == 0 {
                    start = tag.range.start;
                }
                depth += 1;
            }
            Token::EndTag { name, range } if name == "svg" && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    blocks.push(start..range.end);
                }
            }
            _ => {}
        }
    }
    blocks
}

/// Every `src` attribute on an `<img>` tag, in document order.
pub fn img_sources(html: &str) -> Vec<Attribute> {
    tokenize(html)
        .into_iter()
        .filter_map(|token| match token {
            Token::StartTag(tag) if tag.name == "img" => tag.attr("src").cloned(),
            _ => None,
        })
        .collect()
}

/// Element names of all start tags, in document order.
pub fn element_names(html: &str) -> Vec<String> {
    tokenize(html)
        .into_iter()
        .filter_map(|token| match token {
            Token::StartTag(tag) => Some(tag.name),
            Token::EndTag { .. } => None,
        })
        .collect()
}

/// Decode the handful of entities that appear in attribute values.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while !self.eof() {
            if self.starts_with("<!--") {
                self.skip_past("-->", 4);
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_past(">", 2);
            } else if self.starts_with("</") && self.peek_is_alpha(2) {
                tokens.push(self.parse_end_tag());
            } else if self.starts_with("<") && self.peek_is_alpha(1) {
                tokens.push(Token::StartTag(self.parse_start_tag()));
            } else {
                self.advance_char();
            }
        }
        tokens
    }

    fn parse_start_tag(&mut self) -> StartTag {
        let start = self.pos;
        self.pos += 1; // '<'
        let name = self.parse_name().to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            if self.eof() {
                break;
            }
            if self.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if self.starts_with(">") {
                self.pos += 1;
                break;
            }
            match self.parse_attribute() {
                Some(attr) => attributes.push(attr),
                // Stray character (e.g. a lone '/' or quote); step over it.
                None => self.advance_char(),
            }
        }

        StartTag {
            name,
            attributes,
            range: start..self.pos,
            self_closing,
        }
    }

    fn parse_end_tag(&mut self) -> Token {
        let start = self.pos;
        self.pos += 2; // '</'
        let name = self.parse_name().to_ascii_lowercase();
        self.skip_past(">", 0);
        Token::EndTag {
            name,
            range: start..self.pos,
        }
    }

    fn parse_name(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn parse_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || matches!(c, '=' | '>' | '/' | '"' | '\'') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return None;
        }
        let name = self.input[start..self.pos].to_ascii_lowercase();

        self.skip_whitespace();
        if !self.starts_with("=") {
            let here = self.pos;
            return Some(Attribute {
                name,
                value: String::new(),
                quote: None,
                value_range: here..here,
            });
        }
        self.pos += 1; // '='
        self.skip_whitespace();

        let (value_range, quote) = self.parse_attr_value();
        Some(Attribute {
            name,
            value: self.input[value_range.clone()].to_string(),
            quote,
            value_range,
        })
    }

    fn parse_attr_value(&mut self) -> (Range<usize>, Option<char>) {
        match self.current_char() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while let Some(c) = self.current_char() {
                    if c == q {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
                let range = start..self.pos;
                if !self.eof() {
                    self.pos += 1; // closing quote
                }
                (range, Some(q))
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.current_char() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    if c == '/' && self.input[self.pos..].starts_with("/>") {
                        break;
                    }
                    self.pos += c.len_utf8();
                }
                (start..self.pos, None)
            }
        }
    }

    /// Advance to just after the next `terminator`, starting `skip` bytes
    /// ahead. Runs to EOF if the terminator never appears.
    fn skip_past(&mut self, terminator: &str, skip: usize) {
        let from = (self.pos + skip).min(self.input.len());
        match self.input[from..].find(terminator) {
            Some(i) => self.pos = from + i + terminator.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek_is_alpha(&self, offset: usize) -> bool {
        self.input
            .as_bytes()
            .get(self.pos + offset)
            .is_some_and(u8::is_ascii_alphabetic)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
        }
    }
}
