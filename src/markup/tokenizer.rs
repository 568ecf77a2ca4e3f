//! # Markup Tokenizer
//!
//! A forgiving tokenizer for HTML-ish markup. It never fails: anything that
//! does not look like a tag is text.
//!
//! ## States
//!
//! ```text
//!            '<' letter / "</"            name read
//! Content ─────────────────────► TagName ──────────► Attributes
//!    ▲                                                    │
//!    └──────────────── '>' (TagEnd) or "/>" (EmptyTagEnd) ┘
//! ```
//!
//! `<b class="x">hi</b>` tokenizes as:
//!
//! ```text
//! OpeningTagStart Name("b") Name("class") Atom("x") TagEnd
//! Text("hi")
//! ClosingTagStart Name("b") TagEnd
//! Eof
//! ```

/// Markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<` starting an opening tag
    OpeningTagStart,
    /// `</`
    ClosingTagStart,
    /// `>`
    TagEnd,
    /// `/>`
    EmptyTagEnd,
    /// Tag or attribute name, lower-cased
    Name(String),
    /// Attribute value
    Atom(String),
    /// Character data with entities decoded
    Text(String),
    /// `<!-- ... -->` body
    Comment(String),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Content,
    TagName,
    Attributes,
}

/// Tokenizer over one markup string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            state: State::Content,
            done: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn next_content(&mut self) -> Token {
        let rest = self.rest();
        if let Some(body) = rest.strip_prefix("<!--") {
            let (comment, consumed) = match body.find("-->") {
                Some(end) => (&body[..end], 4 + end + 3),
                None => (body, rest.len()),
            };
            self.pos += consumed;
            return Token::Comment(comment.to_string());
        }
        if let Some(after) = rest.strip_prefix("</")
            && after.starts_with(is_name_start)
        {
            self.pos += 2;
            self.state = State::TagName;
            return Token::ClosingTagStart;
        }
        if let Some(after) = rest.strip_prefix('<')
            && after.starts_with(is_name_start)
        {
            self.pos += 1;
            self.state = State::TagName;
            return Token::OpeningTagStart;
        }

        // Text runs to the next '<' that starts a tag or comment
        let start = self.pos;
        self.bump();
        while let Some(i) = self.rest().find('<') {
            self.pos += i;
            let r = self.rest();
            let starts_markup = r.starts_with("<!--")
                || r[1..].starts_with(is_name_start)
                || (r.starts_with("</") && r[2..].starts_with(is_name_start));
            if starts_markup {
                return Token::Text(decode_entities(&self.input[start..self.pos]));
            }
            self.pos += 1;
        }
        self.pos = self.input.len();
        Token::Text(decode_entities(&self.input[start..]))
    }

    fn next_attribute(&mut self) -> Option<Token> {
        loop {
            self.take_while(char::is_whitespace);
            let rest = self.rest();
            if rest.is_empty() {
                self.state = State::Content;
                return None;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self.state = State::Content;
                return Some(Token::EmptyTagEnd);
            }
            if rest.starts_with('>') {
                self.pos += 1;
                self.state = State::Content;
                return Some(Token::TagEnd);
            }
            if rest.starts_with('=') {
                self.pos += 1;
                self.take_while(char::is_whitespace);
                return Some(Token::Atom(self.attribute_value()));
            }
            if rest.starts_with(is_name_char) {
                let name = self.take_while(is_name_char);
                return Some(Token::Name(name.to_ascii_lowercase()));
            }
            // Stray character inside a tag
            self.bump();
        }
    }

    fn attribute_value(&mut self) -> String {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let value = self.take_while(|c| c != q);
                self.bump();
                decode_entities(value)
            }
            _ => decode_entities(self.take_while(|c| !c.is_whitespace() && c != '>')),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = match self.state {
            State::Content if self.pos >= self.input.len() => None,
            State::Content => Some(self.next_content()),
            State::TagName => {
                let name = self.take_while(is_name_char);
                self.state = State::Attributes;
                Some(Token::Name(name.to_ascii_lowercase()))
            }
            State::Attributes => self.next_attribute(),
        };
        match token {
            Some(t) => Some(t),
            None => {
                self.done = true;
                Some(Token::Eof)
            }
        }
    }
}

/// Tokenize a whole string. The last token is always [`Token::Eof`].
pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).collect()
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | ':')
}

/// Decode the common named entities and numeric references. Unknown
/// entities are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((ch, end + 1))
        });
        match decoded {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for HTML output.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
