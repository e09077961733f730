use crate::cell::Xint;

#[derive(Debug, PartialEq, Clone)]
pub enum Tok {
    EndOfInput,
    Word(String),
    Str(String),
}

impl Tok {
    pub fn text(&self) -> Option<&str> {
        match self {
            Tok::EndOfInput => None,
            Tok::Word(s) | Tok::Str(s) => Some(s.as_str()),
        }
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Tok::Str(_))
    }
}

const STRING_START: &str = ".\"";
const COMMENT_START: &str = "(";
const LINE_COMMENT: &str = "\\";

#[derive(Clone, Debug, Default)]
pub struct Lex {
    buffer: String,
    pos: usize,
}

impl Lex {
    pub fn from_str(s: &str) -> Self {
        Self::from_string(s.to_string())
    }

    pub fn from_string(s: String) -> Self {
        Self { buffer: s, pos: 0 }
    }

    /// Whole line heuristic: the line opens a colon definition.
    pub fn is_definition_start(&self) -> bool {
        self.buffer.trim_start().starts_with(':')
    }

    /// Whole line heuristic: the line closes a colon definition.
    pub fn is_definition_end(&self) -> bool {
        self.buffer.trim_end().ends_with(';')
    }

    fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn take(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespaces(&mut self) -> Option<char> {
        loop {
            let c = self.peek()?;
            if c.is_whitespace() {
                self.take();
            } else {
                break Some(c);
            }
        }
    }

    // the marker must be followed by a whitespace character
    fn at_marker(&self, marker: &str) -> bool {
        let rest = self.rest();
        rest.starts_with(marker)
            && rest[marker.len()..]
                .chars()
                .next()
                .map_or(false, char::is_whitespace)
    }

    // consume everything up to and including the delimiter, returning the text before it
    fn take_until(&mut self, delim: u8) -> &str {
        let start = self.pos;
        match memchr::memchr(delim, self.rest().as_bytes()) {
            Some(n) => {
                self.pos = start + n + 1;
                &self.buffer[start..start + n]
            }
            None => {
                self.pos = self.buffer.len();
                &self.buffer[start..]
            }
        }
    }

    pub fn skip_line(&mut self) {
        self.pos = self.buffer.len();
    }

    fn parse_word(&mut self) -> Tok {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            self.take();
        }
        Tok::Word(self.buffer[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Tok {
        // opening quote and the single separating space
        self.pos += STRING_START.len();
        self.take();
        Tok::Str(self.take_until(b'"').to_string())
    }

    pub fn next(&mut self) -> Tok {
        loop {
            if self.skip_whitespaces().is_none() {
                return Tok::EndOfInput;
            }
            if self.at_marker(STRING_START) {
                return self.parse_string();
            }
            if self.at_marker(COMMENT_START) {
                self.take_until(b')');
                continue;
            }
            if self.at_marker(LINE_COMMENT) {
                self.skip_line();
                return Tok::EndOfInput;
            }
            return self.parse_word();
        }
    }
}

/// Numerals: optional sign, decimal digits or a 0x/0b prefix, `_` separators.
pub fn parse_number(w: &str) -> Option<Xint> {
    let mut it = w.chars();
    let mut x = it.next();
    let mut sign_minus = false;
    if x == Some('+') {
        x = it.next();
    } else if x == Some('-') {
        sign_minus = true;
        x = it.next();
    }
    let mut digits = String::new();
    match x {
        Some(c) if c.is_ascii_digit() => {
            if sign_minus {
                digits.push('-');
            }
            digits.push(c);
        }
        _ => return None,
    }
    let mut radix = 10;
    if x == Some('0') {
        match it.next() {
            Some('x') | Some('X') => {
                radix = 16;
                digits.pop();
            }
            Some('b') | Some('B') => {
                radix = 2;
                digits.pop();
            }
            Some(c) if c.is_ascii_digit() => digits.push(c),
            Some('_') => (),
            None => (),
            _ => return None,
        }
    }
    let mut has_digits = radix == 10;
    for c in it {
        if c == '_' {
            continue;
        }
        if c.is_digit(radix) {
            digits.push(c);
            has_digits = true;
        } else {
            return None;
        }
    }
    if !has_digits {
        return None;
    }
    Xint::from_str_radix(&digits, radix).ok()
}

// tests ---------------------------------------------------------------------

#[cfg(test)]
fn collect_tokens(s: &str) -> Vec<Tok> {
    let mut lex = Lex::from_str(s);
    let mut v = Vec::new();
    loop {
        match lex.next() {
            Tok::EndOfInput => break v,
            tok => v.push(tok),
        }
    }
}

#[cfg(test)]
fn word(s: &str) -> Tok {
    Tok::Word(s.to_string())
}

#[test]
fn test_lex_ws() {
    let mut lex = Lex::from_str("\n\t");
    assert_eq!(Tok::EndOfInput, lex.next());
    assert_eq!(Tok::EndOfInput, lex.next());
    assert_eq!(vec![word("1"), word("21"), word("321")], collect_tokens(" 1 21 321 "));
    assert_eq!(vec![word("100"), word("200")], collect_tokens("100\t200    "));
}

#[test]
fn test_lex_str() {
    assert_eq!(
        vec![word("1"), Tok::Str("hello world".to_string()), word("2")],
        collect_tokens(" 1 .\" hello world\" 2")
    );
    // unterminated string runs to the end of line
    assert_eq!(vec![Tok::Str("abc ".to_string())], collect_tokens(".\" abc "));
    assert_eq!(vec![Tok::Str("".to_string())], collect_tokens(".\" \""));
    // no space after the quote is an ordinary word
    assert_eq!(vec![word(".\"x\"")], collect_tokens(".\"x\""));
    assert!(Lex::from_str(".\" x\"").next().is_string_literal());
    assert_eq!(Some("x"), Lex::from_str(".\" x\"").next().text());
}

#[test]
fn test_lex_comments() {
    assert_eq!(vec![word("1"), word("2")], collect_tokens(" 1 ( this is a comment ) 2 "));
    assert_eq!(Vec::<Tok>::new(), collect_tokens("( this is a comment )"));
    assert_eq!(vec![word("1")], collect_tokens(" 1 \\ this is a comment 2 "));
    assert_eq!(vec![word("a(b")], collect_tokens("a(b"));
    assert_eq!(vec![word("1"), word("2")], collect_tokens("1 ( a ) ( b ) 2"));
    // a bare marker at the end of line is an ordinary word
    assert_eq!(vec![word("1"), word("(")], collect_tokens("1 ("));
    assert_eq!(vec![word(".\"")], collect_tokens(".\""));
    assert_eq!(vec![word("\\")], collect_tokens("\\"));
}

#[test]
fn test_lex_semicolon() {
    assert_eq!(vec![word(":"), word("f"), word("1"), word(";")], collect_tokens(": f 1 ;"));
}

#[test]
fn test_definition_predicates() {
    let lex = Lex::from_str("  : foo 1 2 ;  ");
    assert!(lex.is_definition_start());
    assert!(lex.is_definition_end());
    let lex = Lex::from_str(": foo");
    assert!(lex.is_definition_start());
    assert!(!lex.is_definition_end());
    let lex = Lex::from_str("1 2 + ; 3");
    assert!(!lex.is_definition_start());
    assert!(!lex.is_definition_end());
}

#[test]
fn test_lex_num() {
    assert_eq!(None, parse_number("x1"));
    assert_eq!(None, parse_number("+"));
    assert_eq!(None, parse_number("-"));
    assert_eq!(Some(-1), parse_number("-1"));
    assert_eq!(None, parse_number("-x1"));
    assert_eq!(Some(-1), parse_number("-0x1"));
    assert_eq!(Some(0), parse_number("+0"));
    assert_eq!(Some(3), parse_number("0b11"));
    assert_eq!(Some(0xff00), parse_number("0xff_00"));
    assert_eq!(Some(1000), parse_number("1_000"));
    assert_eq!(None, parse_number("--1"));
    assert_eq!(None, parse_number("1-"));
    assert_eq!(None, parse_number("1+"));
    assert_eq!(None, parse_number("0x"));
    assert_eq!(None, parse_number("0x1x"));
    assert_eq!(Some(7), parse_number("07"));
}
