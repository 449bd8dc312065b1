//! Bundle source formats.
//!
//! Two encodings deserialize to a [`RawBundle`]:
//!
//! - JSON: `{"START": "Démarrer", "NAME_MASK": "Nom : {0}"}`
//! - NLS literal, the console's native resource file form:
//!
//! ```text
//! ({
//!     // Controls
//!     START: "Démarrer",
//!     NAME_MASK: "Nom : {0}"
//! })
//! ```

use crate::bundle::RawBundle;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleParseError {
    #[error("Invalid JSON bundle: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid NLS bundle at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: String },
    #[error("Bundle key '{0}' is defined more than once")]
    DuplicateKey(String),
    #[error("Bundle keys must not be empty")]
    EmptyKey,
}

/// Encoding of a bundle file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BundleFormat {
    Json,
    NlsLiteral,
}

impl BundleFormat {
    /// File extensions probed by file-based loaders, in priority order.
    pub const EXTENSIONS: [&'static str; 2] = ["json", "js"];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "js" | "nls" => Some(Self::NlsLiteral),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::NlsLiteral => "js",
        }
    }

    pub fn parse(self, text: &str) -> Result<RawBundle, BundleParseError> {
        match self {
            Self::Json => parse_json(text),
            Self::NlsLiteral => parse_nls_literal(text),
        }
    }
}

pub fn parse_json(text: &str) -> Result<RawBundle, BundleParseError> {
    let JsonEntries(entries) = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;

    let mut bundle = RawBundle::with_capacity(entries.len());
    for (key, value) in entries {
        if bundle.contains_key(&key) {
            return Err(BundleParseError::DuplicateKey(key));
        }
        bundle.insert(key, value);
    }
    Ok(bundle)
}

/// Object members in source order, duplicates included.
struct JsonEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for JsonEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = JsonEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(JsonEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

pub fn parse_nls_literal(text: &str) -> Result<RawBundle, BundleParseError> {
    let mut cursor = Cursor::new(text.trim_start_matches('\u{feff}'));
    let mut bundle = RawBundle::new();

    cursor.skip_trivia()?;
    let wrapped = cursor.eat('(');
    cursor.skip_trivia()?;
    cursor.expect('{')?;

    loop {
        cursor.skip_trivia()?;
        if cursor.eat('}') {
            break;
        }

        let key = cursor.key()?;
        if key.is_empty() {
            return Err(BundleParseError::EmptyKey);
        }
        cursor.skip_trivia()?;
        cursor.expect(':')?;
        cursor.skip_trivia()?;
        let value = cursor.string()?;

        if bundle.contains_key(&key) {
            return Err(BundleParseError::DuplicateKey(key));
        }
        bundle.insert(key, value);

        cursor.skip_trivia()?;
        if cursor.eat(',') {
            continue;
        }
        cursor.expect('}')?;
        break;
    }

    cursor.skip_trivia()?;
    if wrapped {
        cursor.expect(')')?;
        cursor.skip_trivia()?;
    }
    if cursor.eat(';') {
        cursor.skip_trivia()?;
    }
    if !cursor.at_end() {
        return Err(cursor.error("unexpected content after bundle"));
    }

    Ok(bundle)
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), BundleParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, reason: impl Into<String>) -> BundleParseError {
        BundleParseError::Syntax {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    /// Skips whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<(), BundleParseError> {
        loop {
            let rest = &self.src[self.pos..];
            if let Some(ch) = rest.chars().next().filter(|ch| ch.is_whitespace()) {
                self.pos += ch.len_utf8();
            } else if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let end = rest[2..]
                    .find("*/")
                    .ok_or_else(|| self.error("unterminated block comment"))?;
                self.pos += end + 4;
            } else {
                return Ok(());
            }
        }
    }

    fn key(&mut self) -> Result<String, BundleParseError> {
        match self.peek() {
            Some('"' | '\'') => self.string(),
            Some(ch) if is_ident_char(ch) => {
                let start = self.pos;
                while self.peek().is_some_and(is_ident_char) {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            },
            _ => Err(self.error("expected a key")),
        }
    }

    fn string(&mut self) -> Result<String, BundleParseError> {
        let quote = match self.peek() {
            Some(quote @ ('"' | '\'')) => quote,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.bump();

        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some(ch) if ch == quote => return Ok(value),
                Some('\\') => self.escape(&mut value)?,
                Some(ch) => value.push(ch),
            }
        }
    }

    fn escape(&mut self, value: &mut String) -> Result<(), BundleParseError> {
        let ch = match self.bump() {
            None => return Err(self.error("unterminated escape")),
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            // line continuation
            Some('\n') => return Ok(()),
            Some('u') => self.unicode_escape()?,
            Some(other) => other,
        };
        value.push(ch);
        Ok(())
    }

    fn unicode_escape(&mut self) -> Result<char, BundleParseError> {
        let first = self.hex4()?;
        if !(0xD800..0xDC00).contains(&first) {
            return char::from_u32(first).ok_or_else(|| self.error("invalid unicode escape"));
        }

        // high surrogate, a `\uDC00`..`\uDFFF` low half must follow
        if !(self.eat('\\') && self.eat('u')) {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        let second = self.hex4()?;
        if !(0xDC00..0xE000).contains(&second) {
            return Err(self.error("unpaired surrogate in unicode escape"));
        }
        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        char::from_u32(combined).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn hex4(&mut self) -> Result<u32, BundleParseError> {
        let digits = self
            .src
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("expected four hex digits"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("expected four hex digits"))?;
        self.pos += 4;
        Ok(code)
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}
