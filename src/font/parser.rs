//! Font config parser
//!
//! Reads the object notation used by the game's font configs:
//!
//! ```text
//! {
//!   kerning: 1,
//!   id: "dialog",
//!   texture: "gui/dialog_font.png",
//!   pad: 0,
//!   chars: [
//!     { chars: "a", rect: [0,0,6,19] },
//!     { chars: "bc", width: 6 },   # comments run to end of line
//!   ],
//! }
//! ```
//!
//! Keys may be bare identifiers or quoted strings, strings may use either
//! quote character, and trailing commas are allowed. Keys the wrapper has
//! no use for are parsed and discarded. Any error aborts the whole parse.

use std::iter::Peekable;
use std::str::Chars;

use crate::constants::{DEFAULT_KERNING, DEFAULT_PADDING};
use crate::error::ParseError;

use super::metrics::{FontConfig, GlyphGroup};

/// Parse a font config document
pub fn parse(text: &str) -> Result<FontConfig, ParseError> {
    let mut parser = Parser::new(text);
    let font = parser.font()?;
    let tail = parser.next()?;
    match &tail.kind {
        TokenKind::Eof => Ok(font),
        other => Err(tail.error(format!("unexpected {} after font object", other.describe()))),
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Eof,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::LBracket => "'['".into(),
            Self::RBracket => "']'".into(),
            Self::Colon => "':'".into(),
            Self::Comma => "','".into(),
            Self::Ident(name) => format!("identifier '{}'", name),
            Self::Str(_) => "string".into(),
            Self::Int(n) => format!("integer {}", n),
            Self::Float(n) => format!("number {}", n),
            Self::Eof => "end of input".into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
}

impl Token {
    fn error(&self, reason: impl Into<String>) -> ParseError {
        ParseError::new(reason, self.line, self.column)
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == '#' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if ch.is_whitespace() || ch == '\u{feff}' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let token = |kind| Token { kind, line, column };

        let Some(ch) = self.bump() else {
            return Ok(token(TokenKind::Eof));
        };
        let kind = match ch {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '"' | '\'' => TokenKind::Str(self.string(ch, line, column)?),
            '-' | '0'..='9' => self.number(ch, line, column)?,
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&c) = self.chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        name.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(name)
            }
            other => {
                return Err(ParseError::new(
                    format!("unexpected character {:?}", other),
                    line,
                    column,
                ))
            }
        };
        Ok(token(kind))
    }

    fn string(&mut self, quote: char, line: usize, column: usize) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::new("unterminated string", line, column)),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(c) => value.push(c),
                    None => return Err(ParseError::new("unterminated string", line, column)),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn number(&mut self, first: char, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        let mut digits = String::from(first);
        let mut is_float = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
            } else if c == '.' && !is_float {
                is_float = true;
                digits.push(c);
            } else {
                break;
            }
            self.bump();
        }
        let invalid = || ParseError::new(format!("invalid number '{}'", digits), line, column);
        if is_float {
            digits.parse().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            digits.parse().map(TokenKind::Int).map_err(|_| invalid())
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lexer: Lexer::new(text),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&Token, ParseError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        Ok(self.peeked.insert(token))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(token.error(format!(
                "expected {}, found {}",
                kind.describe(),
                token.kind.describe()
            )))
        }
    }

    /// Walk `{ key: value, ... }`, handing each key to `field`.
    /// Returns the closing brace token for error locations.
    fn object<F>(&mut self, mut field: F) -> Result<Token, ParseError>
    where
        F: FnMut(&mut Self, Token, String) -> Result<(), ParseError>,
    {
        self.expect(TokenKind::LBrace)?;
        loop {
            let token = self.next()?;
            let key = match &token.kind {
                TokenKind::RBrace => return Ok(token),
                TokenKind::Ident(name) | TokenKind::Str(name) => name.clone(),
                other => {
                    return Err(token.error(format!("expected key, found {}", other.describe())))
                }
            };
            self.expect(TokenKind::Colon)?;
            field(self, token, key)?;

            let sep = self.next()?;
            match &sep.kind {
                TokenKind::Comma => {}
                TokenKind::RBrace => return Ok(sep),
                other => {
                    return Err(sep.error(format!("expected ',' or '}}', found {}", other.describe())))
                }
            }
        }
    }

    /// Walk `[ item, ... ]`, calling `item` with the parser positioned at each element
    fn list<F>(&mut self, mut item: F) -> Result<Token, ParseError>
    where
        F: FnMut(&mut Self) -> Result<(), ParseError>,
    {
        self.expect(TokenKind::LBracket)?;
        loop {
            if self.peek()?.kind == TokenKind::RBracket {
                return self.next();
            }
            item(self)?;
            let sep = self.next()?;
            match &sep.kind {
                TokenKind::Comma => {}
                TokenKind::RBracket => return Ok(sep),
                other => {
                    return Err(sep.error(format!("expected ',' or ']', found {}", other.describe())))
                }
            }
        }
    }

    fn skip_value(&mut self) -> Result<(), ParseError> {
        match self.peek()?.kind {
            TokenKind::LBrace => self.object(|p, _, _| p.skip_value()).map(|_| ()),
            TokenKind::LBracket => self.list(|p| p.skip_value()).map(|_| ()),
            _ => {
                let token = self.next()?;
                match &token.kind {
                    TokenKind::Ident(_)
                    | TokenKind::Str(_)
                    | TokenKind::Int(_)
                    | TokenKind::Float(_) => Ok(()),
                    other => Err(token.error(format!("expected value, found {}", other.describe()))),
                }
            }
        }
    }

    fn int(&mut self) -> Result<i32, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Int(n) => {
                i32::try_from(n).map_err(|_| token.error(format!("integer {} out of range", n)))
            }
            ref other => Err(token.error(format!("expected integer, found {}", other.describe()))),
        }
    }

    fn string(&mut self) -> Result<String, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Str(s) => Ok(s),
            ref other => Err(token.error(format!("expected string, found {}", other.describe()))),
        }
    }

    fn font(&mut self) -> Result<FontConfig, ParseError> {
        let mut kerning = None;
        let mut id = None;
        let mut texture = None;
        let mut padding = None;
        let mut groups = None;

        let close = self.object(|p, key_token, key| {
            match key.as_str() {
                "kerning" => set_once(&mut kerning, p.int()?, &key_token, &key),
                "id" => set_once(&mut id, p.string()?, &key_token, &key),
                "texture" => set_once(&mut texture, p.string()?, &key_token, &key),
                "pad" => set_once(&mut padding, p.int()?, &key_token, &key),
                "chars" => {
                    let mut list = Vec::new();
                    p.list(|p| {
                        list.push(p.group()?);
                        Ok(())
                    })?;
                    set_once(&mut groups, list, &key_token, &key)
                }
                _ => p.skip_value(),
            }
        })?;

        Ok(FontConfig {
            kerning: kerning.unwrap_or(DEFAULT_KERNING),
            id: id.ok_or_else(|| close.error("font is missing required field 'id'"))?,
            texture: texture.ok_or_else(|| close.error("font is missing required field 'texture'"))?,
            padding: padding.unwrap_or(DEFAULT_PADDING),
            groups: groups.ok_or_else(|| close.error("font is missing required field 'chars'"))?,
        })
    }

    fn group(&mut self) -> Result<GlyphGroup, ParseError> {
        let open = self.peek()?.clone();
        let mut chars: Option<Vec<char>> = None;
        let mut rect: Option<[i32; 4]> = None;
        let mut width = None;
        let mut pad = None;

        let close = self.object(|p, key_token, key| match key.as_str() {
            "chars" => {
                let value: Vec<char> = p.string()?.chars().collect();
                if value.is_empty() {
                    return Err(key_token.error("glyph group 'chars' is empty"));
                }
                set_once(&mut chars, value, &key_token, &key)
            }
            "rect" => {
                let mut coords = Vec::with_capacity(4);
                p.list(|p| {
                    coords.push(p.int()?);
                    Ok(())
                })?;
                let &[left, top, right, bottom] = coords.as_slice() else {
                    return Err(key_token.error(format!(
                        "'rect' needs 4 coordinates, found {}",
                        coords.len()
                    )));
                };
                if right < left || bottom < top {
                    return Err(key_token.error(format!(
                        "'rect' [{},{},{},{}] has a negative extent",
                        left, top, right, bottom
                    )));
                }
                set_once(&mut rect, [left, top, right, bottom], &key_token, &key)
            }
            "width" => {
                let value = p.int()?;
                if value < 0 {
                    return Err(key_token.error(format!("'width' {} is negative", value)));
                }
                set_once(&mut width, value, &key_token, &key)
            }
            "pad" => set_once(&mut pad, p.int()?, &key_token, &key),
            _ => p.skip_value(),
        })?;

        let chars = chars.ok_or_else(|| open.error("glyph group is missing 'chars'"))?;
        match (rect, width) {
            (Some([left, top, right, bottom]), None) => Ok(GlyphGroup::Rect {
                chars,
                left,
                top,
                right,
                bottom,
                pad,
            }),
            (None, Some(width)) => Ok(GlyphGroup::Width { chars, width, pad }),
            (Some(_), Some(_)) => Err(close.error("glyph group has both 'rect' and 'width'")),
            (None, None) => Err(open.error("glyph group needs either 'rect' or 'width'")),
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, at: &Token, key: &str) -> Result<(), ParseError> {
    if slot.replace(value).is_some() {
        return Err(at.error(format!("duplicate key '{}'", key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect_group() {
        let font = parse(r#"{id: "d", texture: "gui/d.png", chars: [{chars: "a", rect: [2,1,8,20]}]}"#)
            .unwrap();
        assert_eq!(font.groups.len(), 1);
        assert_eq!(font.groups[0].width(), 7);
        assert_eq!(font.groups[0].height(), Some(20));
        assert_eq!(font.width_table().get('a'), Some(7));
    }

    #[test]
    fn test_parse_width_group() {
        let font =
            parse(r#"{id: "d", texture: "t.png", chars: [{chars: "bc", width: 6}]}"#).unwrap();
        assert_eq!(
            font.groups[0],
            GlyphGroup::Width {
                chars: vec!['b', 'c'],
                width: 6,
                pad: None
            }
        );
        let table = font.width_table();
        assert_eq!(table.get('b'), Some(6));
        assert_eq!(table.get('c'), Some(6));
    }

    #[test]
    fn test_defaults() {
        let font = parse(r#"{id: "d", texture: "t.png", chars: []}"#).unwrap();
        assert_eq!(font.kerning, DEFAULT_KERNING);
        assert_eq!(font.padding, DEFAULT_PADDING);
        assert!(font.groups.is_empty());
    }

    #[test]
    fn test_generated_config() {
        // Layout written by the font builder: trailing commas, quoted glyphs
        let text = r#"
    {
      kerning: 2,
      id: "dialog",
      texture: "gui/dialog_font.ja.png",
      pad: 0,
      chars: [
        {
          chars: "\"",
          rect: [0,0,5,15]
        },
        {
          chars: "'",
          rect: [6,0,8,15]
        },
        {
          chars: "あ",
          rect: [9,0,24,15]
        },
] }"#;
        let font = parse(text).unwrap();
        assert_eq!(font.kerning, 2);
        assert_eq!(font.id, "dialog");
        assert_eq!(font.texture, "gui/dialog_font.ja.png");
        assert_eq!(font.padding, 0);
        let table = font.width_table();
        assert_eq!(table.get('"'), Some(6));
        assert_eq!(table.get('\''), Some(3));
        assert_eq!(table.get('あ'), Some(16));
    }

    #[test]
    fn test_duplicate_character_last_wins() {
        let font = parse(
            r#"{id: "d", texture: "t", chars: [
                {chars: "ab", width: 5},
                {chars: "b", rect: [0,0,9,9]},
            ]}"#,
        )
        .unwrap();
        let table = font.width_table();
        assert_eq!(table.get('a'), Some(5));
        assert_eq!(table.get('b'), Some(10));
    }

    #[test]
    fn test_unknown_keys_and_comments() {
        let font = parse(
            r#"# dialog font
            {
                id: "d", texture: 't',
                "scale": 1.5, extra: {nested: [1, "x", {a: b}]},
                chars: [{chars: "a", width: 4, pad: 3, flags: [true]}],
            }"#,
        )
        .unwrap();
        assert_eq!(font.groups[0].pad(), Some(3));
        assert_eq!(font.width_table().get('a'), Some(4));
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse(r#"{id: "d", chars: []}"#).unwrap_err();
        assert!(err.reason.contains("texture"), "{}", err);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_group_without_metrics() {
        let err = parse("{id: \"d\", texture: \"t\",\n chars: [{chars: \"a\"}]}").unwrap_err();
        assert!(err.reason.contains("either 'rect' or 'width'"), "{}", err);
        assert_eq!((err.line, err.column), (2, 10));
    }

    #[test]
    fn test_group_with_both_metrics() {
        let err = parse(r#"{id: "d", texture: "t", chars: [{chars: "a", width: 1, rect: [0,0,1,1]}]}"#)
            .unwrap_err();
        assert!(err.reason.contains("both"), "{}", err);
    }

    #[test]
    fn test_malformed_syntax() {
        assert!(parse("").is_err());
        assert!(parse(r#"{id: "d" texture: "t", chars: []}"#).is_err());
        assert!(parse(r#"{id: "d", texture: "t", chars: [}"#).is_err());
        assert!(parse(r#"{id: "unterminated, texture: "t", chars: []}"#).is_err());
        assert!(parse(r#"{id: "d", texture: "t", chars: []} trailing"#).is_err());
        assert!(parse(r#"{id: "d", texture: "t", chars: [{chars: "a", rect: [1,2,3]}]}"#).is_err());
        assert!(parse(r#"{id: "d", texture: "t", chars: [{chars: "a", width: 1.5}]}"#).is_err());
    }

    #[test]
    fn test_error_location() {
        let err = parse("{\n  id: \"d\",\n  texture: 7,\n}").unwrap_err();
        assert_eq!((err.line, err.column), (3, 12));
        assert_eq!(err.to_string(), "expected string, found integer 7 at line 3, column 12");
    }
}
