use std::iter::FusedIterator;

use log::debug;
use phf::phf_map;

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::AND,
    "class" => TokenType::CLASS,
    "else" => TokenType::ELSE,
    "false" => TokenType::FALSE,
    "fun" => TokenType::FUN,
    "for" => TokenType::FOR,
    "if" => TokenType::IF,
    "nil" => TokenType::NIL,
    "or" => TokenType::OR,
    "print" => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super" => TokenType::SUPER,
    "this" => TokenType::THIS,
    "true" => TokenType::TRUE,
    "var" => TokenType::VAR,
    "while" => TokenType::WHILE,
};

/// Single-pass scanner over the raw source bytes.  Yields one token (or
/// scan error) at a time and finishes with an `EOF` sentinel; an error
/// does not stop the scan.
///
/// The driver validates UTF-8 at the input boundary.  Decoding here is
/// still checked rather than assumed: slices are cut on ASCII delimiter
/// bytes, and any invalid sequence that slips through is replaced, never
/// handed out as `str`.
#[derive(Debug, Clone)]
pub struct Scanner {
    source: Vec<u8>,
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &[u8]) -> Self {
        Self {
            source: source.to_vec(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scan one lexeme.  `Ok(None)` means the lexeme produces no token
    /// (whitespace or a comment).
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let byte = self.advance();

        let token_type = match byte {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' => {
                if self.take(b'/') {
                    // A comment runs to the end of the line; the newline
                    // itself is left for the next lexeme.
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                    return Ok(None);
                }

                TokenType::SLASH
            }

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                debug!("unexpected byte 0x{:02x} at line {}", byte, self.line);
                return Err(LoxError::lex(self.line, "Unexpected character."));
            }
        };

        Ok(Some(token_type))
    }

    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        // Closing quote.
        self.advance();

        // The literal is the content with the quotes stripped; no escape
        // processing.
        let content = self.text(self.start + 1, self.current - 1);

        Ok(TokenType::STRING(content))
    }

    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A fractional part needs a digit after the dot; otherwise the
        // dot belongs to a property access.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let literal = self.text(self.start, self.current);

        TokenType::NUMBER(literal.parse().unwrap_or(0.0))
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let text = self.text(self.start, self.current);

        match KEYWORDS.get(text.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenType::IDENTIFIER,
        }
    }

    /// Decode a source slice.  Invalid sequences are replaced rather
    /// than trusted, keeping the UTF-8 invariant even for hostile input.
    fn text(&self, from: usize, to: usize) -> String {
        String::from_utf8_lossy(&self.source[from..to]).into_owned()
    }

    fn advance(&mut self) -> u8 {
        let byte = self.source[self.current];
        self.current += 1;
        byte
    }

    /// Consume the next byte only when it matches `expected`.
    fn take(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }

    fn either(&mut self, expected: u8, double: TokenType, single: TokenType) -> TokenType {
        if self.take(expected) {
            double
        } else {
            single
        }
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        *self.source.get(self.current + 1).unwrap_or(&0)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

impl Iterator for Scanner {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_at_end() {
                // Emit the EOF sentinel exactly once, then fuse.
                if self.current == self.source.len() {
                    self.current += 1;
                    return Some(Ok(Token::eof(self.line)));
                }

                return None;
            }

            self.start = self.current;

            // A string may span lines; its token reports the line of the
            // opening quote.
            let line = self.line;

            match self.scan_token() {
                Err(e) => return Some(Err(e)),

                Ok(Some(token_type)) => {
                    let lexeme = self.text(self.start, self.current);

                    debug!("token {:?} '{}' at line {}", token_type, lexeme, line);

                    return Some(Ok(Token::new(token_type, lexeme, line)));
                }

                Ok(None) => continue,
            }
        }
    }
}

impl FusedIterator for Scanner {}
