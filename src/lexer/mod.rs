//! Byte-stream lexer: tokens with `(line, col)` provenance.
//!
//! Handles numerals, hex/bin constants, reals, strings, simple and quoted
//! symbols, keywords, punctuation, and `;`-to-EOL comments. Symbol/keyword
//! resolution happens by consulting `lexmap`: the tag of a previously-known
//! name is returned directly, so reserved words, theory operators, command
//! names and plain user symbols all flow through one lookup.
mod lexmap;
mod token;

pub use token::*;

use crate::error::{ParseError, ParseResult};

const SIMPLE_START: u8 = 1 << 0;
const SIMPLE_CONT: u8 = 1 << 1;

fn classify(c: char) -> u8 {
    let mut bits = 0;
    if c.is_alphabetic() || "+-/*=%?!.$_~&^<>@".contains(c) {
        bits |= SIMPLE_START;
    }
    if (bits & SIMPLE_START) != 0 || c.is_ascii_digit() {
        bits |= SIMPLE_CONT;
    }
    bits
}

fn is_simple_start(c: char) -> bool {
    classify(c) & SIMPLE_START != 0
}

fn is_simple_cont(c: char) -> bool {
    classify(c) & SIMPLE_CONT != 0
}

/// Lexer over an owned copy of the input text. Owning a `Vec<char>` (rather
/// than borrowing `&str` with `Peekable<Chars>`, as the upstream solver
/// does) makes the one-character `ungetch` trivial: it is just an index
/// decrement plus restoring the previous `(line, col)`.
pub struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,
    prev_line: usize,
    prev_col: usize,
    file: String,
}

impl Lexer {
    pub fn new(input: &str, file: impl ToString) -> Self {
        Lexer {
            chars: input.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
            prev_line: 1,
            prev_col: 1,
            file: file.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.idx + 1).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.chars.get(self.idx).copied()?;
        self.idx += 1;
        self.prev_line = self.line;
        self.prev_col = self.col;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    /// Push the most recently read character back. Only one level of
    /// history is kept, matching the upstream solver's single-character
    /// `ungetch` contract.
    fn ungetch(&mut self) {
        if self.idx > 0 {
            self.idx -= 1;
            self.line = self.prev_line;
            self.col = self.prev_col;
        }
    }

    fn pos(&self) -> Position {
        (self.line, self.col)
    }

    fn err(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::lex(&self.file, pos, message)
    }

    fn eat_whitespace_and_comments(&mut self) {
        loop {
            while let Some(c) = self.peek() {
                if c.is_whitespace() {
                    self.next();
                } else {
                    break;
                }
            }
            if self.peek() == Some(';') {
                while let Some(c) = self.peek() {
                    self.next();
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            break;
        }
    }

    /// Read the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> ParseResult<Token> {
        self.eat_whitespace_and_comments();

        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", pos));
        };

        match c {
            '(' => {
                self.next();
                Ok(Token::new(TokenKind::LPar, "(", pos))
            }
            ')' => {
                self.next();
                Ok(Token::new(TokenKind::RPar, ")", pos))
            }
            '#' => self.lex_bv_literal(pos),
            '"' => self.lex_string(pos),
            '|' => self.lex_quoted_symbol(pos),
            ':' => self.lex_keyword(pos),
            '0'..='9' => self.lex_numeral(pos),
            _ if is_simple_start(c) => self.lex_symbol(pos),
            _ => Err(self.err(pos, format!("unexpected character '{c}'"))),
        }
    }

    fn lex_bv_literal(&mut self, pos: Position) -> ParseResult<Token> {
        self.next(); // '#'
        match self.peek() {
            Some('b') => {
                self.next();
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if c == '0' || c == '1' {
                        digits.push(c);
                        self.next();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() {
                    return Err(self.err(pos, "empty binary constant"));
                }
                Ok(Token::new(TokenKind::BinConst(digits.clone()), format!("#b{digits}"), pos))
            }
            Some('x') => {
                self.next();
                let mut digits = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_hexdigit() {
                        digits.push(c);
                        self.next();
                    } else {
                        break;
                    }
                }
                if digits.is_empty() {
                    return Err(self.err(pos, "empty hexadecimal constant"));
                }
                Ok(Token::new(TokenKind::HexConst(digits.clone()), format!("#x{digits}"), pos))
            }
            Some(other) => Err(self.err(pos, format!("expected 'b' or 'x' after '#', got '{other}'"))),
            None => Err(self.err(pos, "unexpected end of input after '#'")),
        }
    }

    fn lex_string(&mut self, pos: Position) -> ParseResult<Token> {
        self.next(); // opening quote
        let mut value = String::new();
        loop {
            match self.next() {
                None => return Err(self.err(pos, "unterminated string constant")),
                Some('"') => break,
                Some('\\') => match self.next() {
                    Some('"') => value.push('"'),
                    Some('\\') => value.push('\\'),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err(self.err(pos, "unterminated string constant")),
                },
                Some(c) => value.push(c),
            }
        }
        Ok(Token::new(TokenKind::StringLit(value.clone()), format!("\"{value}\""), pos))
    }

    fn lex_quoted_symbol(&mut self, pos: Position) -> ParseResult<Token> {
        self.next(); // opening '|'
        let mut value = String::new();
        loop {
            match self.next() {
                None => return Err(self.err(pos, "unterminated quoted symbol")),
                Some('|') => break,
                Some('\\') => return Err(self.err(pos, "'\\' not permitted inside quoted symbol")),
                Some(c) if c.is_control() => {
                    return Err(self.err(pos, "non-printable byte inside quoted symbol"))
                }
                Some(c) => value.push(c),
            }
        }
        Ok(Token::new(TokenKind::Symbol(value.clone()), value, pos))
    }

    fn lex_keyword(&mut self, pos: Position) -> ParseResult<Token> {
        self.next(); // ':'
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if is_simple_cont(c) {
                value.push(c);
                self.next();
            } else {
                break;
            }
        }
        if value.is_empty() {
            return Err(self.err(pos, "empty attribute keyword"));
        }
        Ok(Token::new(TokenKind::Keyword(value.clone()), format!(":{value}"), pos))
    }

    fn lex_numeral(&mut self, pos: Position) -> ParseResult<Token> {
        let first = self.next().unwrap();
        let mut digits = String::new();
        digits.push(first);

        if first == '0' {
            if let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    return Err(self.err(pos, "numeral with leading zero"));
                }
            }
        } else {
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.next();
                } else {
                    break;
                }
            }
        }

        if self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit()) {
            self.next(); // '.'
            let mut frac = String::new();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    frac.push(c);
                    self.next();
                } else {
                    break;
                }
            }
            let text = format!("{digits}.{frac}");
            return Ok(Token::new(TokenKind::Decimal(text.clone()), text, pos));
        }

        Ok(Token::new(TokenKind::Numeral(digits.clone()), digits, pos))
    }

    fn lex_symbol(&mut self, pos: Position) -> ParseResult<Token> {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if is_simple_cont(c) {
                value.push(c);
                self.next();
            } else {
                break;
            }
        }

        if let Some(kind) = lexmap::lookup(&value) {
            return Ok(Token::new(kind, value, pos));
        }

        Ok(Token::new(TokenKind::Symbol(value.clone()), value, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> ParseResult<Vec<TokenKind>> {
        let mut lexer = Lexer::new(src, "test.smt2");
        let mut out = vec![];
        loop {
            let tok = lexer.next_token()?;
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        Ok(out)
    }

    #[test]
    fn lexes_parens_and_symbol() {
        let toks = lex_all("(foo)").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::LPar,
                TokenKind::Symbol("foo".into()),
                TokenKind::RPar
            ]
        );
    }

    #[test]
    fn lexes_bv_literals() {
        let toks = lex_all("#b0101 #xFF").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::BinConst("0101".into()),
                TokenKind::HexConst("FF".into())
            ]
        );
    }

    #[test]
    fn lexes_quoted_symbol_and_unquoted_equal_text() {
        let toks = lex_all("|x| x").unwrap();
        assert_eq!(
            toks,
            vec![TokenKind::Symbol("x".into()), TokenKind::Symbol("x".into())]
        );
    }

    #[test]
    fn rejects_leading_zero_numeral() {
        let err = lex_all("007").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lex);
    }

    #[test]
    fn lexes_real_literal() {
        let toks = lex_all("0.5 12.25").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::Decimal("0.5".into()),
                TokenKind::Decimal("12.25".into())
            ]
        );
    }

    #[test]
    fn lexes_comment_to_eol() {
        let toks = lex_all("(foo) ; a comment\n(bar)").unwrap();
        assert_eq!(
            toks,
            vec![
                TokenKind::LPar,
                TokenKind::Symbol("foo".into()),
                TokenKind::RPar,
                TokenKind::LPar,
                TokenKind::Symbol("bar".into()),
                TokenKind::RPar
            ]
        );
    }

    #[test]
    fn tracks_line_and_col() {
        let mut lexer = Lexer::new("foo\nbar", "t.smt2");
        let first = lexer.next_token().unwrap();
        assert_eq!(first.position, (1, 1));
        let second = lexer.next_token().unwrap();
        assert_eq!(second.position, (2, 1));
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = lex_all("\"abc").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lex);
    }
}
