//! Sort expression parsing. Plain recursive descent: sorts never need the
//! operand-buffering `finish_application` path since every sort-former has a
//! fixed, syntactically obvious shape.
use super::Parser;
use crate::backend::Backend;
use crate::error::ParseResult;
use crate::lexer::{BvWord, Core, FpWord, Lexer, Position, Reserved, Token, TokenKind};
use crate::sort::SortKey;

impl<B: Backend> Parser<B> {
    pub fn parse_sort(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<SortKey> {
        let pos = tok.position;
        match tok.kind.clone() {
            TokenKind::Core(Core::Bool) => {
                self.advance(lex, tok)?;
                Ok(SortKey::Bool)
            }
            TokenKind::Fp(FpWord::RoundingMode) => {
                self.advance(lex, tok)?;
                Ok(SortKey::RoundingMode)
            }
            TokenKind::Symbol(name) => {
                self.advance(lex, tok)?;
                self.sorts
                    .resolve_alias(&name)
                    .ok_or_else(|| self.semantic(pos, format!("unknown sort '{name}'")))
            }
            TokenKind::LPar => {
                self.advance(lex, tok)?;
                match tok.kind.clone() {
                    TokenKind::Reserved(Reserved::Underscore) => {
                        self.advance(lex, tok)?;
                        self.parse_indexed_sort(lex, tok, pos)
                    }
                    TokenKind::Array(crate::lexer::ArrayWord::Array) => {
                        self.advance(lex, tok)?;
                        let index = self.parse_sort(lex, tok)?;
                        let element = self.parse_sort(lex, tok)?;
                        self.expect_rpar(tok)?;
                        self.advance(lex, tok)?;
                        Ok(SortKey::Array(Box::new(index), Box::new(element)))
                    }
                    _ => Err(self.syntax(pos, "expected '_' or 'Array' after '(' in sort position")),
                }
            }
            _ => Err(self.syntax(pos, format!("expected a sort, found '{}'", tok.text))),
        }
    }

    fn parse_indexed_sort(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<SortKey> {
        match tok.kind.clone() {
            TokenKind::Bv(BvWord::BitVec) => {
                self.advance(lex, tok)?;
                let width = self.parse_numeral(lex, tok)?;
                if width < 1 {
                    return Err(self.semantic(pos, "(_ BitVec n) requires n >= 1"));
                }
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                Ok(SortKey::BitVec(width))
            }
            TokenKind::Fp(FpWord::FloatingPoint) => {
                self.advance(lex, tok)?;
                let eb = self.parse_numeral(lex, tok)?;
                let sb = self.parse_numeral(lex, tok)?;
                if eb < 1 || sb < 1 {
                    return Err(self.semantic(pos, "(_ FloatingPoint eb sb) requires eb, sb >= 1"));
                }
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                Ok(SortKey::FloatingPoint(eb, sb))
            }
            _ => Err(self.syntax(pos, "expected 'BitVec' or 'FloatingPoint' after '(_' in sort position")),
        }
    }
}
