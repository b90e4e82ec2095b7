//! Parsing for indexed (`(_ op k*)`) and `(as const T)` operator heads.
use super::operators::{IndexedOp, Operator};
use super::Parser;
use crate::backend::Backend;
use crate::error::ParseResult;
use crate::lexer::{BvWord, FpWord, Lexer, Position, Token, TokenKind};
use crate::ops::FpSpecial;
use crate::sort::SortKey;

/// What a parenthesized operator head resolves to: an operator still
/// awaiting operands (`extract`, `to_fp`, ...), or a fully-formed value for
/// the forms that close eagerly (`bvK`, the FP special constants).
pub enum IndexedResult<B: Backend> {
    Op(Operator<B>),
    Eager(B::Node, SortKey),
}

pub(super) const MAX_BV_WIDTH: u32 = (1 << 31) - 1;

impl<B: Backend> Parser<B> {
    /// Called with `tok` positioned at the token right after `_`.
    pub(crate) fn parse_indexed_head(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        pos: Position,
    ) -> ParseResult<IndexedResult<B>> {
        match tok.kind.clone() {
            TokenKind::Bv(BvWord::Extract) => {
                self.advance(lex, tok)?;
                let hi = self.parse_numeral(lex, tok)?;
                let lo = self.parse_numeral(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                if hi < lo {
                    return Err(self.semantic(pos, format!("'extract' indices require hi >= lo, got {hi} {lo}")));
                }
                Ok(IndexedResult::Op(Operator::Indexed(IndexedOp::Extract(hi, lo))))
            }
            TokenKind::Bv(BvWord::ZeroExtend) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::ZeroExtend(k))),
            TokenKind::Bv(BvWord::SignExtend) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::SignExtend(k))),
            TokenKind::Bv(BvWord::Repeat) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::Repeat(k))),
            TokenKind::Bv(BvWord::RotateLeft) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::RotateLeft(k))),
            TokenKind::Bv(BvWord::RotateRight) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::RotateRight(k))),
            TokenKind::Fp(FpWord::ToUbv) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::ToUbv(k))),
            TokenKind::Fp(FpWord::ToSbv) => self.parse_single_index(lex, tok, pos, |k| Operator::Indexed(IndexedOp::ToSbv(k))),
            TokenKind::Fp(FpWord::ToFp) => {
                self.advance(lex, tok)?;
                let eb = self.parse_numeral(lex, tok)?;
                let sb = self.parse_numeral(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                Ok(IndexedResult::Op(Operator::Indexed(IndexedOp::ToFp(eb, sb))))
            }
            TokenKind::Fp(FpWord::ToFpUnsigned) => {
                self.advance(lex, tok)?;
                let eb = self.parse_numeral(lex, tok)?;
                let sb = self.parse_numeral(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                Ok(IndexedResult::Op(Operator::Indexed(IndexedOp::ToFpUnsigned(eb, sb))))
            }
            TokenKind::Fp(word @ (FpWord::PlusZero | FpWord::MinusZero | FpWord::PlusInf | FpWord::MinusInf | FpWord::Nan)) => {
                self.advance(lex, tok)?;
                let eb = self.parse_numeral(lex, tok)?;
                let sb = self.parse_numeral(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                let kind = match word {
                    FpWord::PlusZero => FpSpecial::PlusZero,
                    FpWord::MinusZero => FpSpecial::MinusZero,
                    FpWord::PlusInf => FpSpecial::PlusInf,
                    FpWord::MinusInf => FpSpecial::MinusInf,
                    FpWord::Nan => FpSpecial::Nan,
                    _ => unreachable!(),
                };
                let node = self.backend.fp_special(kind, eb, sb);
                Ok(IndexedResult::Eager(node, SortKey::FloatingPoint(eb, sb)))
            }
            TokenKind::Symbol(name) => {
                let Some(magnitude) = name.strip_prefix("bv").filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())) else {
                    return Err(self.syntax(pos, format!("expected an indexed operator name after '_', found '{name}'")));
                };
                let magnitude = magnitude.to_string();
                self.advance(lex, tok)?;
                let width = self.parse_numeral(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                let bits = self.decimal_to_bits(pos, &magnitude, width)?;
                let node = self.backend.bv_const(&bits);
                Ok(IndexedResult::Eager(node, SortKey::BitVec(width)))
            }
            _ => Err(self.syntax(pos, format!("expected an indexed operator name after '_', found '{}'", tok.text))),
        }
    }

    fn parse_single_index(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        pos: Position,
        build: impl FnOnce(u32) -> Operator<B>,
    ) -> ParseResult<IndexedResult<B>> {
        self.advance(lex, tok)?;
        let k = self.parse_numeral(lex, tok)?;
        self.expect_rpar(tok)?;
        self.advance(lex, tok)?;
        Ok(IndexedResult::Op(build(k)))
    }

    /// `(as const (Array I E))`: the only `as`-qualified head this theory uses.
    pub(crate) fn parse_as_head(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<Operator<B>> {
        match tok.kind.clone() {
            TokenKind::Symbol(name) if name == "const" => {
                self.advance(lex, tok)?;
                let sort = self.parse_sort(lex, tok)?;
                self.expect_rpar(tok)?;
                self.advance(lex, tok)?;
                if !sort.is_array() {
                    return Err(self.semantic(pos, "'(as const T)' requires T to be an array sort"));
                }
                Ok(Operator::AsConst(sort))
            }
            _ => Err(self.syntax(pos, "expected 'const' after 'as'")),
        }
    }

    fn decimal_to_bits(&self, pos: Position, magnitude: &str, width: u32) -> ParseResult<String> {
        if width == 0 || width > MAX_BV_WIDTH {
            return Err(self.semantic(pos, format!("bit-vector width {width} out of range")));
        }
        let mut digits: Vec<u8> = magnitude.bytes().map(|b| b - b'0').collect();
        let mut bits: Vec<u8> = Vec::new();
        while digits.iter().any(|&d| d != 0) {
            let mut carry: u32 = 0;
            let mut next = Vec::with_capacity(digits.len());
            for &d in &digits {
                let cur = carry * 10 + d as u32;
                next.push((cur / 2) as u8);
                carry = cur % 2;
            }
            bits.push(carry as u8);
            while next.len() > 1 && next[0] == 0 {
                next.remove(0);
            }
            digits = next;
        }
        if bits.is_empty() {
            bits.push(0);
        }
        if bits.len() as u32 > width {
            return Err(self.semantic(pos, format!("'bv{magnitude}' does not fit in a bit-vector of width {width}")));
        }
        bits.reverse();
        let mut out = String::with_capacity(width as usize);
        for _ in 0..(width as usize - bits.len()) {
            out.push('0');
        }
        for b in bits {
            out.push(if b == 1 { '1' } else { '0' });
        }
        Ok(out)
    }
}
