//! Recursive-descent term parser with integrated static type checking.
//!
//! A `(op arg*)` form reduces as soon as its `)` is read: arity, argument-kind
//! and sort-match checks run against the already-built operand list, then the
//! `Backend` constructs the result. Nested forms recurse through
//! [`Parser::parse_term`]; a form's own operand list plays the role of the
//! upstream solver's "work stack" slice between its `LPAR` and matching
//! `RPAR`, scoped per call instead of held in one flat vector across the
//! whole script.
mod binder;
pub(crate) mod indexed;
mod operators;
mod reduce;
mod sortparse;
mod workstack;

pub use operators::{class_of, ApplyInfo, Class, IndexedOp, Operator};
pub use workstack::WorkItem;

use log::trace;

use crate::backend::Backend;
use crate::command::options::OptionTable;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Core, Lexer, Position, Reserved, Token, TokenKind};
use crate::sort::{SortKey, SortRegistry};
use crate::symtab::{SymbolEntry, SymbolId, SymbolTable, SymbolTag};

/// Single, process-scoped parser instance (`spec.md` §3). Owns the backend,
/// symbol table, sort registry, option table, and the bookkeeping flags the
/// command driver and term parser share; the lexer and current-token
/// lookahead are threaded as call parameters instead, since Rust's borrow
/// checker makes that cleaner than holding a second mutable borrow of `self`
/// alongside the lexer for the call's duration.
pub struct Parser<B: Backend> {
    pub backend: B,
    pub symtab: SymbolTable<B>,
    pub sorts: SortRegistry<B>,
    pub options: OptionTable,
    pub file: String,
    pub scope_level: u32,
    pub push_depth: u32,
    pub error: Option<ParseError>,
    pub need_arrays: bool,
    pub need_functions: bool,
    pub need_quantifiers: bool,
    pub logic: Option<String>,
    pub assumptions: Vec<(B::Node, String)>,
    pub nsatcalls: u32,
    pub in_model_block: bool,
    next_param: u64,
}

impl<B: Backend> Parser<B> {
    pub fn new(backend: B, file: impl Into<String>) -> Self {
        Parser {
            backend,
            symtab: SymbolTable::default(),
            sorts: SortRegistry::default(),
            options: OptionTable::default(),
            file: file.into(),
            scope_level: 0,
            push_depth: 0,
            error: None,
            need_arrays: false,
            need_functions: false,
            need_quantifiers: false,
            logic: None,
            assumptions: Vec::new(),
            nsatcalls: 0,
            in_model_block: false,
            next_param: 0,
        }
    }

    pub(crate) fn advance(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        *tok = lex.next_token()?;
        Ok(())
    }

    pub(crate) fn fresh_param_name(&mut self) -> String {
        let n = self.next_param;
        self.next_param += 1;
        format!("sym!{n}")
    }

    fn syntax(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::syntax(&self.file, pos, message)
    }

    fn semantic(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::semantic(&self.file, pos, message)
    }

    fn capability(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::capability(&self.file, pos, message)
    }

    fn expect_rpar(&self, tok: &Token) -> ParseResult<()> {
        if tok.kind == TokenKind::RPar {
            Ok(())
        } else {
            Err(self.syntax(tok.position, format!("expected ')', found '{}'", tok.text)))
        }
    }

    fn check_nargs(&self, pos: Position, name: &str, actual: usize, required: usize) -> ParseResult<()> {
        if actual < required {
            Err(self.semantic(pos, format!("'{name}' is missing arguments: expected {required}, got {actual}")))
        } else if actual > required {
            Err(self.semantic(pos, format!("'{name}' has too many arguments: expected {required}, got {actual}")))
        } else {
            Ok(())
        }
    }

    fn parse_numeral(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<u32> {
        let pos = tok.position;
        let TokenKind::Numeral(digits) = tok.kind.clone() else {
            return Err(self.syntax(pos, format!("expected a numeral, found '{}'", tok.text)));
        };
        self.advance(lex, tok)?;
        digits
            .parse::<u32>()
            .map_err(|_| self.semantic(pos, format!("numeral '{digits}' out of range")))
    }

    fn check_nargs_at_least(&self, pos: Position, name: &str, actual: usize, minimum: usize) -> ParseResult<()> {
        if actual < minimum {
            Err(self.semantic(pos, format!("'{name}' is missing arguments: expected at least {minimum}, got {actual}")))
        } else {
            Ok(())
        }
    }

    /// Parses a complete term starting at `tok` (already the first token of
    /// the term); on return `tok` is the first token past the term.
    pub fn parse_term(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<(B::Node, SortKey)> {
        match tok.kind {
            TokenKind::LPar => self.parse_list(lex, tok),
            _ => self.parse_atom(lex, tok),
        }
    }

    fn parse_atom(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<(B::Node, SortKey)> {
        let pos = tok.position;
        let result = match tok.kind.clone() {
            TokenKind::Core(Core::True) => (self.backend.bool_const(true), SortKey::Bool),
            TokenKind::Core(Core::False) => (self.backend.bool_const(false), SortKey::Bool),
            TokenKind::BinConst(bits) => (self.backend.bv_const(&bits), SortKey::BitVec(bits.len() as u32)),
            TokenKind::HexConst(hex) => {
                let bits = hex_to_bits(&hex);
                let width = bits.len() as u32;
                (self.backend.bv_const(&bits), SortKey::BitVec(width))
            }
            TokenKind::Decimal(text) => {
                self.advance(lex, tok)?;
                return Err(self.semantic(pos, format!("unexpected real constant '{text}' outside a (_ to_fp ...) context")));
            }
            TokenKind::Fp(fp) => match rounding_mode_of(fp) {
                Some(mode) => (self.backend.rm_const(mode), SortKey::RoundingMode),
                None => {
                    self.advance(lex, tok)?;
                    return Err(self.syntax(pos, "expected a term"));
                }
            },
            TokenKind::Symbol(name) => {
                let entry = self
                    .symtab
                    .find(&name)
                    .ok_or_else(|| self.semantic(pos, format!("use of undeclared symbol '{name}'")))?;
                let is_function = entry.tag == SymbolTag::Function;
                let node = entry.backend_node.clone();
                let sort = entry.result_sort.clone();
                if is_function {
                    self.advance(lex, tok)?;
                    return Err(self.semantic(pos, format!("function symbol '{name}' used without arguments")));
                }
                let node = node.ok_or_else(|| ParseError::internal(&self.file, pos, format!("symbol '{name}' has no backend node")))?;
                let sort = sort.ok_or_else(|| ParseError::internal(&self.file, pos, format!("symbol '{name}' has no sort")))?;
                (node, sort)
            }
            TokenKind::Numeral(text) => {
                self.advance(lex, tok)?;
                return Err(self.syntax(pos, format!("unexpected numeral '{text}'")));
            }
            TokenKind::StringLit(_) => {
                self.advance(lex, tok)?;
                return Err(self.syntax(pos, "unexpected string constant in term position"));
            }
            _ => return Err(self.syntax(pos, format!("expected a term, found '{}'", tok.text))),
        };
        self.advance(lex, tok)?;
        Ok(result)
    }

    fn parse_list(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<(B::Node, SortKey)> {
        let open_pos = tok.position;
        self.advance(lex, tok)?; // consume '('
        match tok.kind.clone() {
            TokenKind::LPar => self.parse_paren_headed_list(lex, tok, open_pos),
            TokenKind::Reserved(Reserved::Underscore) => {
                self.advance(lex, tok)?;
                match self.parse_indexed_head(lex, tok, open_pos)? {
                    indexed::IndexedResult::Eager(node, sort) => Ok((node, sort)),
                    indexed::IndexedResult::Op(_) => {
                        Err(self.syntax(open_pos, "this indexed operator requires an enclosing application, e.g. ((_ extract hi lo) arg)"))
                    }
                }
            }
            TokenKind::Reserved(Reserved::Let) => {
                self.advance(lex, tok)?;
                self.parse_let(lex, tok, open_pos)
            }
            TokenKind::Reserved(Reserved::Forall) => {
                self.advance(lex, tok)?;
                self.parse_quantifier(lex, tok, open_pos, true)
            }
            TokenKind::Reserved(Reserved::Exists) => {
                self.advance(lex, tok)?;
                self.parse_quantifier(lex, tok, open_pos, false)
            }
            TokenKind::Reserved(Reserved::Bang) => {
                self.advance(lex, tok)?;
                self.parse_annotation(lex, tok, open_pos)
            }
            _ => {
                let op = self.read_operator_head(lex, tok, open_pos)?;
                self.finish_application(lex, tok, op, open_pos)
            }
        }
    }

    /// Reads the operator of a plain `(op arg*)` form: a theory word or a
    /// user function symbol. Indexed (`(_ ...)`) and `(as ...)` heads are
    /// handled by `parse_paren_headed_list` instead, since they are
    /// themselves parenthesized.
    fn read_operator_head(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<Operator<B>> {
        let op = match tok.kind.clone() {
            TokenKind::Core(c) => Operator::Core(c),
            TokenKind::Array(a) => Operator::Array(a),
            TokenKind::Bv(b) => Operator::Bv(b),
            TokenKind::Fp(f) => Operator::Fp(f),
            TokenKind::Symbol(name) => {
                let entry = self
                    .symtab
                    .find(&name)
                    .ok_or_else(|| self.semantic(pos, format!("use of undeclared function '{name}'")))?;
                if entry.tag != SymbolTag::Function {
                    return Err(self.semantic(pos, format!("'{name}' is not a function")));
                }
                let func_node = entry
                    .backend_node
                    .clone()
                    .ok_or_else(|| ParseError::internal(&self.file, pos, format!("function '{name}' has no backend node")))?;
                let param_sorts = entry.param_sorts.clone();
                let result_sort = entry
                    .result_sort
                    .clone()
                    .ok_or_else(|| ParseError::internal(&self.file, pos, format!("function '{name}' has no result sort")))?;
                Operator::Apply(ApplyInfo { name, func_node, param_sorts, result_sort })
            }
            _ => return Err(self.syntax(pos, format!("expected an operator, found '{}'", tok.text))),
        };
        self.advance(lex, tok)?;
        Ok(op)
    }

    /// Reads the operand list of an already-identified operator, then the
    /// closing `)`, then reduces.
    fn finish_application(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        op: Operator<B>,
        open_pos: Position,
    ) -> ParseResult<(B::Node, SortKey)> {
        let mut args: Vec<WorkItem<B>> = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside term"));
            }
            if let TokenKind::Decimal(text) = tok.kind.clone() {
                let pos = tok.position;
                args.push(WorkItem::RealLit(text, pos));
                self.advance(lex, tok)?;
                continue;
            }
            let pos = tok.position;
            let (node, sort) = self.parse_term(lex, tok)?;
            args.push(WorkItem::Expr(node, sort, pos));
        }
        self.expect_rpar(tok)?;
        self.advance(lex, tok)?;
        self.reduce(op, args, open_pos)
    }

    /// `((_ idx-op idx*) arg*)` or `((as const Sort) arg*)`: the head itself
    /// is parenthesized.
    fn parse_paren_headed_list(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        open_pos: Position,
    ) -> ParseResult<(B::Node, SortKey)> {
        let inner_pos = tok.position;
        self.advance(lex, tok)?; // consume the nested '('
        let op = match tok.kind.clone() {
            TokenKind::Reserved(Reserved::Underscore) => {
                self.advance(lex, tok)?;
                match self.parse_indexed_head(lex, tok, inner_pos)? {
                    indexed::IndexedResult::Op(op) => op,
                    indexed::IndexedResult::Eager(_, _) => {
                        return Err(self.syntax(inner_pos, "this indexed form takes no further arguments"));
                    }
                }
            }
            TokenKind::Reserved(Reserved::As) => {
                self.advance(lex, tok)?;
                self.parse_as_head(lex, tok, inner_pos)?
            }
            _ => return Err(self.syntax(inner_pos, "expected '_' or 'as' after '(' in operator position")),
        };
        trace!("parsed parenthesized operator head at {inner_pos:?}");
        self.finish_application(lex, tok, op, open_pos)
    }
}

fn rounding_mode_of(fp: crate::lexer::FpWord) -> Option<RoundingMode> {
    use crate::lexer::FpWord::*;
    match fp {
        Rne | RneLong => Some(RoundingMode::Rne),
        Rna | RnaLong => Some(RoundingMode::Rna),
        Rtp | RtpLong => Some(RoundingMode::Rtp),
        Rtn | RtnLong => Some(RoundingMode::Rtn),
        Rtz | RtzLong => Some(RoundingMode::Rtz),
        _ => None,
    }
}

pub(crate) fn hex_to_bits(hex: &str) -> String {
    let mut out = String::with_capacity(hex.len() * 4);
    for c in hex.chars() {
        let v = c.to_digit(16).unwrap_or(0);
        out.push_str(&format!("{:04b}", v));
    }
    out
}

use crate::ops::RoundingMode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_backend::RecordingBackend;

    fn parse_one(src: &str) -> ParseResult<(crate::backend::test_backend::Node, SortKey)> {
        let mut parser = Parser::new(RecordingBackend::default(), "t.smt2");
        let mut lex = Lexer::new(src, "t.smt2");
        let mut tok = lex.next_token().unwrap();
        parser.parse_term(&mut lex, &mut tok)
    }

    #[test]
    fn parses_bv_equality() {
        let (_, sort) = parse_one("(= #b0101 #b0101)").unwrap();
        assert_eq!(sort, SortKey::Bool);
    }

    #[test]
    fn hex_literal_has_width_four_times_digits() {
        let (_, sort) = parse_one("#xFF").unwrap();
        assert_eq!(sort, SortKey::BitVec(8));
    }

    #[test]
    fn rejects_bare_numeral() {
        let err = parse_one("5").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Syntax);
    }

    #[test]
    fn rejects_undeclared_symbol() {
        let err = parse_one("undeclared_name").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
    }

    #[test]
    fn zero_extend_rejects_width_overflow() {
        let err = parse_one("((_ zero_extend 4294967295) #b00000000)").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
    }

    #[test]
    fn repeat_rejects_width_overflow() {
        let err = parse_one("((_ repeat 4294967295) #b00000000)").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
    }

    #[test]
    fn sign_extend_within_cap_succeeds() {
        let (_, sort) = parse_one("((_ sign_extend 8) #b00000000)").unwrap();
        assert_eq!(sort, SortKey::BitVec(16));
    }
}
