//! `let`, `forall`/`exists`, and `(! e :named n)` — the three term forms
//! that open a lexical scope or attach a symbol, rather than reducing
//! through the generic operator dispatch in `reduce.rs`.
use super::Parser;
use crate::backend::Backend;
use crate::error::ParseResult;
use crate::lexer::{Lexer, Position, Token, TokenKind};
use crate::sort::SortKey;
use crate::symtab::{SymbolEntry, SymbolTag};

impl<B: Backend> Parser<B> {
    fn close_scope_releasing(&mut self, level: u32) {
        let removed = self.symtab.close_scope(level);
        for entry in removed {
            if let Some(node) = entry.backend_node {
                self.backend.release(node);
            }
        }
    }

    /// `tok` is positioned at the `(` opening the binding list.
    pub(crate) fn parse_let(&mut self, lex: &mut Lexer, tok: &mut Token, open_pos: Position) -> ParseResult<(B::Node, SortKey)> {
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start 'let' bindings"));
        }
        self.advance(lex, tok)?;
        self.scope_level += 1;
        let level = self.scope_level;

        let result = self.parse_let_body(lex, tok, open_pos);

        self.close_scope_releasing(level);
        self.scope_level -= 1;
        result
    }

    fn parse_let_body(&mut self, lex: &mut Lexer, tok: &mut Token, open_pos: Position) -> ParseResult<(B::Node, SortKey)> {
        let level = self.scope_level;
        let mut bound_any = false;
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside 'let' bindings"));
            }
            if tok.kind != TokenKind::LPar {
                return Err(self.syntax(tok.position, "expected '(' to start a variable binding"));
            }
            let bind_pos = tok.position;
            self.advance(lex, tok)?;
            let TokenKind::Symbol(name) = tok.kind.clone() else {
                return Err(self.syntax(tok.position, "expected a symbol in variable binding"));
            };
            self.advance(lex, tok)?;
            let (node, sort) = self.parse_term(lex, tok)?;
            self.expect_rpar(tok)?;
            self.advance(lex, tok)?;

            let id = self.symtab.fresh_id();
            let mut entry = SymbolEntry::new(id, name, level, bind_pos, SymbolTag::LetBound);
            entry.backend_node = Some(node);
            entry.result_sort = Some(sort);
            self.symtab.insert(entry);
            bound_any = true;
        }
        if !bound_any {
            return Err(self.semantic(open_pos, "'let' requires at least one binding"));
        }
        self.advance(lex, tok)?; // consume bindings list ')'
        let (body, body_sort) = self.parse_term(lex, tok)?;
        self.expect_rpar(tok)?;
        self.advance(lex, tok)?;
        Ok((body, body_sort))
    }

    pub(crate) fn parse_quantifier(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        open_pos: Position,
        is_forall: bool,
    ) -> ParseResult<(B::Node, SortKey)> {
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start sorted variables"));
        }
        self.advance(lex, tok)?;
        self.scope_level += 1;
        let level = self.scope_level;

        let result = self.parse_quantifier_body(lex, tok, open_pos, is_forall, level);

        self.close_scope_releasing(level);
        self.scope_level -= 1;
        result
    }

    fn parse_quantifier_body(
        &mut self,
        lex: &mut Lexer,
        tok: &mut Token,
        open_pos: Position,
        is_forall: bool,
        level: u32,
    ) -> ParseResult<(B::Node, SortKey)> {
        let name = if is_forall { "forall" } else { "exists" };
        let mut params: Vec<B::Node> = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside sorted variables"));
            }
            if tok.kind != TokenKind::LPar {
                return Err(self.syntax(tok.position, "expected '(' to start a sorted variable"));
            }
            let var_pos = tok.position;
            self.advance(lex, tok)?;
            let TokenKind::Symbol(var_name) = tok.kind.clone() else {
                return Err(self.syntax(tok.position, "expected a symbol in sorted variable"));
            };
            self.advance(lex, tok)?;
            let sort = self.parse_sort(lex, tok)?;
            self.expect_rpar(tok)?;
            self.advance(lex, tok)?;

            let internal = self.fresh_param_name();
            let backend_sort = self.sorts.materialize(&mut self.backend, &sort);
            let node = self.backend.declare_param(&internal, &backend_sort);
            let id = self.symtab.fresh_id();
            let mut entry = SymbolEntry::new(id, var_name, level, var_pos, SymbolTag::SortedVar);
            entry.backend_node = Some(node.clone());
            entry.result_sort = Some(sort);
            self.symtab.insert(entry);
            params.push(node);
        }
        if params.is_empty() {
            return Err(self.semantic(open_pos, format!("'{name}' requires at least one sorted variable")));
        }
        self.advance(lex, tok)?; // consume sorted-variables list ')'
        let (body, body_sort) = self.parse_term(lex, tok)?;
        if body_sort != SortKey::Bool {
            return Err(self.semantic(open_pos, format!("'{name}' body must have sort Bool, got {body_sort}")));
        }
        self.expect_rpar(tok)?;
        self.advance(lex, tok)?;
        self.need_quantifiers = true;
        let result = if is_forall {
            self.backend.forall(params, body)
        } else {
            self.backend.exists(params, body)
        };
        Ok((result, SortKey::Bool))
    }

    /// `tok` is positioned at the first token of the annotated term, i.e.
    /// right after `!`.
    pub(crate) fn parse_annotation(&mut self, lex: &mut Lexer, tok: &mut Token, open_pos: Position) -> ParseResult<(B::Node, SortKey)> {
        let (node, sort) = self.parse_term(lex, tok)?;
        let TokenKind::Keyword(kw) = tok.kind.clone() else {
            return Err(self.syntax(tok.position, "expected an attribute after the annotated term"));
        };
        if kw != "named" {
            return Err(self.syntax(tok.position, format!("unsupported annotation attribute ':{kw}'")));
        }
        self.advance(lex, tok)?;
        let TokenKind::Symbol(name) = tok.kind.clone() else {
            return Err(self.syntax(tok.position, "expected a symbol after ':named'"));
        };
        let name_pos = tok.position;
        if self.symtab.contains_anywhere(&name) {
            return Err(self.semantic(name_pos, format!("':named' symbol '{name}' is already defined")));
        }
        self.advance(lex, tok)?;
        self.expect_rpar(tok)?;
        self.advance(lex, tok)?;

        self.backend.set_symbol(&node, &name);
        let id = self.symtab.fresh_id();
        let mut entry = SymbolEntry::new(id, name, self.scope_level, open_pos, SymbolTag::Const);
        entry.backend_node = Some(node.clone());
        entry.result_sort = Some(sort.clone());
        self.symtab.insert(entry);
        Ok((node, sort))
    }
}
