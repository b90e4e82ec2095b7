//! Top-level command driver: reads `(command ...)` forms and dispatches
//! them, threading the same `Lexer`/lookahead-`Token` pair the term parser
//! uses. Kept as its own module (rather than folded into `parser`) since
//! none of its state — push bookkeeping, the source map, the output
//! emitter — is needed by term reduction itself.
pub mod options;

use std::io::Write;

use log::{debug, warn};

use crate::backend::Backend;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Command, Core, Lexer, Position, Token, TokenKind};
use crate::ops::SatResult;
use crate::output::Emitter;
use crate::parser::Parser;
use crate::sort::SortKey;
use crate::symtab::{SymbolEntry, SymbolTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Sat,
    Unsat,
    Unknown,
    /// No `check-sat` (or `check-sat-assuming`) ever ran.
    NoCheckSat,
}

impl From<SatResult> for Status {
    fn from(r: SatResult) -> Self {
        match r {
            SatResult::Sat => Status::Sat,
            SatResult::Unsat => Status::Unsat,
            SatResult::Unknown => Status::Unknown,
        }
    }
}

/// Maps `(line, col)` positions back into the original source text, for
/// `get-value` and `check-sat-assuming`'s requirement to echo an operand's
/// exact surface syntax rather than a re-serialization of the parsed term.
struct SourceMap {
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl SourceMap {
    fn new(src: &str) -> Self {
        let chars: Vec<char> = src.chars().collect();
        let mut line_starts = vec![0];
        for (i, &c) in chars.iter().enumerate() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        SourceMap { chars, line_starts }
    }

    fn offset(&self, pos: Position) -> usize {
        let (line, col) = pos;
        self.line_starts[line - 1] + (col - 1)
    }

    /// Text from the start of `from` up to the start of `to`, with
    /// whitespace/comments trailing the actual term trimmed off.
    fn slice(&self, from: Position, to: Position) -> String {
        let start = self.offset(from);
        let end = self.offset(to).min(self.chars.len());
        self.chars[start..end].iter().collect::<String>().trim_end().to_string()
    }
}

fn advance(lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
    *tok = lex.next_token()?;
    Ok(())
}

pub struct Driver<'p, 'o, B: Backend> {
    parser: &'p mut Parser<B>,
    source: SourceMap,
    emitter: Emitter<'o>,
    push_scopes: Vec<u32>,
    last_status: Status,
}

/// Runs every command in `src` against `parser`, writing responses to
/// `out`. Returns the final `check-sat`/`check-sat-assuming` status;
/// `parser.error`, `parser.logic`, and `parser.nsatcalls` carry the rest of
/// what the caller needs to build a `ParseResult`.
pub fn run<B: Backend>(parser: &mut Parser<B>, src: &str, out: &mut dyn Write) -> Status {
    let file = parser.file.clone();
    let mut driver = Driver {
        parser,
        source: SourceMap::new(src),
        emitter: Emitter::new(out),
        push_scopes: Vec::new(),
        last_status: Status::NoCheckSat,
    };
    let mut lex = Lexer::new(src, file);
    let mut tok = match lex.next_token() {
        Ok(t) => t,
        Err(e) => {
            driver.parser.error = Some(e);
            return driver.last_status;
        }
    };
    driver.run_loop(&mut lex, &mut tok);
    driver.last_status
}

impl<B: Backend> Driver<'_, '_, B> {
    fn run_loop(&mut self, lex: &mut Lexer, tok: &mut Token) {
        loop {
            if self.parser.backend.terminate_requested() {
                debug!("termination requested, stopping command loop");
                return;
            }
            if tok.kind == TokenKind::Eof {
                return;
            }
            match self.step(lex, tok) {
                Ok(should_exit) => {
                    if should_exit {
                        return;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                    self.parser.error = Some(e);
                    return;
                }
            }
        }
    }

    /// Runs one top-level command; `tok` starts at the command's opening
    /// `(`. Returns `Ok(true)` iff this was `exit`.
    fn step(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<bool> {
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, format!("expected '(' to start a command, found '{}'", tok.text)));
        }
        advance(lex, tok)?;
        let pos = tok.position;
        let TokenKind::Command(command) = tok.kind.clone() else {
            return Err(self.syntax(pos, format!("expected a command name, found '{}'", tok.text)));
        };
        advance(lex, tok)?;

        let mut should_exit = false;
        match command {
            Command::SetLogic => {
                self.cmd_set_logic(lex, tok)?;
                self.after_command(pos)?;
            }
            Command::SetOption => {
                self.cmd_set_option(lex, tok, pos)?;
                self.after_command(pos)?;
            }
            Command::SetInfo => {
                self.cmd_set_info(lex, tok)?;
                self.after_command(pos)?;
            }
            Command::DeclareSort => {
                self.cmd_declare_sort(lex, tok, pos)?;
                self.after_command(pos)?;
            }
            Command::DefineSort => {
                self.cmd_define_sort(lex, tok)?;
                self.after_command(pos)?;
            }
            Command::DeclareConst => {
                self.cmd_declare_fun(lex, tok, pos, true)?;
                self.after_command(pos)?;
            }
            Command::DeclareFun => {
                self.cmd_declare_fun(lex, tok, pos, false)?;
                self.after_command(pos)?;
            }
            Command::DefineFun => {
                self.cmd_define_fun(lex, tok, pos)?;
                self.after_command(pos)?;
            }
            Command::Assert => {
                self.cmd_assert(lex, tok, pos)?;
                self.after_command(pos)?;
            }
            Command::CheckSat => {
                let result = self.cmd_check_sat(lex, tok)?;
                self.last_status = result.into();
                self.emitter.sat_result(result).map_err(|e| self.io_err(pos, e))?;
            }
            Command::CheckSatAssuming => {
                let result = self.cmd_check_sat_assuming(lex, tok, pos)?;
                self.last_status = result.into();
                self.emitter.sat_result(result).map_err(|e| self.io_err(pos, e))?;
            }
            Command::GetModel => {
                let text = self.cmd_get_model(lex, tok, pos)?;
                self.emitter.model(&text).map_err(|e| self.io_err(pos, e))?;
            }
            Command::GetValue => match self.cmd_get_value(lex, tok)? {
                Some(pairs) => self.emitter.values(&pairs).map_err(|e| self.io_err(pos, e))?,
                None => self.after_command(pos)?,
            },
            Command::GetUnsatAssumptions => {
                let names = self.cmd_get_unsat_assumptions(lex, tok)?;
                self.emitter.unsat_assumptions(&names).map_err(|e| self.io_err(pos, e))?;
            }
            Command::Push => {
                let n = self.read_numeral(tok)?;
                advance(lex, tok)?;
                self.expect_rpar(tok)?;
                advance(lex, tok)?;
                self.do_push(n);
                self.after_command(pos)?;
            }
            Command::Pop => {
                let n = self.read_numeral(tok)?;
                advance(lex, tok)?;
                self.expect_rpar(tok)?;
                advance(lex, tok)?;
                self.do_pop(n, pos)?;
                self.after_command(pos)?;
            }
            Command::Echo => {
                let text = self.cmd_echo(lex, tok)?;
                self.emitter.echo(&text).map_err(|e| self.io_err(pos, e))?;
            }
            Command::Exit => {
                self.expect_rpar(tok)?;
                advance(lex, tok)?;
                self.after_command(pos)?;
                should_exit = true;
            }
            Command::Model => {
                self.cmd_model(lex, tok, pos)?;
                self.after_command(pos)?;
            }
        }
        Ok(should_exit)
    }

    fn syntax(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::syntax(&self.parser.file, pos, message)
    }

    fn semantic(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::semantic(&self.parser.file, pos, message)
    }

    fn capability(&self, pos: Position, message: impl ToString) -> ParseError {
        ParseError::capability(&self.parser.file, pos, message)
    }

    fn io_err(&self, pos: Position, e: std::io::Error) -> ParseError {
        ParseError::internal(&self.parser.file, pos, format!("output error: {e}"))
    }

    fn expect_rpar(&self, tok: &Token) -> ParseResult<()> {
        if tok.kind == TokenKind::RPar {
            Ok(())
        } else {
            Err(self.syntax(tok.position, format!("expected ')', found '{}'", tok.text)))
        }
    }

    fn expect_symbol(&self, tok: &Token) -> ParseResult<String> {
        match &tok.kind {
            TokenKind::Symbol(s) => Ok(s.clone()),
            _ => Err(self.syntax(tok.position, format!("expected a symbol, found '{}'", tok.text))),
        }
    }

    fn read_numeral(&self, tok: &Token) -> ParseResult<u32> {
        match &tok.kind {
            TokenKind::Numeral(digits) => digits
                .parse::<u32>()
                .map_err(|_| self.semantic(tok.position, format!("numeral '{digits}' out of range"))),
            _ => Err(self.syntax(tok.position, format!("expected a numeral, found '{}'", tok.text))),
        }
    }

    fn parse_sort_list(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<Vec<SortKey>> {
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start an argument sort list"));
        }
        advance(lex, tok)?;
        let mut sorts = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside argument sort list"));
            }
            sorts.push(self.parser.parse_sort(lex, tok)?);
        }
        advance(lex, tok)?;
        Ok(sorts)
    }

    fn after_command(&mut self, pos: Position) -> ParseResult<()> {
        if self.parser.options.print_success {
            self.emitter.success().map_err(|e| self.io_err(pos, e))?;
        }
        Ok(())
    }

    fn close_scope(&mut self, level: u32) {
        if self.parser.options.global_declarations {
            return;
        }
        let removed = self.parser.symtab.close_scope(level);
        for entry in removed {
            if let Some(node) = entry.backend_node {
                self.parser.backend.release(node);
            }
        }
    }

    fn do_push(&mut self, n: u32) {
        for _ in 0..n {
            self.parser.scope_level += 1;
            self.push_scopes.push(self.parser.scope_level);
        }
        self.parser.backend.push(n);
        self.parser.push_depth += n;
    }

    fn do_pop(&mut self, n: u32, pos: Position) -> ParseResult<()> {
        if n > self.parser.push_depth {
            return Err(self.semantic(pos, format!("cannot 'pop' {n}: only {} scope(s) are pushed", self.parser.push_depth)));
        }
        for _ in 0..n {
            if let Some(level) = self.push_scopes.pop() {
                self.close_scope(level);
            }
            self.parser.scope_level -= 1;
        }
        self.parser.backend.pop(n);
        self.parser.push_depth -= n;
        Ok(())
    }

    fn cmd_set_logic(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        let name = match &tok.kind {
            TokenKind::Logic(s) => s.clone(),
            TokenKind::Symbol(s) => s.clone(),
            _ => return Err(self.syntax(tok.position, format!("expected a logic name, found '{}'", tok.text))),
        };
        advance(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        self.parser.logic = Some(name);
        Ok(())
    }

    fn read_option_value(&self, tok: &Token) -> ParseResult<String> {
        match &tok.kind {
            TokenKind::Core(Core::True) => Ok("true".to_string()),
            TokenKind::Core(Core::False) => Ok("false".to_string()),
            TokenKind::Numeral(n) => Ok(n.clone()),
            TokenKind::StringLit(s) => Ok(s.clone()),
            TokenKind::Symbol(s) => Ok(s.clone()),
            _ => Err(self.syntax(tok.position, format!("expected an option value, found '{}'", tok.text))),
        }
    }

    fn cmd_set_option(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<()> {
        let TokenKind::Keyword(name) = tok.kind.clone() else {
            return Err(self.syntax(tok.position, format!("expected an attribute keyword, found '{}'", tok.text)));
        };
        advance(lex, tok)?;
        let value = self.read_option_value(tok)?;
        advance(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;

        match self.parser.options.set(&name, &value) {
            Ok(true) => {}
            Ok(false) => self.parser.backend.set_option(&name, &value),
            Err(_) => return Err(self.semantic(pos, format!("invalid value '{value}' for option ':{name}'"))),
        }
        if name == "regular-output-channel" {
            self.emitter
                .redirect_to_file(&value)
                .map_err(|e| ParseError::internal(&self.parser.file, pos, format!("could not open output channel '{value}': {e}")))?;
        }
        Ok(())
    }

    fn skip_attribute_value(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        if tok.kind != TokenKind::LPar {
            advance(lex, tok)?;
            return Ok(());
        }
        let mut depth: u32 = 0;
        loop {
            match tok.kind {
                TokenKind::LPar => depth += 1,
                TokenKind::RPar => depth -= 1,
                TokenKind::Eof => return Err(self.syntax(tok.position, "unexpected end of input inside attribute value")),
                _ => {}
            }
            advance(lex, tok)?;
            if depth == 0 {
                return Ok(());
            }
        }
    }

    fn cmd_set_info(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        if !matches!(tok.kind, TokenKind::Keyword(_)) {
            return Err(self.syntax(tok.position, format!("expected an attribute keyword, found '{}'", tok.text)));
        }
        advance(lex, tok)?;
        self.skip_attribute_value(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        Ok(())
    }

    fn cmd_declare_sort(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<()> {
        let name = self.expect_symbol(tok)?;
        advance(lex, tok)?;
        let arity_pos = tok.position;
        let arity = self.read_numeral(tok)?;
        advance(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;

        if arity != 0 {
            return Err(self.semantic(arity_pos, "parametric sorts (arity > 0) are not supported by 'declare-sort'"));
        }
        let width = self.parser.options.decl_sort_bv_width;
        if width == 0 {
            return Err(self.capability(pos, "'declare-sort' requires ':decl-sort-bv-width' to be set to a nonzero value"));
        }
        self.parser.sorts.define_alias(name, SortKey::BitVec(width));
        Ok(())
    }

    fn cmd_define_sort(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        let name = self.expect_symbol(tok)?;
        advance(lex, tok)?;
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start the parameter list"));
        }
        advance(lex, tok)?;
        if tok.kind != TokenKind::RPar {
            return Err(self.semantic(tok.position, "'define-sort' only supports 0-ary parameter lists"));
        }
        advance(lex, tok)?;
        let sort = self.parser.parse_sort(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        self.parser.sorts.define_alias(name, sort);
        Ok(())
    }

    fn cmd_declare_fun(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position, is_const: bool) -> ParseResult<()> {
        let name = self.expect_symbol(tok)?;
        advance(lex, tok)?;
        if self.parser.symtab.contains_in_current_scope(&name, self.parser.scope_level) {
            return Err(self.semantic(pos, format!("'{name}' is already declared in this scope")));
        }

        let arg_sorts = if is_const { Vec::new() } else { self.parse_sort_list(lex, tok)? };
        let result_sort = self.parser.parse_sort(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;

        if arg_sorts.iter().any(SortKey::is_array) || result_sort.is_array() {
            self.parser.need_arrays = true;
        }

        let (node, tag, param_sorts, result_for_entry) = if arg_sorts.is_empty() {
            let backend_sort = self.parser.sorts.materialize(&mut self.parser.backend, &result_sort);
            let node = self.parser.backend.declare_var(&name, &backend_sort);
            (node, SymbolTag::Var, Vec::new(), result_sort)
        } else {
            self.parser.need_functions = true;
            for s in arg_sorts.iter().chain(std::iter::once(&result_sort)) {
                if s.bv_width().is_none() {
                    return Err(self.semantic(pos, format!("'{name}': function argument and result sorts must be bit-vectors, got {s}")));
                }
            }
            let backend_args: Vec<_> = arg_sorts.iter().map(|s| self.parser.sorts.materialize(&mut self.parser.backend, s)).collect();
            let backend_result = self.parser.sorts.materialize(&mut self.parser.backend, &result_sort);
            let node = self.parser.backend.declare_fun(&name, &backend_args, &backend_result);
            (node, SymbolTag::Function, arg_sorts.clone(), result_sort.clone())
        };

        let id = self.parser.symtab.fresh_id();
        let mut entry = SymbolEntry::new(id, name, self.parser.scope_level, pos, tag);
        entry.backend_node = Some(node);
        entry.result_sort = Some(result_for_entry);
        entry.param_sorts = param_sorts;
        self.parser.symtab.insert(entry);
        Ok(())
    }

    fn cmd_define_fun(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<()> {
        let name = self.expect_symbol(tok)?;
        advance(lex, tok)?;
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start the parameter list"));
        }
        advance(lex, tok)?;

        self.parser.scope_level += 1;
        let level = self.parser.scope_level;
        let mut param_sorts = Vec::new();
        let mut param_nodes = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside parameter list"));
            }
            if tok.kind != TokenKind::LPar {
                return Err(self.syntax(tok.position, "expected '(' to start a parameter"));
            }
            advance(lex, tok)?;
            let p_pos = tok.position;
            let p_name = self.expect_symbol(tok)?;
            advance(lex, tok)?;
            let p_sort = self.parser.parse_sort(lex, tok)?;
            self.expect_rpar(tok)?;
            advance(lex, tok)?;

            let internal = self.parser.fresh_param_name();
            let backend_sort = self.parser.sorts.materialize(&mut self.parser.backend, &p_sort);
            let node = self.parser.backend.declare_param(&internal, &backend_sort);
            let id = self.parser.symtab.fresh_id();
            let mut entry = SymbolEntry::new(id, p_name, level, p_pos, SymbolTag::SortedVar);
            entry.backend_node = Some(node.clone());
            entry.result_sort = Some(p_sort.clone());
            self.parser.symtab.insert(entry);
            param_sorts.push(p_sort);
            param_nodes.push(node);
        }
        advance(lex, tok)?; // consume parameter list ')'
        let result_sort = self.parser.parse_sort(lex, tok)?;

        if self.parser.in_model_block {
            if !param_sorts.is_empty() {
                self.close_scope(level);
                self.parser.scope_level -= 1;
                return Err(self.semantic(pos, "'define-fun' inside a 'model' block must be 0-ary"));
            }
            let entry = self
                .parser
                .symtab
                .find(&name)
                .ok_or_else(|| self.semantic(pos, format!("'{name}' is not a declared symbol")))?;
            let existing_node = entry
                .backend_node
                .clone()
                .ok_or_else(|| ParseError::internal(&self.parser.file, pos, format!("symbol '{name}' has no backend node")))?;
            let existing_sort = entry
                .result_sort
                .clone()
                .ok_or_else(|| ParseError::internal(&self.parser.file, pos, format!("symbol '{name}' has no sort")))?;
            if existing_sort != result_sort {
                return Err(self.semantic(pos, format!("'{name}' has sort {existing_sort} but 'define-fun' gives it sort {result_sort}")));
            }

            let (body, body_sort) = self.parser.parse_term(lex, tok)?;
            self.expect_rpar(tok)?;
            advance(lex, tok)?;
            self.close_scope(level);
            self.parser.scope_level -= 1;

            if body_sort != existing_sort {
                return Err(self.semantic(pos, format!("'{name}' value has sort {body_sort}, expected {existing_sort}")));
            }
            let eq = self.parser.backend.eq(existing_node, body);
            self.parser.backend.assert(eq);
            return Ok(());
        }

        let (body, body_sort) = self.parser.parse_term(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        self.close_scope(level);
        self.parser.scope_level -= 1;

        if body_sort != result_sort {
            return Err(self.semantic(pos, format!("'define-fun {name}' body has sort {body_sort}, expected {result_sort}")));
        }
        if self.parser.symtab.contains_in_current_scope(&name, self.parser.scope_level) {
            return Err(self.semantic(pos, format!("'{name}' is already defined")));
        }

        if param_nodes.is_empty() {
            let id = self.parser.symtab.fresh_id();
            let mut entry = SymbolEntry::new(id, name, self.parser.scope_level, pos, SymbolTag::Const);
            entry.backend_node = Some(body);
            entry.result_sort = Some(body_sort);
            self.parser.symtab.insert(entry);
        } else {
            self.parser.need_functions = true;
            self.parser.need_quantifiers = true;
            let backend_args: Vec<_> = param_sorts.iter().map(|s| self.parser.sorts.materialize(&mut self.parser.backend, s)).collect();
            let backend_result = self.parser.sorts.materialize(&mut self.parser.backend, &result_sort);
            let fn_node = self.parser.backend.declare_fun(&name, &backend_args, &backend_result);
            let applied = self.parser.backend.apply(fn_node.clone(), param_nodes.clone());
            let body_eq = self.parser.backend.eq(applied, body);
            let axiom = self.parser.backend.forall(param_nodes, body_eq);
            self.parser.backend.assert(axiom);

            let id = self.parser.symtab.fresh_id();
            let mut entry = SymbolEntry::new(id, name, self.parser.scope_level, pos, SymbolTag::Function);
            entry.backend_node = Some(fn_node);
            entry.result_sort = Some(result_sort);
            entry.param_sorts = param_sorts;
            self.parser.symtab.insert(entry);
        }
        Ok(())
    }

    fn cmd_assert(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<()> {
        let (node, sort) = self.parser.parse_term(lex, tok)?;
        if sort != SortKey::Bool {
            return Err(self.semantic(pos, format!("'assert' requires a Bool term, got {sort}")));
        }
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        self.parser.backend.assert(node);
        Ok(())
    }

    fn cmd_check_sat(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<SatResult> {
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        self.parser.nsatcalls += 1;
        Ok(self.parser.backend.check_sat())
    }

    fn cmd_check_sat_assuming(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<SatResult> {
        if !self.parser.options.incremental {
            return Err(self.semantic(pos, "'check-sat-assuming' requires ':incremental' mode"));
        }
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start the assumption list"));
        }
        advance(lex, tok)?;
        let mut assumptions: Vec<(B::Node, String)> = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside assumption list"));
            }
            let start = tok.position;
            let (node, sort) = self.parser.parse_term(lex, tok)?;
            // A 1-bit bit-vector assumption is accepted alongside Bool: it is
            // the idiom SMT-LIB scripts use to assume a declared bit-vector
            // literal directly (`(check-sat-assuming (p))`), asserting it
            // equal to `#b1`.
            let node = match &sort {
                SortKey::Bool => node,
                SortKey::BitVec(1) => {
                    let one = self.parser.backend.bv_const("1");
                    self.parser.backend.eq(node, one)
                }
                _ => return Err(self.semantic(start, format!("'check-sat-assuming' assumption must be Bool or a 1-bit bit-vector, got {sort}"))),
            };
            let end = tok.position;
            let text = self.source.slice(start, end);
            assumptions.push((node, text));
        }
        advance(lex, tok)?; // consume assumption list ')'
        self.expect_rpar(tok)?;
        advance(lex, tok)?;

        let nodes: Vec<_> = assumptions.iter().map(|(n, _)| n.clone()).collect();
        self.parser.assumptions = assumptions;
        self.parser.nsatcalls += 1;
        Ok(self.parser.backend.check_sat_assuming(nodes))
    }

    fn cmd_get_model(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<String> {
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        if !self.parser.options.produce_models {
            return Err(self.capability(pos, "'get-model' requires ':produce-models' to be enabled"));
        }
        Ok(self.parser.backend.get_model())
    }

    fn cmd_get_value(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<Option<Vec<(String, String)>>> {
        if tok.kind != TokenKind::LPar {
            return Err(self.syntax(tok.position, "expected '(' to start the term list"));
        }
        advance(lex, tok)?;
        let mut items: Vec<(B::Node, String)> = Vec::new();
        while tok.kind != TokenKind::RPar {
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside 'get-value' term list"));
            }
            let start = tok.position;
            let (node, _sort) = self.parser.parse_term(lex, tok)?;
            let end = tok.position;
            let text = self.source.slice(start, end);
            items.push((node, text));
        }
        if items.is_empty() {
            return Err(self.syntax(tok.position, "'get-value' requires at least one term"));
        }
        advance(lex, tok)?; // consume term list ')'
        self.expect_rpar(tok)?;
        advance(lex, tok)?;

        if !matches!(self.last_status, Status::Sat) {
            return Ok(None);
        }
        let nodes: Vec<_> = items.iter().map(|(n, _)| n.clone()).collect();
        let values = self.parser.backend.get_value(&nodes);
        Ok(Some(items.into_iter().map(|(_, text)| text).zip(values).collect()))
    }

    fn cmd_get_unsat_assumptions(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<Vec<String>> {
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        let failed = self.parser.backend.get_failed_assumptions();
        Ok(failed.into_iter().filter_map(|i| self.parser.assumptions.get(i).map(|(_, t)| t.clone())).collect())
    }

    fn cmd_echo(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<String> {
        let text = match &tok.kind {
            TokenKind::StringLit(s) => s.clone(),
            _ => return Err(self.syntax(tok.position, format!("expected a string constant, found '{}'", tok.text))),
        };
        advance(lex, tok)?;
        self.expect_rpar(tok)?;
        advance(lex, tok)?;
        Ok(text)
    }

    fn cmd_model(&mut self, lex: &mut Lexer, tok: &mut Token, pos: Position) -> ParseResult<()> {
        if self.parser.in_model_block {
            return Err(self.semantic(pos, "nested 'model' blocks are not allowed"));
        }
        self.parser.in_model_block = true;
        let result = self.run_model_body(lex, tok);
        self.parser.in_model_block = false;
        result
    }

    fn run_model_body(&mut self, lex: &mut Lexer, tok: &mut Token) -> ParseResult<()> {
        loop {
            if tok.kind == TokenKind::RPar {
                advance(lex, tok)?;
                return Ok(());
            }
            if tok.kind == TokenKind::Eof {
                return Err(self.syntax(tok.position, "unexpected end of input inside 'model' block"));
            }
            if tok.kind != TokenKind::LPar {
                return Err(self.syntax(tok.position, "expected '(' to start a command inside 'model' block"));
            }
            advance(lex, tok)?;
            let pos = tok.position;
            match tok.kind.clone() {
                TokenKind::Command(Command::DefineFun) => {
                    advance(lex, tok)?;
                    self.cmd_define_fun(lex, tok, pos)?;
                }
                _ => return Err(self.syntax(pos, format!("only 'define-fun' is allowed inside a 'model' block, found '{}'", tok.text))),
            }
        }
    }
}
