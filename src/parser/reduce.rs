//! Per-operator-family reduction: once a `(op arg*)` form's operands are all
//! parsed, arity, sort, and kind checks run here against the already-built
//! operand list before the `Backend` constructs the result.
use super::indexed::MAX_BV_WIDTH;
use super::operators::{ApplyInfo, IndexedOp, Operator};
use super::{Parser, WorkItem};
use crate::backend::{Backend, ToFpSource};
use crate::error::ParseResult;
use crate::lexer::{ArrayWord, BvWord, Core, FpWord, Position};
use crate::ops::*;
use crate::sort::SortKey;

impl<B: Backend> Parser<B> {
    pub(crate) fn reduce(&mut self, op: Operator<B>, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        match op {
            Operator::Core(c) => self.reduce_core(c, args, pos),
            Operator::Array(a) => self.reduce_array(a, args, pos),
            Operator::Bv(b) => self.reduce_bv(b, args, pos),
            Operator::Fp(f) => self.reduce_fp(f, args, pos),
            Operator::Indexed(i) => self.reduce_indexed(i, args, pos),
            Operator::AsConst(sort) => self.reduce_as_const(sort, args, pos),
            Operator::Apply(info) => self.reduce_apply(info, args, pos),
        }
    }

    /// Unwraps an operand, rejecting a bare real literal (only legal inside
    /// `(_ to_fp eb sb)`).
    fn expr(&self, item: WorkItem<B>) -> ParseResult<(B::Node, SortKey, Position)> {
        match item {
            WorkItem::Expr(n, s, p) => Ok((n, s, p)),
            WorkItem::RealLit(_, p) => {
                Err(self.semantic(p, "a real (decimal) literal is only valid as the converted operand of '(_ to_fp eb sb)'"))
            }
        }
    }

    fn exprs(&self, args: Vec<WorkItem<B>>) -> ParseResult<Vec<(B::Node, SortKey, Position)>> {
        args.into_iter().map(|a| self.expr(a)).collect()
    }

    fn require_sort(&self, name: &str, pos: Position, got: &SortKey, want: &SortKey) -> ParseResult<()> {
        if got == want {
            Ok(())
        } else {
            Err(self.semantic(pos, format!("'{name}' expects sort {want}, got {got}")))
        }
    }

    fn require_bool(&self, name: &str, pos: Position, got: &SortKey) -> ParseResult<()> {
        self.require_sort(name, pos, got, &SortKey::Bool)
    }

    fn require_same_sort(&self, name: &str, pos: Position, a: &SortKey, b: &SortKey) -> ParseResult<()> {
        if a == b {
            Ok(())
        } else {
            Err(self.semantic(pos, format!("'{name}' requires matching sorts, got {a} and {b}")))
        }
    }

    fn require_bv(&self, name: &str, pos: Position, got: &SortKey) -> ParseResult<u32> {
        got.bv_width().ok_or_else(|| self.semantic(pos, format!("'{name}' expects a bit-vector argument, got {got}")))
    }

    fn require_fp(&self, name: &str, pos: Position, got: &SortKey) -> ParseResult<(u32, u32)> {
        match got {
            SortKey::FloatingPoint(eb, sb) => Ok((*eb, *sb)),
            _ => Err(self.semantic(pos, format!("'{name}' expects a floating-point argument, got {got}"))),
        }
    }

    fn require_rm(&self, name: &str, pos: Position, got: &SortKey) -> ParseResult<()> {
        self.require_sort(name, pos, got, &SortKey::RoundingMode)
    }

    fn reduce_core(&mut self, c: Core, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        match c {
            Core::Bool => Err(self.syntax(pos, "'Bool' is a sort, not an operator")),
            Core::True => {
                self.check_nargs(pos, "true", args.len(), 0)?;
                Ok((self.backend.bool_const(true), SortKey::Bool))
            }
            Core::False => {
                self.check_nargs(pos, "false", args.len(), 0)?;
                Ok((self.backend.bool_const(false), SortKey::Bool))
            }
            Core::Not => {
                self.check_nargs(pos, "not", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                self.require_bool("not", p, &sort)?;
                Ok((self.backend.not(node), SortKey::Bool))
            }
            Core::And | Core::Or | Core::Xor => {
                let name = match c {
                    Core::And => "and",
                    Core::Or => "or",
                    _ => "xor",
                };
                let minimum = if c == Core::Xor { 2 } else { 1 };
                self.check_nargs_at_least(pos, name, args.len(), minimum)?;
                let exprs = self.exprs(args)?;
                let mut nodes = Vec::with_capacity(exprs.len());
                for (node, sort, p) in exprs {
                    self.require_bool(name, p, &sort)?;
                    nodes.push(node);
                }
                let op = match c {
                    Core::And => BoolFoldOp::And,
                    Core::Or => BoolFoldOp::Or,
                    _ => BoolFoldOp::Xor,
                };
                Ok((self.backend.bool_fold(op, nodes), SortKey::Bool))
            }
            Core::Implies => {
                self.check_nargs_at_least(pos, "=>", args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let mut iter = exprs.into_iter();
                let (first, sort0, p0) = iter.next().unwrap();
                self.require_bool("=>", p0, &sort0)?;
                let rest: Vec<_> = iter.collect();
                // Right-associative: fold from the back, threading each
                // partial result as the right-hand side of the one before it.
                let mut nodes = Vec::with_capacity(rest.len() + 1);
                nodes.push(first);
                for (node, sort, p) in &rest {
                    self.require_bool("=>", *p, sort)?;
                    nodes.push(node.clone());
                }
                let mut acc = nodes.pop().unwrap();
                while let Some(lhs) = nodes.pop() {
                    acc = self.backend.implies(lhs, acc);
                }
                Ok((acc, SortKey::Bool))
            }
            Core::Eq => {
                self.check_nargs_at_least(pos, "=", args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let sort0 = exprs[0].1.clone();
                for (_, sort, p) in &exprs {
                    self.require_same_sort("=", *p, sort, &sort0)?;
                }
                let nodes: Vec<_> = exprs.into_iter().map(|(n, _, _)| n).collect();
                let pairs: Vec<_> = nodes.windows(2).map(|w| self.backend.eq(w[0].clone(), w[1].clone())).collect();
                let result = if pairs.len() == 1 {
                    pairs.into_iter().next().unwrap()
                } else {
                    self.backend.bool_fold(BoolFoldOp::And, pairs)
                };
                Ok((result, SortKey::Bool))
            }
            Core::Distinct => {
                self.check_nargs_at_least(pos, "distinct", args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let sort0 = exprs[0].1.clone();
                for (_, sort, p) in &exprs {
                    self.require_same_sort("distinct", *p, sort, &sort0)?;
                }
                let nodes: Vec<_> = exprs.into_iter().map(|(n, _, _)| n).collect();
                let mut pairs = Vec::with_capacity(nodes.len() * (nodes.len() - 1) / 2);
                for i in 0..nodes.len() {
                    for j in (i + 1)..nodes.len() {
                        pairs.push(self.backend.distinct_pair(nodes[i].clone(), nodes[j].clone()));
                    }
                }
                let result = if pairs.len() == 1 {
                    pairs.into_iter().next().unwrap()
                } else {
                    self.backend.bool_fold(BoolFoldOp::And, pairs)
                };
                Ok((result, SortKey::Bool))
            }
            Core::Ite => {
                self.check_nargs(pos, "ite", args.len(), 3)?;
                let mut exprs = self.exprs(args)?.into_iter();
                let (cond, cond_sort, cond_pos) = exprs.next().unwrap();
                let (then_, then_sort, then_pos) = exprs.next().unwrap();
                let (else_, else_sort, _) = exprs.next().unwrap();
                self.require_bool("ite", cond_pos, &cond_sort)?;
                self.require_same_sort("ite", then_pos, &then_sort, &else_sort)?;
                Ok((self.backend.ite(cond, then_, else_), then_sort))
            }
        }
    }

    fn reduce_bv(&mut self, op: BvWord, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        let name = bv_word_name(op);
        match op {
            BvWord::BitVec | BvWord::Extract | BvWord::ZeroExtend | BvWord::SignExtend | BvWord::Repeat | BvWord::RotateLeft | BvWord::RotateRight => {
                Err(self.syntax(pos, format!("'{name}' is only valid as an indexed operator, e.g. (_ {name} ...)")))
            }
            BvWord::Not | BvWord::Neg | BvWord::Redor | BvWord::Redand => {
                self.check_nargs(pos, name, args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv(name, p, &sort)?;
                let bvop = match op {
                    BvWord::Not => BvUnaryOp::Not,
                    BvWord::Neg => BvUnaryOp::Neg,
                    BvWord::Redor => BvUnaryOp::Redor,
                    _ => BvUnaryOp::Redand,
                };
                let result_sort = match op {
                    BvWord::Redor | BvWord::Redand => SortKey::BitVec(1),
                    _ => SortKey::BitVec(width),
                };
                Ok((self.backend.bv_unary(bvop, node), result_sort))
            }
            BvWord::Concat => {
                self.check_nargs_at_least(pos, "concat", args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let mut total_width = 0u32;
                let mut nodes = Vec::with_capacity(exprs.len());
                for (node, sort, p) in exprs {
                    total_width += self.require_bv("concat", p, &sort)?;
                    nodes.push(node);
                }
                Ok((self.backend.bv_nary(BvNaryOp::Concat, nodes), SortKey::BitVec(total_width)))
            }
            BvWord::And | BvWord::Or | BvWord::Xor | BvWord::Xnor | BvWord::Add | BvWord::Sub | BvWord::Mul => {
                self.check_nargs_at_least(pos, name, args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let width = self.require_bv(name, exprs[0].2, &exprs[0].1)?;
                let mut nodes = Vec::with_capacity(exprs.len());
                for (node, sort, p) in exprs {
                    let w = self.require_bv(name, p, &sort)?;
                    if w != width {
                        return Err(self.semantic(p, format!("'{name}' requires matching bit-widths, got {width} and {w}")));
                    }
                    nodes.push(node);
                }
                let bvop = match op {
                    BvWord::And => BvNaryOp::And,
                    BvWord::Or => BvNaryOp::Or,
                    BvWord::Xor => BvNaryOp::Xor,
                    BvWord::Xnor => BvNaryOp::Xnor,
                    BvWord::Add => BvNaryOp::Add,
                    BvWord::Sub => BvNaryOp::Sub,
                    _ => BvNaryOp::Mul,
                };
                Ok((self.backend.bv_nary(bvop, nodes), SortKey::BitVec(width)))
            }
            BvWord::Udiv | BvWord::Urem | BvWord::Sdiv | BvWord::Srem | BvWord::Smod | BvWord::Shl | BvWord::Lshr | BvWord::Ashr | BvWord::Nand | BvWord::Nor | BvWord::Comp => {
                self.check_nargs(pos, name, args.len(), 2)?;
                let (lhs, rhs, width) = self.same_width_pair(name, args)?;
                let bvop = match op {
                    BvWord::Udiv => BvBinaryOp::Udiv,
                    BvWord::Urem => BvBinaryOp::Urem,
                    BvWord::Sdiv => BvBinaryOp::Sdiv,
                    BvWord::Srem => BvBinaryOp::Srem,
                    BvWord::Smod => BvBinaryOp::Smod,
                    BvWord::Shl => BvBinaryOp::Shl,
                    BvWord::Lshr => BvBinaryOp::Lshr,
                    BvWord::Ashr => BvBinaryOp::Ashr,
                    BvWord::Nand => BvBinaryOp::Nand,
                    BvWord::Nor => BvBinaryOp::Nor,
                    _ => BvBinaryOp::Comp,
                };
                let result_sort = if op == BvWord::Comp { SortKey::BitVec(1) } else { SortKey::BitVec(width) };
                Ok((self.backend.bv_binary(bvop, lhs, rhs), result_sort))
            }
            BvWord::Ult | BvWord::Ule | BvWord::Ugt | BvWord::Uge | BvWord::Slt | BvWord::Sle | BvWord::Sgt | BvWord::Sge => {
                self.check_nargs(pos, name, args.len(), 2)?;
                let (lhs, rhs, _) = self.same_width_pair(name, args)?;
                let bvop = match op {
                    BvWord::Ult => BvCompareOp::Ult,
                    BvWord::Ule => BvCompareOp::Ule,
                    BvWord::Ugt => BvCompareOp::Ugt,
                    BvWord::Uge => BvCompareOp::Uge,
                    BvWord::Slt => BvCompareOp::Slt,
                    BvWord::Sle => BvCompareOp::Sle,
                    BvWord::Sgt => BvCompareOp::Sgt,
                    _ => BvCompareOp::Sge,
                };
                Ok((self.backend.bv_compare(bvop, lhs, rhs), SortKey::Bool))
            }
            BvWord::ExtRotateLeft | BvWord::ExtRotateRight => {
                self.check_nargs(pos, name, args.len(), 2)?;
                let mut iter = args.into_iter();
                let (first, first_sort, first_pos) = self.expr(iter.next().unwrap())?;
                let (second, second_sort, second_pos) = self.expr(iter.next().unwrap())?;
                let width = self.require_bv(name, first_pos, &first_sort)?;
                self.require_bv(name, second_pos, &second_sort)?;
                let bits = self
                    .backend
                    .bv_literal_value(&second)
                    .ok_or_else(|| self.semantic(second_pos, format!("'{name}' requires its second argument to be a bit-vector constant")))?;
                let amount = bits.chars().fold(0u32, |acc, c| acc.wrapping_mul(2).wrapping_add(if c == '1' { 1 } else { 0 })) % width.max(1);
                let result = if op == BvWord::ExtRotateLeft {
                    self.backend.bv_rotate_left(amount, first)
                } else {
                    self.backend.bv_rotate_right(amount, first)
                };
                Ok((result, SortKey::BitVec(width)))
            }
        }
    }

    /// Reads exactly two already-validated operands of matching bit-vector
    /// sort, returning their nodes and shared width.
    fn same_width_pair(&self, name: &str, args: Vec<WorkItem<B>>) -> ParseResult<(B::Node, B::Node, u32)> {
        let mut iter = self.exprs(args)?.into_iter();
        let (lhs, lhs_sort, lhs_pos) = iter.next().unwrap();
        let (rhs, rhs_sort, rhs_pos) = iter.next().unwrap();
        let width = self.require_bv(name, lhs_pos, &lhs_sort)?;
        let rhs_width = self.require_bv(name, rhs_pos, &rhs_sort)?;
        if width != rhs_width {
            return Err(self.semantic(rhs_pos, format!("'{name}' requires matching bit-widths, got {width} and {rhs_width}")));
        }
        Ok((lhs, rhs, width))
    }

    fn reduce_array(&mut self, a: ArrayWord, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        match a {
            ArrayWord::Array => Err(self.syntax(pos, "'Array' is a sort constructor, not an operator")),
            ArrayWord::Select => {
                self.check_nargs(pos, "select", args.len(), 2)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (array, array_sort, array_pos) = iter.next().unwrap();
                let (index, index_sort, index_pos) = iter.next().unwrap();
                let (idx_key, elem_key) = array_sort
                    .array_parts()
                    .ok_or_else(|| self.semantic(array_pos, format!("first (array) argument of 'select' has non-array sort {array_sort}")))?;
                let (idx_key, elem_key) = (idx_key.clone(), elem_key.clone());
                self.require_array_index("select", index_pos, &idx_key, &index_sort)?;
                self.need_arrays = true;
                Ok((self.backend.select(array, index), elem_key))
            }
            ArrayWord::Store => {
                self.check_nargs(pos, "store", args.len(), 3)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (array, array_sort, array_pos) = iter.next().unwrap();
                let (index, index_sort, index_pos) = iter.next().unwrap();
                let (value, value_sort, value_pos) = iter.next().unwrap();
                let (idx_key, elem_key) = array_sort
                    .array_parts()
                    .ok_or_else(|| self.semantic(array_pos, format!("first (array) argument of 'store' has non-array sort {array_sort}")))?;
                let (idx_key, elem_key) = (idx_key.clone(), elem_key.clone());
                self.require_array_index("store", index_pos, &idx_key, &index_sort)?;
                self.require_same_sort("store", value_pos, &value_sort, &elem_key)?;
                self.need_arrays = true;
                Ok((self.backend.store(array, index, value), array_sort))
            }
        }
    }

    /// Guards an extend/repeat result width against the same cap the
    /// literal `(_ bvK n)` path enforces, computed in `u64` so a huge index
    /// (`k` is parsed as an unbounded `u32`) can't wrap the sum/product
    /// before the cap is even checked.
    fn checked_bv_width(&self, pos: Position, name: &str, computed: u64) -> ParseResult<u32> {
        if computed == 0 || computed > MAX_BV_WIDTH as u64 {
            return Err(self.semantic(pos, format!("'{name}' result width {computed} out of range")));
        }
        Ok(computed as u32)
    }

    /// Array index-sort mismatches get the bit-width-specific phrasing when
    /// both sorts are bit-vectors, since that is by far the common case.
    fn require_array_index(&self, name: &str, pos: Position, want: &SortKey, got: &SortKey) -> ParseResult<()> {
        if want == got {
            return Ok(());
        }
        match (want.bv_width(), got.bv_width()) {
            (Some(w1), Some(w2)) => Err(self.semantic(
                pos,
                format!("first (array) argument of '{name}' has index bit-width {w1} but the second (index) argument has bit-width {w2}"),
            )),
            _ => Err(self.semantic(pos, format!("'{name}' index sort mismatch: array expects {want}, got {got}"))),
        }
    }

    fn reduce_indexed(&mut self, op: IndexedOp, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        match op {
            IndexedOp::Extract(hi, lo) => {
                self.check_nargs(pos, "extract", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("extract", p, &sort)?;
                if hi >= width {
                    return Err(self.semantic(
                        p,
                        format!("first (high) 'extract' parameter {hi} too large for bit-vector argument of bit-width {width}"),
                    ));
                }
                Ok((self.backend.bv_extract(hi, lo, node), SortKey::BitVec(hi - lo + 1)))
            }
            IndexedOp::ZeroExtend(k) => {
                self.check_nargs(pos, "zero_extend", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("zero_extend", p, &sort)?;
                let result_width = self.checked_bv_width(p, "zero_extend", width as u64 + k as u64)?;
                Ok((self.backend.bv_zero_extend(k, node), SortKey::BitVec(result_width)))
            }
            IndexedOp::SignExtend(k) => {
                self.check_nargs(pos, "sign_extend", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("sign_extend", p, &sort)?;
                let result_width = self.checked_bv_width(p, "sign_extend", width as u64 + k as u64)?;
                Ok((self.backend.bv_sign_extend(k, node), SortKey::BitVec(result_width)))
            }
            IndexedOp::Repeat(k) => {
                self.check_nargs(pos, "repeat", args.len(), 1)?;
                if k == 0 {
                    return Err(self.semantic(pos, "'repeat' count must be at least 1"));
                }
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("repeat", p, &sort)?;
                let result_width = self.checked_bv_width(p, "repeat", width as u64 * k as u64)?;
                Ok((self.backend.bv_repeat(k, node), SortKey::BitVec(result_width)))
            }
            IndexedOp::RotateLeft(k) => {
                self.check_nargs(pos, "rotate_left", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("rotate_left", p, &sort)?;
                Ok((self.backend.bv_rotate_left(k, node), SortKey::BitVec(width)))
            }
            IndexedOp::RotateRight(k) => {
                self.check_nargs(pos, "rotate_right", args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                let width = self.require_bv("rotate_right", p, &sort)?;
                Ok((self.backend.bv_rotate_right(k, node), SortKey::BitVec(width)))
            }
            IndexedOp::ToUbv(width) => self.reduce_fp_to_bv("to_ubv", width, args, pos, true),
            IndexedOp::ToSbv(width) => self.reduce_fp_to_bv("to_sbv", width, args, pos, false),
            IndexedOp::ToFp(eb, sb) => self.reduce_to_fp(eb, sb, args, pos, true),
            IndexedOp::ToFpUnsigned(eb, sb) => self.reduce_to_fp(eb, sb, args, pos, false),
        }
    }

    fn reduce_fp_to_bv(&mut self, name: &str, width: u32, args: Vec<WorkItem<B>>, pos: Position, unsigned: bool) -> ParseResult<(B::Node, SortKey)> {
        self.check_nargs(pos, name, args.len(), 2)?;
        let mut iter = self.exprs(args)?.into_iter();
        let (rm, rm_sort, rm_pos) = iter.next().unwrap();
        let (arg, arg_sort, arg_pos) = iter.next().unwrap();
        self.require_rm(name, rm_pos, &rm_sort)?;
        self.require_fp(name, arg_pos, &arg_sort)?;
        let result = if unsigned { self.backend.fp_to_ubv(width, rm, arg) } else { self.backend.fp_to_sbv(width, rm, arg) };
        Ok((result, SortKey::BitVec(width)))
    }

    /// `(_ to_fp eb sb)` is overloaded over its operand count and the
    /// converted value's sort; `to_fp_unsigned` only ever takes the
    /// rounding-mode-plus-unsigned-bitvector form.
    fn reduce_to_fp(&mut self, eb: u32, sb: u32, mut args: Vec<WorkItem<B>>, pos: Position, signed_variant: bool) -> ParseResult<(B::Node, SortKey)> {
        let result_sort = SortKey::FloatingPoint(eb, sb);
        if signed_variant && args.len() == 1 {
            let (node, sort, p) = self.expr(args.pop().unwrap())?;
            let width = self.require_bv("to_fp", p, &sort)?;
            if width != eb + sb {
                return Err(self.semantic(p, format!("'(_ to_fp {eb} {sb})' raw-bits form requires a bit-vector of width {}, got {width}", eb + sb)));
            }
            let result = self.backend.fp_to_fp(eb, sb, None, ToFpSource::RawBits(node));
            return Ok((result, result_sort));
        }
        let name = if signed_variant { "to_fp" } else { "to_fp_unsigned" };
        self.check_nargs(pos, name, args.len(), 2)?;
        let operand = args.pop().unwrap();
        let rm_item = args.pop().unwrap();
        let (rm, rm_sort, rm_pos) = self.expr(rm_item)?;
        self.require_rm(name, rm_pos, &rm_sort)?;
        let source = match operand {
            WorkItem::RealLit(text, _) => ToFpSource::Real(text),
            WorkItem::Expr(node, sort, p) => match sort {
                SortKey::FloatingPoint(_, _) => ToFpSource::Float(node),
                SortKey::BitVec(_) if signed_variant => ToFpSource::SignedBv(node),
                SortKey::BitVec(_) => ToFpSource::UnsignedBv(node),
                other => return Err(self.semantic(p, format!("'{name}' cannot convert from sort {other}"))),
            },
        };
        let result = self.backend.fp_to_fp(eb, sb, Some(rm), source);
        Ok((result, result_sort))
    }

    fn reduce_fp(&mut self, f: FpWord, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        let name = fp_word_name(f);
        match f {
            FpWord::FloatingPoint | FpWord::RoundingMode => Err(self.syntax(pos, format!("'{name}' is a sort, not an operator"))),
            FpWord::RneLong | FpWord::RnaLong | FpWord::RtpLong | FpWord::RtnLong | FpWord::RtzLong | FpWord::Rne | FpWord::Rna | FpWord::Rtp | FpWord::Rtn | FpWord::Rtz => {
                Err(self.syntax(pos, format!("'{name}' is a rounding-mode constant, not an operator")))
            }
            FpWord::PlusZero | FpWord::MinusZero | FpWord::PlusInf | FpWord::MinusInf | FpWord::Nan => {
                Err(self.syntax(pos, format!("'{name}' is only valid as an indexed constant, e.g. (_ {name} eb sb)")))
            }
            FpWord::ToFp | FpWord::ToFpUnsigned | FpWord::ToUbv | FpWord::ToSbv => {
                Err(self.syntax(pos, format!("'{name}' is only valid as an indexed operator, e.g. (_ {name} ...)")))
            }
            FpWord::Abs | FpWord::Neg => {
                self.check_nargs(pos, name, args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                self.require_fp(name, p, &sort)?;
                let op = if f == FpWord::Abs { FpUnaryOp::Abs } else { FpUnaryOp::Neg };
                Ok((self.backend.fp_unary(op, node), sort))
            }
            FpWord::Add | FpWord::Sub | FpWord::Mul | FpWord::Div => {
                self.check_nargs(pos, name, args.len(), 3)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (rm, rm_sort, rm_pos) = iter.next().unwrap();
                let (lhs, lhs_sort, lhs_pos) = iter.next().unwrap();
                let (rhs, rhs_sort, rhs_pos) = iter.next().unwrap();
                self.require_rm(name, rm_pos, &rm_sort)?;
                self.require_fp(name, lhs_pos, &lhs_sort)?;
                self.require_fp(name, rhs_pos, &rhs_sort)?;
                self.require_same_sort(name, rhs_pos, &rhs_sort, &lhs_sort)?;
                let op = match f {
                    FpWord::Add => FpBinaryOp::Add,
                    FpWord::Sub => FpBinaryOp::Sub,
                    FpWord::Mul => FpBinaryOp::Mul,
                    _ => FpBinaryOp::Div,
                };
                Ok((self.backend.fp_binary(op, rm, lhs, rhs), lhs_sort))
            }
            FpWord::Fma => {
                self.check_nargs(pos, "fp.fma", args.len(), 4)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (rm, rm_sort, rm_pos) = iter.next().unwrap();
                let (a, a_sort, a_pos) = iter.next().unwrap();
                let (b, b_sort, b_pos) = iter.next().unwrap();
                let (c, c_sort, c_pos) = iter.next().unwrap();
                self.require_rm("fp.fma", rm_pos, &rm_sort)?;
                self.require_fp("fp.fma", a_pos, &a_sort)?;
                self.require_fp("fp.fma", b_pos, &b_sort)?;
                self.require_fp("fp.fma", c_pos, &c_sort)?;
                self.require_same_sort("fp.fma", b_pos, &b_sort, &a_sort)?;
                self.require_same_sort("fp.fma", c_pos, &c_sort, &a_sort)?;
                Ok((self.backend.fp_fma(rm, a, b, c), a_sort))
            }
            FpWord::Sqrt | FpWord::RoundToIntegral => {
                self.check_nargs(pos, name, args.len(), 2)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (rm, rm_sort, rm_pos) = iter.next().unwrap();
                let (arg, arg_sort, arg_pos) = iter.next().unwrap();
                self.require_rm(name, rm_pos, &rm_sort)?;
                self.require_fp(name, arg_pos, &arg_sort)?;
                let op = if f == FpWord::Sqrt { FpRoundedUnaryOp::Sqrt } else { FpRoundedUnaryOp::RoundToIntegral };
                Ok((self.backend.fp_rounded_unary(op, rm, arg), arg_sort))
            }
            FpWord::Rem | FpWord::Min | FpWord::Max => {
                self.check_nargs(pos, name, args.len(), 2)?;
                let mut iter = self.exprs(args)?.into_iter();
                let (lhs, lhs_sort, lhs_pos) = iter.next().unwrap();
                let (rhs, rhs_sort, rhs_pos) = iter.next().unwrap();
                self.require_fp(name, lhs_pos, &lhs_sort)?;
                self.require_fp(name, rhs_pos, &rhs_sort)?;
                self.require_same_sort(name, rhs_pos, &rhs_sort, &lhs_sort)?;
                let op = match f {
                    FpWord::Rem => FpUnroundedBinaryOp::Rem,
                    FpWord::Min => FpUnroundedBinaryOp::Min,
                    _ => FpUnroundedBinaryOp::Max,
                };
                Ok((self.backend.fp_unrounded_binary(op, lhs, rhs), lhs_sort))
            }
            FpWord::Leq | FpWord::Lt | FpWord::Geq | FpWord::Gt | FpWord::Eq => {
                self.check_nargs_at_least(pos, name, args.len(), 2)?;
                let exprs = self.exprs(args)?;
                let sort0 = exprs[0].1.clone();
                self.require_fp(name, exprs[0].2, &sort0)?;
                let mut nodes = Vec::with_capacity(exprs.len());
                for (node, sort, p) in exprs {
                    self.require_fp(name, p, &sort)?;
                    self.require_same_sort(name, p, &sort, &sort0)?;
                    nodes.push(node);
                }
                let op = match f {
                    FpWord::Leq => FpCompareOp::Leq,
                    FpWord::Lt => FpCompareOp::Lt,
                    FpWord::Geq => FpCompareOp::Geq,
                    FpWord::Gt => FpCompareOp::Gt,
                    _ => FpCompareOp::Eq,
                };
                let pairs: Vec<_> = nodes.windows(2).map(|w| self.backend.fp_compare(op, w[0].clone(), w[1].clone())).collect();
                let result = if pairs.len() == 1 { pairs.into_iter().next().unwrap() } else { self.backend.bool_fold(BoolFoldOp::And, pairs) };
                Ok((result, SortKey::Bool))
            }
            FpWord::IsNormal | FpWord::IsSubnormal | FpWord::IsZero | FpWord::IsInfinite | FpWord::IsNan | FpWord::IsNegative | FpWord::IsPositive => {
                self.check_nargs(pos, name, args.len(), 1)?;
                let (node, sort, p) = self.expr(args.into_iter().next().unwrap())?;
                self.require_fp(name, p, &sort)?;
                let op = match f {
                    FpWord::IsNormal => FpPredicateOp::IsNormal,
                    FpWord::IsSubnormal => FpPredicateOp::IsSubnormal,
                    FpWord::IsZero => FpPredicateOp::IsZero,
                    FpWord::IsInfinite => FpPredicateOp::IsInfinite,
                    FpWord::IsNan => FpPredicateOp::IsNan,
                    FpWord::IsNegative => FpPredicateOp::IsNegative,
                    _ => FpPredicateOp::IsPositive,
                };
                Ok((self.backend.fp_predicate(op, node), SortKey::Bool))
            }
            FpWord::ToReal => Err(self.capability(pos, "'fp.to_real' is not supported: this build has no Real sort")),
        }
    }

    fn reduce_as_const(&mut self, sort: SortKey, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        self.check_nargs(pos, "as const", args.len(), 1)?;
        let (node, value_sort, p) = self.expr(args.into_iter().next().unwrap())?;
        let (_, elem_key) = sort.array_parts().expect("AsConst always carries an array sort");
        let elem_key = elem_key.clone();
        self.require_same_sort("as const", p, &value_sort, &elem_key)?;
        let array_sort = self.sorts.materialize(&mut self.backend, &sort);
        self.need_arrays = true;
        Ok((self.backend.const_array(&array_sort, node), sort))
    }

    fn reduce_apply(&mut self, info: ApplyInfo<B>, args: Vec<WorkItem<B>>, pos: Position) -> ParseResult<(B::Node, SortKey)> {
        self.check_nargs(pos, &info.name, args.len(), info.param_sorts.len())?;
        let exprs = self.exprs(args)?;
        let mut nodes = Vec::with_capacity(exprs.len());
        for ((node, sort, p), want) in exprs.into_iter().zip(info.param_sorts.iter()) {
            self.require_same_sort(&info.name, p, &sort, want)?;
            nodes.push(node);
        }
        self.need_functions = true;
        Ok((self.backend.apply(info.func_node, nodes), info.result_sort))
    }
}

fn bv_word_name(op: BvWord) -> &'static str {
    match op {
        BvWord::BitVec => "BitVec",
        BvWord::Concat => "concat",
        BvWord::Extract => "extract",
        BvWord::Not => "bvnot",
        BvWord::Neg => "bvneg",
        BvWord::And => "bvand",
        BvWord::Or => "bvor",
        BvWord::Xor => "bvxor",
        BvWord::Xnor => "bvxnor",
        BvWord::Nand => "bvnand",
        BvWord::Nor => "bvnor",
        BvWord::Add => "bvadd",
        BvWord::Sub => "bvsub",
        BvWord::Mul => "bvmul",
        BvWord::Udiv => "bvudiv",
        BvWord::Urem => "bvurem",
        BvWord::Sdiv => "bvsdiv",
        BvWord::Srem => "bvsrem",
        BvWord::Smod => "bvsmod",
        BvWord::Shl => "bvshl",
        BvWord::Lshr => "bvlshr",
        BvWord::Ashr => "bvashr",
        BvWord::Ult => "bvult",
        BvWord::Ule => "bvule",
        BvWord::Ugt => "bvugt",
        BvWord::Uge => "bvuge",
        BvWord::Slt => "bvslt",
        BvWord::Sle => "bvsle",
        BvWord::Sgt => "bvsgt",
        BvWord::Sge => "bvsge",
        BvWord::Comp => "bvcomp",
        BvWord::Redor => "bvredor",
        BvWord::Redand => "bvredand",
        BvWord::ZeroExtend => "zero_extend",
        BvWord::SignExtend => "sign_extend",
        BvWord::Repeat => "repeat",
        BvWord::RotateLeft => "rotate_left",
        BvWord::RotateRight => "rotate_right",
        BvWord::ExtRotateLeft => "ext_rotate_left",
        BvWord::ExtRotateRight => "ext_rotate_right",
    }
}

fn fp_word_name(f: FpWord) -> &'static str {
    match f {
        FpWord::FloatingPoint => "FloatingPoint",
        FpWord::RoundingMode => "RoundingMode",
        FpWord::RneLong => "roundNearestTiesToEven",
        FpWord::RnaLong => "roundNearestTiesToAway",
        FpWord::RtpLong => "roundTowardPositive",
        FpWord::RtnLong => "roundTowardNegative",
        FpWord::RtzLong => "roundTowardZero",
        FpWord::Rne => "RNE",
        FpWord::Rna => "RNA",
        FpWord::Rtp => "RTP",
        FpWord::Rtn => "RTN",
        FpWord::Rtz => "RTZ",
        FpWord::PlusZero => "+zero",
        FpWord::MinusZero => "-zero",
        FpWord::PlusInf => "+oo",
        FpWord::MinusInf => "-oo",
        FpWord::Nan => "NaN",
        FpWord::ToFp => "to_fp",
        FpWord::ToFpUnsigned => "to_fp_unsigned",
        FpWord::Abs => "fp.abs",
        FpWord::Neg => "fp.neg",
        FpWord::Add => "fp.add",
        FpWord::Sub => "fp.sub",
        FpWord::Mul => "fp.mul",
        FpWord::Div => "fp.div",
        FpWord::Fma => "fp.fma",
        FpWord::Sqrt => "fp.sqrt",
        FpWord::Rem => "fp.rem",
        FpWord::RoundToIntegral => "fp.roundToIntegral",
        FpWord::Min => "fp.min",
        FpWord::Max => "fp.max",
        FpWord::Leq => "fp.leq",
        FpWord::Lt => "fp.lt",
        FpWord::Geq => "fp.geq",
        FpWord::Gt => "fp.gt",
        FpWord::Eq => "fp.eq",
        FpWord::IsNormal => "fp.isNormal",
        FpWord::IsSubnormal => "fp.isSubnormal",
        FpWord::IsZero => "fp.isZero",
        FpWord::IsInfinite => "fp.isInfinite",
        FpWord::IsNan => "fp.isNaN",
        FpWord::IsNegative => "fp.isNegative",
        FpWord::IsPositive => "fp.isPositive",
        FpWord::ToUbv => "fp.to_ubv",
        FpWord::ToSbv => "fp.to_sbv",
        FpWord::ToReal => "fp.to_real",
    }
}
