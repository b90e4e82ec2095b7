//! The operator tag carried by a reduced `(op arg*)` form's `Op` work item.
//!
//! A tagged variant rather than a bit-packed integer (per the redesign
//! note): dispatch in `reduce` matches on this exhaustively instead of
//! re-deriving the theory class from an operator id.
use crate::backend::Backend;
use crate::lexer::{ArrayWord, BvWord, Core, FpWord};
use crate::sort::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedOp {
    Extract(u32, u32),
    ZeroExtend(u32),
    SignExtend(u32),
    Repeat(u32),
    RotateLeft(u32),
    RotateRight(u32),
    ToFp(u32, u32),
    ToFpUnsigned(u32, u32),
    ToUbv(u32),
    ToSbv(u32),
}

/// Everything `reduce_apply` needs, captured at the call site instead of
/// looked up again by id: the declaring table entry may be in a scope that
/// closes before the enclosing form finishes reducing (e.g. a function
/// declared inside a `let` binding's own scope is never legal SMT-LIB, but a
/// quantified variable's shadow of an outer function name is, and by the
/// time `reduce` runs the symbol table has moved on).
#[derive(Debug, Clone)]
pub struct ApplyInfo<B: Backend> {
    pub name: String,
    pub func_node: B::Node,
    pub param_sorts: Vec<SortKey>,
    pub result_sort: SortKey,
}

#[derive(Debug, Clone)]
pub enum Operator<B: Backend> {
    Core(Core),
    Array(ArrayWord),
    Bv(BvWord),
    Fp(FpWord),
    Indexed(IndexedOp),
    /// `(as const (Array I E))`: carries the already-parsed array sort.
    AsConst(SortKey),
    /// A user function symbol applied to arguments.
    Apply(ApplyInfo<B>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Core,
    Array,
    Bv,
    Fp,
    Apply,
}

pub fn class_of<B: Backend>(op: &Operator<B>) -> Class {
    match op {
        Operator::Core(_) | Operator::AsConst(_) => Class::Core,
        Operator::Array(_) => Class::Array,
        Operator::Bv(_) | Operator::Indexed(_) => Class::Bv,
        Operator::Fp(_) => Class::Fp,
        Operator::Apply(_) => Class::Apply,
    }
}
