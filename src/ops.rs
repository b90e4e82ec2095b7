//! Operator-grouping enums shared between the term parser's reduction rules
//! and the `Backend` trait. Keeping these independent of both `lexer` and
//! `parser` lets the backend crate depend on this module alone.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolFoldOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvUnaryOp {
    Not,
    Neg,
    Redor,
    Redand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvNaryOp {
    Concat,
    And,
    Or,
    Xor,
    Xnor,
    Add,
    Sub,
    Mul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvBinaryOp {
    Udiv,
    Urem,
    Sdiv,
    Srem,
    Smod,
    Shl,
    Lshr,
    Ashr,
    Nand,
    Nor,
    Comp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvCompareOp {
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    Rne,
    Rna,
    Rtp,
    Rtn,
    Rtz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpSpecial {
    PlusZero,
    MinusZero,
    PlusInf,
    MinusInf,
    Nan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpUnaryOp {
    Abs,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpRoundedUnaryOp {
    Sqrt,
    RoundToIntegral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpUnroundedBinaryOp {
    Rem,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpCompareOp {
    Leq,
    Lt,
    Geq,
    Gt,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpPredicateOp {
    IsNormal,
    IsSubnormal,
    IsZero,
    IsInfinite,
    IsNan,
    IsNegative,
    IsPositive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown,
}

impl std::fmt::Display for SatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SatResult::Sat => "sat",
            SatResult::Unsat => "unsat",
            SatResult::Unknown => "unknown",
        })
    }
}
