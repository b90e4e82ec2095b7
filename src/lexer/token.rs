//! Token representation and tag-class partitioning.
use std::fmt::Display;

pub type Position = (usize, usize);

/// The coarse tag-class a token belongs to. Kept as a separate enum (rather
/// than packed into the high bits of an integer, as the upstream solver
/// does) so dispatch in the parser can match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Other,
    Constant,
    Reserved,
    Command,
    Keyword,
    Core,
    Array,
    Bv,
    Fp,
    Logic,
}

/// Reserved words with special parsing significance, beyond plain operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reserved {
    Underscore,
    Bang,
    As,
    Let,
    Forall,
    Exists,
    Par,
    Decimal,
    StringSort,
    NumeralSort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetLogic,
    SetOption,
    SetInfo,
    DeclareSort,
    DefineSort,
    DeclareConst,
    DeclareFun,
    DefineFun,
    Assert,
    CheckSat,
    CheckSatAssuming,
    GetModel,
    GetValue,
    GetUnsatAssumptions,
    Push,
    Pop,
    Echo,
    Exit,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Core {
    Bool,
    True,
    False,
    Eq,
    Distinct,
    Ite,
    And,
    Or,
    Xor,
    Not,
    Implies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayWord {
    Array,
    Select,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvWord {
    BitVec,
    Concat,
    Extract,
    Not,
    Neg,
    And,
    Or,
    Xor,
    Xnor,
    Nand,
    Nor,
    Add,
    Sub,
    Mul,
    Udiv,
    Urem,
    Sdiv,
    Srem,
    Smod,
    Shl,
    Lshr,
    Ashr,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
    Comp,
    Redor,
    Redand,
    ZeroExtend,
    SignExtend,
    Repeat,
    RotateLeft,
    RotateRight,
    ExtRotateLeft,
    ExtRotateRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpWord {
    FloatingPoint,
    RoundingMode,
    RneLong,
    RnaLong,
    RtpLong,
    RtnLong,
    RtzLong,
    Rne,
    Rna,
    Rtp,
    Rtn,
    Rtz,
    PlusZero,
    MinusZero,
    PlusInf,
    MinusInf,
    Nan,
    ToFp,
    ToFpUnsigned,
    Abs,
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Fma,
    Sqrt,
    Rem,
    RoundToIntegral,
    Min,
    Max,
    Leq,
    Lt,
    Geq,
    Gt,
    Eq,
    IsNormal,
    IsSubnormal,
    IsZero,
    IsInfinite,
    IsNan,
    IsNegative,
    IsPositive,
    ToUbv,
    ToSbv,
    ToReal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LPar,
    RPar,
    Symbol(String),
    Keyword(String),
    /// Raw decimal digits; kept as text (not `u64`) since bit-vector widths
    /// and `bv<K>` magnitudes can exceed 64 bits.
    Numeral(String),
    Decimal(String),
    HexConst(String),
    BinConst(String),
    StringLit(String),
    Reserved(Reserved),
    Command(Command),
    Core(Core),
    Array(ArrayWord),
    Bv(BvWord),
    Fp(FpWord),
    Logic(String),
    Eof,
}

impl TokenKind {
    pub fn class(&self) -> Class {
        use TokenKind::*;
        match self {
            LPar | RPar | Symbol(_) | Eof => Class::Other,
            Numeral(_) | Decimal(_) | HexConst(_) | BinConst(_) | StringLit(_) => {
                Class::Constant
            }
            Reserved(_) => Class::Reserved,
            Command(_) => Class::Command,
            Keyword(_) => Class::Keyword,
            Core(_) => Class::Core,
            Array(_) => Class::Array,
            Bv(_) => Class::Bv,
            Fp(_) => Class::Fp,
            Logic(_) => Class::Logic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn class(&self) -> Class {
        self.kind.class()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
