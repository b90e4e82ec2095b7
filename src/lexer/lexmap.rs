//! Keyword table: pre-populated recognition of reserved words, theory
//! operators, command names and logic names.
//!
//! Mirrors the role of the upstream solver's "keyword table" component:
//! after the lexer assembles a symbol's text, it is looked up here first.
//! A hit returns the already-tagged `TokenKind` (this is how reserved words,
//! theory operators and command names all flow through one lookup); a miss
//! falls back to a plain `Symbol`.
use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::token::{ArrayWord, Command, Core, BvWord, FpWord, Reserved, TokenKind};

#[derive(Debug, Default)]
pub struct LexMap {
    map: HashMap<&'static str, TokenKind>,
}

impl LexMap {
    pub fn insert(&mut self, key: &'static str, value: TokenKind) {
        self.map.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<TokenKind> {
        self.map.get(key).cloned()
    }
}

macro_rules! kw {
    ($map:ident, $value:expr, $($name:expr),+ $(,)?) => {
        $( $map.insert($name, $value); )+
    };
}

static LOGIC_NAMES: &[&str] = &[
    "QF_BV", "QF_UFBV", "QF_ABV", "QF_AUFBV", "BV", "UFBV", "ABV", "AUFBV",
    "QF_FP", "QF_FPBV", "FP", "FPBV", "ALL",
];

pub static LEX_MAP: Lazy<LexMap> = Lazy::new(|| {
    let mut m = LexMap::default();

    kw!(m, TokenKind::Reserved(Reserved::Underscore), "_");
    kw!(m, TokenKind::Reserved(Reserved::Bang), "!");
    kw!(m, TokenKind::Reserved(Reserved::As), "as");
    kw!(m, TokenKind::Reserved(Reserved::Let), "let");
    kw!(m, TokenKind::Reserved(Reserved::Forall), "forall");
    kw!(m, TokenKind::Reserved(Reserved::Exists), "exists");
    kw!(m, TokenKind::Reserved(Reserved::Par), "par");
    kw!(m, TokenKind::Reserved(Reserved::Decimal), "DECIMAL");
    kw!(m, TokenKind::Reserved(Reserved::StringSort), "STRING");
    kw!(m, TokenKind::Reserved(Reserved::NumeralSort), "NUMERAL");

    kw!(m, TokenKind::Command(Command::SetLogic), "set-logic");
    kw!(m, TokenKind::Command(Command::SetOption), "set-option");
    kw!(m, TokenKind::Command(Command::SetInfo), "set-info");
    kw!(m, TokenKind::Command(Command::DeclareSort), "declare-sort");
    kw!(m, TokenKind::Command(Command::DefineSort), "define-sort");
    kw!(m, TokenKind::Command(Command::DeclareConst), "declare-const");
    kw!(m, TokenKind::Command(Command::DeclareFun), "declare-fun");
    kw!(m, TokenKind::Command(Command::DefineFun), "define-fun");
    kw!(m, TokenKind::Command(Command::Assert), "assert");
    kw!(m, TokenKind::Command(Command::CheckSat), "check-sat");
    kw!(m, TokenKind::Command(Command::CheckSatAssuming), "check-sat-assuming");
    kw!(m, TokenKind::Command(Command::GetModel), "get-model");
    kw!(m, TokenKind::Command(Command::GetValue), "get-value");
    kw!(m, TokenKind::Command(Command::GetUnsatAssumptions), "get-unsat-assumptions");
    kw!(m, TokenKind::Command(Command::Push), "push");
    kw!(m, TokenKind::Command(Command::Pop), "pop");
    kw!(m, TokenKind::Command(Command::Echo), "echo");
    kw!(m, TokenKind::Command(Command::Exit), "exit");
    kw!(m, TokenKind::Command(Command::Model), "model");

    kw!(m, TokenKind::Core(Core::Bool), "Bool");
    kw!(m, TokenKind::Core(Core::True), "true");
    kw!(m, TokenKind::Core(Core::False), "false");
    kw!(m, TokenKind::Core(Core::Eq), "=");
    kw!(m, TokenKind::Core(Core::Distinct), "distinct");
    kw!(m, TokenKind::Core(Core::Ite), "ite");
    kw!(m, TokenKind::Core(Core::And), "and");
    kw!(m, TokenKind::Core(Core::Or), "or");
    kw!(m, TokenKind::Core(Core::Xor), "xor");
    kw!(m, TokenKind::Core(Core::Not), "not");
    kw!(m, TokenKind::Core(Core::Implies), "=>");

    kw!(m, TokenKind::Array(ArrayWord::Array), "Array");
    kw!(m, TokenKind::Array(ArrayWord::Select), "select");
    kw!(m, TokenKind::Array(ArrayWord::Store), "store");

    kw!(m, TokenKind::Bv(BvWord::BitVec), "BitVec");
    kw!(m, TokenKind::Bv(BvWord::Concat), "concat");
    kw!(m, TokenKind::Bv(BvWord::Extract), "extract");
    kw!(m, TokenKind::Bv(BvWord::Not), "bvnot");
    kw!(m, TokenKind::Bv(BvWord::Neg), "bvneg");
    kw!(m, TokenKind::Bv(BvWord::And), "bvand");
    kw!(m, TokenKind::Bv(BvWord::Or), "bvor");
    kw!(m, TokenKind::Bv(BvWord::Xor), "bvxor");
    kw!(m, TokenKind::Bv(BvWord::Xnor), "bvxnor");
    kw!(m, TokenKind::Bv(BvWord::Nand), "bvnand");
    kw!(m, TokenKind::Bv(BvWord::Nor), "bvnor");
    kw!(m, TokenKind::Bv(BvWord::Add), "bvadd");
    kw!(m, TokenKind::Bv(BvWord::Sub), "bvsub");
    kw!(m, TokenKind::Bv(BvWord::Mul), "bvmul");
    kw!(m, TokenKind::Bv(BvWord::Udiv), "bvudiv");
    kw!(m, TokenKind::Bv(BvWord::Urem), "bvurem");
    kw!(m, TokenKind::Bv(BvWord::Sdiv), "bvsdiv");
    kw!(m, TokenKind::Bv(BvWord::Srem), "bvsrem");
    kw!(m, TokenKind::Bv(BvWord::Smod), "bvsmod");
    kw!(m, TokenKind::Bv(BvWord::Shl), "bvshl");
    kw!(m, TokenKind::Bv(BvWord::Lshr), "bvlshr");
    kw!(m, TokenKind::Bv(BvWord::Ashr), "bvashr");
    kw!(m, TokenKind::Bv(BvWord::Ult), "bvult");
    kw!(m, TokenKind::Bv(BvWord::Ule), "bvule");
    kw!(m, TokenKind::Bv(BvWord::Ugt), "bvugt");
    kw!(m, TokenKind::Bv(BvWord::Uge), "bvuge");
    kw!(m, TokenKind::Bv(BvWord::Slt), "bvslt");
    kw!(m, TokenKind::Bv(BvWord::Sle), "bvsle");
    kw!(m, TokenKind::Bv(BvWord::Sgt), "bvsgt");
    kw!(m, TokenKind::Bv(BvWord::Sge), "bvsge");
    kw!(m, TokenKind::Bv(BvWord::Comp), "bvcomp");
    kw!(m, TokenKind::Bv(BvWord::Redor), "bvredor");
    kw!(m, TokenKind::Bv(BvWord::Redand), "bvredand");
    kw!(m, TokenKind::Bv(BvWord::ZeroExtend), "zero_extend");
    kw!(m, TokenKind::Bv(BvWord::SignExtend), "sign_extend");
    kw!(m, TokenKind::Bv(BvWord::Repeat), "repeat");
    kw!(m, TokenKind::Bv(BvWord::RotateLeft), "rotate_left");
    kw!(m, TokenKind::Bv(BvWord::RotateRight), "rotate_right");
    kw!(m, TokenKind::Bv(BvWord::ExtRotateLeft), "ext_rotate_left");
    kw!(m, TokenKind::Bv(BvWord::ExtRotateRight), "ext_rotate_right");

    kw!(m, TokenKind::Fp(FpWord::FloatingPoint), "FloatingPoint");
    kw!(m, TokenKind::Fp(FpWord::RoundingMode), "RoundingMode");
    kw!(m, TokenKind::Fp(FpWord::RneLong), "roundNearestTiesToEven");
    kw!(m, TokenKind::Fp(FpWord::RnaLong), "roundNearestTiesToAway");
    kw!(m, TokenKind::Fp(FpWord::RtpLong), "roundTowardPositive");
    kw!(m, TokenKind::Fp(FpWord::RtnLong), "roundTowardNegative");
    kw!(m, TokenKind::Fp(FpWord::RtzLong), "roundTowardZero");
    kw!(m, TokenKind::Fp(FpWord::Rne), "RNE");
    kw!(m, TokenKind::Fp(FpWord::Rna), "RNA");
    kw!(m, TokenKind::Fp(FpWord::Rtp), "RTP");
    kw!(m, TokenKind::Fp(FpWord::Rtn), "RTN");
    kw!(m, TokenKind::Fp(FpWord::Rtz), "RTZ");
    kw!(m, TokenKind::Fp(FpWord::PlusZero), "+zero");
    kw!(m, TokenKind::Fp(FpWord::MinusZero), "-zero");
    kw!(m, TokenKind::Fp(FpWord::PlusInf), "+oo");
    kw!(m, TokenKind::Fp(FpWord::MinusInf), "-oo");
    kw!(m, TokenKind::Fp(FpWord::Nan), "NaN");
    kw!(m, TokenKind::Fp(FpWord::ToFp), "to_fp");
    kw!(m, TokenKind::Fp(FpWord::ToFpUnsigned), "to_fp_unsigned");
    kw!(m, TokenKind::Fp(FpWord::Abs), "fp.abs");
    kw!(m, TokenKind::Fp(FpWord::Neg), "fp.neg");
    kw!(m, TokenKind::Fp(FpWord::Add), "fp.add");
    kw!(m, TokenKind::Fp(FpWord::Sub), "fp.sub");
    kw!(m, TokenKind::Fp(FpWord::Mul), "fp.mul");
    kw!(m, TokenKind::Fp(FpWord::Div), "fp.div");
    kw!(m, TokenKind::Fp(FpWord::Fma), "fp.fma");
    kw!(m, TokenKind::Fp(FpWord::Sqrt), "fp.sqrt");
    kw!(m, TokenKind::Fp(FpWord::Rem), "fp.rem");
    kw!(m, TokenKind::Fp(FpWord::RoundToIntegral), "fp.roundToIntegral");
    kw!(m, TokenKind::Fp(FpWord::Min), "fp.min");
    kw!(m, TokenKind::Fp(FpWord::Max), "fp.max");
    kw!(m, TokenKind::Fp(FpWord::Leq), "fp.leq");
    kw!(m, TokenKind::Fp(FpWord::Lt), "fp.lt");
    kw!(m, TokenKind::Fp(FpWord::Geq), "fp.geq");
    kw!(m, TokenKind::Fp(FpWord::Gt), "fp.gt");
    kw!(m, TokenKind::Fp(FpWord::Eq), "fp.eq");
    kw!(m, TokenKind::Fp(FpWord::IsNormal), "fp.isNormal");
    kw!(m, TokenKind::Fp(FpWord::IsSubnormal), "fp.isSubnormal");
    kw!(m, TokenKind::Fp(FpWord::IsZero), "fp.isZero");
    kw!(m, TokenKind::Fp(FpWord::IsInfinite), "fp.isInfinite");
    kw!(m, TokenKind::Fp(FpWord::IsNan), "fp.isNaN");
    kw!(m, TokenKind::Fp(FpWord::IsNegative), "fp.isNegative");
    kw!(m, TokenKind::Fp(FpWord::IsPositive), "fp.isPositive");
    kw!(m, TokenKind::Fp(FpWord::ToUbv), "fp.to_ubv");
    kw!(m, TokenKind::Fp(FpWord::ToSbv), "fp.to_sbv");
    kw!(m, TokenKind::Fp(FpWord::ToReal), "fp.to_real");

    for name in LOGIC_NAMES {
        m.insert(name, TokenKind::Logic(name.to_string()));
    }

    m
});

/// `Float16/32/64/128` are sort aliases, not lexer keywords: they are
/// resolved by the sort system (`sort::resolve_named_sort`), not here.
pub fn lookup(text: &str) -> Option<TokenKind> {
    LEX_MAP.get(text)
}
