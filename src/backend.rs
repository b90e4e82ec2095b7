//! The solver backend boundary.
//!
//! `Backend` is the abstract capability the parser drives: sort and term
//! constructors, the assertion stack, `check-sat`, and model/value
//! extraction. The parser owns no solver state of its own; every node it
//! builds or releases flows through this trait. Kept synchronous per the
//! single-threaded parse loop.
use crate::ops::*;
use crate::sort::SortKey;

/// Source of the value being converted by `(_ to_fp eb sb) ...`.
#[derive(Debug)]
pub enum ToFpSource<N> {
    Real(String),
    SignedBv(N),
    UnsignedBv(N),
    Float(N),
    /// `(_ to_fp eb sb)` applied directly to a bit-vector of width `eb+sb`:
    /// reinterpret the bits, no rounding mode.
    RawBits(N),
}

pub trait Backend {
    type Sort: Clone + std::fmt::Debug;
    type Node: Clone + std::fmt::Debug;

    // -- sort constructors, invoked at most once per distinct `SortKey` --
    fn bool_sort(&mut self) -> Self::Sort;
    fn bitvec_sort(&mut self, width: u32) -> Self::Sort;
    fn float_sort(&mut self, eb: u32, sb: u32) -> Self::Sort;
    fn rounding_mode_sort(&mut self) -> Self::Sort;
    fn array_sort(&mut self, index: Self::Sort, element: Self::Sort) -> Self::Sort;
    fn fun_sort(&mut self, args: Vec<Self::Sort>, result: Self::Sort) -> Self::Sort;

    // -- constant / variable / parameter / function constructors --
    fn bool_const(&mut self, value: bool) -> Self::Node;
    /// `bits` is a string of `'0'`/`'1'` characters, most-significant first;
    /// its length is the constant's width.
    fn bv_const(&mut self, bits: &str) -> Self::Node;
    fn rm_const(&mut self, mode: RoundingMode) -> Self::Node;
    fn fp_special(&mut self, kind: FpSpecial, eb: u32, sb: u32) -> Self::Node;
    fn declare_var(&mut self, name: &str, sort: &Self::Sort) -> Self::Node;
    /// Declares a quantifier-bound parameter. `name` is already the unique
    /// `sym!N` internal name the parser generated to avoid collisions.
    fn declare_param(&mut self, name: &str, sort: &Self::Sort) -> Self::Node;
    fn declare_fun(&mut self, name: &str, arg_sorts: &[Self::Sort], result_sort: &Self::Sort) -> Self::Node;

    // -- boolean / core --
    fn bool_fold(&mut self, op: BoolFoldOp, args: Vec<Self::Node>) -> Self::Node;
    fn implies(&mut self, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn not(&mut self, arg: Self::Node) -> Self::Node;
    fn eq(&mut self, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn distinct_pair(&mut self, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn ite(&mut self, cond: Self::Node, then_: Self::Node, else_: Self::Node) -> Self::Node;

    // -- bit-vectors --
    fn bv_unary(&mut self, op: BvUnaryOp, arg: Self::Node) -> Self::Node;
    fn bv_nary(&mut self, op: BvNaryOp, args: Vec<Self::Node>) -> Self::Node;
    fn bv_binary(&mut self, op: BvBinaryOp, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn bv_compare(&mut self, op: BvCompareOp, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn bv_extract(&mut self, hi: u32, lo: u32, arg: Self::Node) -> Self::Node;
    fn bv_zero_extend(&mut self, k: u32, arg: Self::Node) -> Self::Node;
    fn bv_sign_extend(&mut self, k: u32, arg: Self::Node) -> Self::Node;
    fn bv_repeat(&mut self, k: u32, arg: Self::Node) -> Self::Node;
    fn bv_rotate_left(&mut self, k: u32, arg: Self::Node) -> Self::Node;
    fn bv_rotate_right(&mut self, k: u32, arg: Self::Node) -> Self::Node;
    /// `Some(bits)` (MSB-first) if `node` is a concrete bit-vector constant,
    /// whether literal or folded; used by `ext_rotate_left`/`ext_rotate_right`,
    /// whose second argument must be a constant.
    fn bv_literal_value(&self, node: &Self::Node) -> Option<String>;

    // -- arrays --
    fn select(&mut self, array: Self::Node, index: Self::Node) -> Self::Node;
    fn store(&mut self, array: Self::Node, index: Self::Node, value: Self::Node) -> Self::Node;
    fn const_array(&mut self, array_sort: &Self::Sort, value: Self::Node) -> Self::Node;

    // -- floating point --
    fn fp_unary(&mut self, op: FpUnaryOp, arg: Self::Node) -> Self::Node;
    fn fp_rounded_unary(&mut self, op: FpRoundedUnaryOp, rm: Self::Node, arg: Self::Node) -> Self::Node;
    fn fp_binary(&mut self, op: FpBinaryOp, rm: Self::Node, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn fp_unrounded_binary(&mut self, op: FpUnroundedBinaryOp, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn fp_fma(&mut self, rm: Self::Node, a: Self::Node, b: Self::Node, c: Self::Node) -> Self::Node;
    fn fp_compare(&mut self, op: FpCompareOp, lhs: Self::Node, rhs: Self::Node) -> Self::Node;
    fn fp_predicate(&mut self, op: FpPredicateOp, arg: Self::Node) -> Self::Node;
    fn fp_to_fp(&mut self, eb: u32, sb: u32, rm: Option<Self::Node>, source: ToFpSource<Self::Node>) -> Self::Node;
    fn fp_to_ubv(&mut self, width: u32, rm: Self::Node, arg: Self::Node) -> Self::Node;
    fn fp_to_sbv(&mut self, width: u32, rm: Self::Node, arg: Self::Node) -> Self::Node;
    fn fp_to_real(&mut self, arg: Self::Node) -> Self::Node;

    // -- uninterpreted functions / quantifiers --
    fn apply(&mut self, func: Self::Node, args: Vec<Self::Node>) -> Self::Node;
    fn forall(&mut self, params: Vec<Self::Node>, body: Self::Node) -> Self::Node;
    fn exists(&mut self, params: Vec<Self::Node>, body: Self::Node) -> Self::Node;

    // -- assertion stack / solving --
    fn assert(&mut self, node: Self::Node);
    fn push(&mut self, n: u32);
    fn pop(&mut self, n: u32);
    fn check_sat(&mut self) -> SatResult;
    fn check_sat_assuming(&mut self, assumptions: Vec<Self::Node>) -> SatResult;
    /// Indices into the assumption list passed to the last `check_sat_assuming`.
    fn get_failed_assumptions(&self) -> Vec<usize>;

    // -- lifecycle / options / output --
    fn release(&mut self, node: Self::Node);
    fn set_symbol(&mut self, node: &Self::Node, name: &str);
    fn terminate_requested(&self) -> bool;
    fn set_option(&mut self, name: &str, value: &str);
    fn produce_models(&self) -> bool;
    fn get_model(&self) -> String;
    fn get_value(&mut self, nodes: &[Self::Node]) -> Vec<String>;
}

pub mod test_backend {
    //! An in-memory `Backend` used by unit and integration tests. It
    //! records every call it receives (for assertions on dispatch) and
    //! computes enough of the semantics (constant folding on bit-vectors,
    //! a tiny constraint store) to answer `check-sat` for the literal
    //! scenarios exercised in `tests/scenarios.rs`.
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Value {
        Bool(bool),
        Bv(String),
        Other(String),
    }

    #[derive(Debug, Clone)]
    pub struct Node {
        pub id: u64,
        pub value: Option<Value>,
        pub text: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Sort {
        Bool,
        Bv(u32),
        Fp(u32, u32),
        RoundingMode,
        Array(Box<Sort>, Box<Sort>),
        Fun(Vec<Sort>, Box<Sort>),
    }

    #[derive(Default)]
    pub struct RecordingBackend {
        pub next_id: u64,
        pub calls: Vec<String>,
        pub bitvec_sort_calls: u32,
        pub asserted: Vec<Node>,
        pub assumptions: Vec<Node>,
        pub failed: HashSet<usize>,
        pub terminate: bool,
        pub options: Vec<(String, String)>,
        pub push_depth: u32,
    }

    impl RecordingBackend {
        fn fresh(&mut self, text: impl Into<String>, value: Option<Value>) -> Node {
            let id = self.next_id;
            self.next_id += 1;
            Node { id, value, text: text.into() }
        }

        fn log(&mut self, call: impl Into<String>) {
            self.calls.push(call.into());
        }
    }

    impl Backend for RecordingBackend {
        type Sort = Sort;
        type Node = Node;

        fn bool_sort(&mut self) -> Sort {
            self.log("bool_sort");
            Sort::Bool
        }

        fn bitvec_sort(&mut self, width: u32) -> Sort {
            self.bitvec_sort_calls += 1;
            self.log(format!("bitvec_sort({width})"));
            Sort::Bv(width)
        }

        fn float_sort(&mut self, eb: u32, sb: u32) -> Sort {
            self.log(format!("float_sort({eb},{sb})"));
            Sort::Fp(eb, sb)
        }

        fn rounding_mode_sort(&mut self) -> Sort {
            self.log("rounding_mode_sort");
            Sort::RoundingMode
        }

        fn array_sort(&mut self, index: Sort, element: Sort) -> Sort {
            self.log("array_sort");
            Sort::Array(Box::new(index), Box::new(element))
        }

        fn fun_sort(&mut self, args: Vec<Sort>, result: Sort) -> Sort {
            self.log("fun_sort");
            Sort::Fun(args, Box::new(result))
        }

        fn bool_const(&mut self, value: bool) -> Node {
            self.log(format!("bool_const({value})"));
            self.fresh(value.to_string(), Some(Value::Bool(value)))
        }

        fn bv_const(&mut self, bits: &str) -> Node {
            self.log(format!("bv_const({bits})"));
            self.fresh(format!("#b{bits}"), Some(Value::Bv(bits.to_string())))
        }

        fn rm_const(&mut self, mode: RoundingMode) -> Node {
            self.log("rm_const");
            self.fresh(format!("{mode:?}"), None)
        }

        fn fp_special(&mut self, kind: FpSpecial, eb: u32, sb: u32) -> Node {
            self.log("fp_special");
            self.fresh(format!("{kind:?}:{eb}:{sb}"), None)
        }

        fn declare_var(&mut self, name: &str, _sort: &Sort) -> Node {
            self.log(format!("declare_var({name})"));
            self.fresh(name, None)
        }

        fn declare_param(&mut self, name: &str, _sort: &Sort) -> Node {
            self.log(format!("declare_param({name})"));
            self.fresh(name, None)
        }

        fn declare_fun(&mut self, name: &str, _arg_sorts: &[Sort], _result_sort: &Sort) -> Node {
            self.log(format!("declare_fun({name})"));
            self.fresh(name, None)
        }

        fn bool_fold(&mut self, op: BoolFoldOp, args: Vec<Node>) -> Node {
            self.log(format!("bool_fold({op:?})"));
            let text = args.iter().map(|a| a.text.clone()).collect::<Vec<_>>().join(&format!(" {op:?} "));
            let value = if op == BoolFoldOp::And {
                let all_true = args.iter().all(|a| matches!(a.value, Some(Value::Bool(true))));
                let any_concrete_false = args.iter().any(|a| matches!(a.value, Some(Value::Bool(false))));
                if any_concrete_false {
                    Some(Value::Bool(false))
                } else if all_true {
                    Some(Value::Bool(true))
                } else {
                    None
                }
            } else {
                None
            };
            self.fresh(text, value)
        }

        fn implies(&mut self, lhs: Node, rhs: Node) -> Node {
            self.log("implies");
            self.fresh(format!("({} => {})", lhs.text, rhs.text), None)
        }

        fn not(&mut self, arg: Node) -> Node {
            self.log("not");
            let value = match arg.value {
                Some(Value::Bool(b)) => Some(Value::Bool(!b)),
                _ => None,
            };
            self.fresh(format!("(not {})", arg.text), value)
        }

        fn eq(&mut self, lhs: Node, rhs: Node) -> Node {
            self.log("eq");
            let value = match (&lhs.value, &rhs.value) {
                (Some(a), Some(b)) => Some(Value::Bool(a == b)),
                _ => None,
            };
            self.fresh(format!("(= {} {})", lhs.text, rhs.text), value)
        }

        fn distinct_pair(&mut self, lhs: Node, rhs: Node) -> Node {
            self.log("distinct_pair");
            let value = match (&lhs.value, &rhs.value) {
                (Some(a), Some(b)) => Some(Value::Bool(a != b)),
                _ => None,
            };
            self.fresh(format!("(distinct {} {})", lhs.text, rhs.text), value)
        }

        fn ite(&mut self, cond: Node, then_: Node, else_: Node) -> Node {
            self.log("ite");
            let value = match cond.value {
                Some(Value::Bool(true)) => then_.value.clone(),
                Some(Value::Bool(false)) => else_.value.clone(),
                _ => None,
            };
            self.fresh(format!("(ite {} {} {})", cond.text, then_.text, else_.text), value)
        }

        fn bv_unary(&mut self, op: BvUnaryOp, arg: Node) -> Node {
            self.log(format!("bv_unary({op:?})"));
            self.fresh(format!("({op:?} {})", arg.text), None)
        }

        fn bv_nary(&mut self, op: BvNaryOp, args: Vec<Node>) -> Node {
            self.log(format!("bv_nary({op:?})"));
            let text = args.iter().map(|a| a.text.clone()).collect::<Vec<_>>().join(" ");
            self.fresh(format!("({op:?} {text})"), None)
        }

        fn bv_binary(&mut self, op: BvBinaryOp, lhs: Node, rhs: Node) -> Node {
            self.log(format!("bv_binary({op:?})"));
            self.fresh(format!("({op:?} {} {})", lhs.text, rhs.text), None)
        }

        fn bv_compare(&mut self, op: BvCompareOp, lhs: Node, rhs: Node) -> Node {
            self.log(format!("bv_compare({op:?})"));
            self.fresh(format!("({op:?} {} {})", lhs.text, rhs.text), None)
        }

        fn bv_extract(&mut self, hi: u32, lo: u32, arg: Node) -> Node {
            self.log(format!("bv_extract({hi},{lo})"));
            let value = match &arg.value {
                Some(Value::Bv(bits)) => {
                    let len = bits.len() as u32;
                    let start = (len - 1 - hi) as usize;
                    let end = (len - lo) as usize;
                    Some(Value::Bv(bits[start..end].to_string()))
                }
                _ => None,
            };
            self.fresh(format!("((_ extract {hi} {lo}) {})", arg.text), value)
        }

        fn bv_zero_extend(&mut self, k: u32, arg: Node) -> Node {
            self.log(format!("bv_zero_extend({k})"));
            self.fresh(format!("((_ zero_extend {k}) {})", arg.text), None)
        }

        fn bv_sign_extend(&mut self, k: u32, arg: Node) -> Node {
            self.log(format!("bv_sign_extend({k})"));
            self.fresh(format!("((_ sign_extend {k}) {})", arg.text), None)
        }

        fn bv_repeat(&mut self, k: u32, arg: Node) -> Node {
            self.log(format!("bv_repeat({k})"));
            self.fresh(format!("((_ repeat {k}) {})", arg.text), None)
        }

        fn bv_rotate_left(&mut self, k: u32, arg: Node) -> Node {
            self.log(format!("bv_rotate_left({k})"));
            self.fresh(format!("((_ rotate_left {k}) {})", arg.text), None)
        }

        fn bv_rotate_right(&mut self, k: u32, arg: Node) -> Node {
            self.log(format!("bv_rotate_right({k})"));
            self.fresh(format!("((_ rotate_right {k}) {})", arg.text), None)
        }

        fn bv_literal_value(&self, node: &Node) -> Option<String> {
            match &node.value {
                Some(Value::Bv(bits)) => Some(bits.clone()),
                _ => None,
            }
        }

        fn select(&mut self, array: Node, index: Node) -> Node {
            self.log("select");
            self.fresh(format!("(select {} {})", array.text, index.text), None)
        }

        fn store(&mut self, array: Node, index: Node, value: Node) -> Node {
            self.log("store");
            self.fresh(format!("(store {} {} {})", array.text, index.text, value.text), None)
        }

        fn const_array(&mut self, _array_sort: &Sort, value: Node) -> Node {
            self.log("const_array");
            self.fresh(format!("((as const T) {})", value.text), None)
        }

        fn fp_unary(&mut self, op: FpUnaryOp, arg: Node) -> Node {
            self.log(format!("fp_unary({op:?})"));
            self.fresh(format!("({op:?} {})", arg.text), None)
        }

        fn fp_rounded_unary(&mut self, op: FpRoundedUnaryOp, rm: Node, arg: Node) -> Node {
            self.log(format!("fp_rounded_unary({op:?})"));
            self.fresh(format!("({op:?} {} {})", rm.text, arg.text), None)
        }

        fn fp_binary(&mut self, op: FpBinaryOp, rm: Node, lhs: Node, rhs: Node) -> Node {
            self.log(format!("fp_binary({op:?})"));
            self.fresh(format!("({op:?} {} {} {})", rm.text, lhs.text, rhs.text), None)
        }

        fn fp_unrounded_binary(&mut self, op: FpUnroundedBinaryOp, lhs: Node, rhs: Node) -> Node {
            self.log(format!("fp_unrounded_binary({op:?})"));
            self.fresh(format!("({op:?} {} {})", lhs.text, rhs.text), None)
        }

        fn fp_fma(&mut self, rm: Node, a: Node, b: Node, c: Node) -> Node {
            self.log("fp_fma");
            self.fresh(format!("(fp.fma {} {} {} {})", rm.text, a.text, b.text, c.text), None)
        }

        fn fp_compare(&mut self, op: FpCompareOp, lhs: Node, rhs: Node) -> Node {
            self.log(format!("fp_compare({op:?})"));
            self.fresh(format!("({op:?} {} {})", lhs.text, rhs.text), None)
        }

        fn fp_predicate(&mut self, op: FpPredicateOp, arg: Node) -> Node {
            self.log(format!("fp_predicate({op:?})"));
            self.fresh(format!("({op:?} {})", arg.text), None)
        }

        fn fp_to_fp(&mut self, eb: u32, sb: u32, _rm: Option<Node>, _source: ToFpSource<Node>) -> Node {
            self.log(format!("fp_to_fp({eb},{sb})"));
            self.fresh(format!("((_ to_fp {eb} {sb}) ...)"), None)
        }

        fn fp_to_ubv(&mut self, width: u32, rm: Node, arg: Node) -> Node {
            self.log(format!("fp_to_ubv({width})"));
            self.fresh(format!("((_ fp.to_ubv {width}) {} {})", rm.text, arg.text), None)
        }

        fn fp_to_sbv(&mut self, width: u32, rm: Node, arg: Node) -> Node {
            self.log(format!("fp_to_sbv({width})"));
            self.fresh(format!("((_ fp.to_sbv {width}) {} {})", rm.text, arg.text), None)
        }

        fn fp_to_real(&mut self, arg: Node) -> Node {
            self.log("fp_to_real");
            self.fresh(format!("(fp.to_real {})", arg.text), None)
        }

        fn apply(&mut self, func: Node, args: Vec<Node>) -> Node {
            self.log("apply");
            let text = args.iter().map(|a| a.text.clone()).collect::<Vec<_>>().join(" ");
            self.fresh(format!("({} {text})", func.text), None)
        }

        fn forall(&mut self, params: Vec<Node>, body: Node) -> Node {
            self.log("forall");
            let text = params.iter().map(|p| p.text.clone()).collect::<Vec<_>>().join(" ");
            self.fresh(format!("(forall ({text}) {})", body.text), None)
        }

        fn exists(&mut self, params: Vec<Node>, body: Node) -> Node {
            self.log("exists");
            let text = params.iter().map(|p| p.text.clone()).collect::<Vec<_>>().join(" ");
            self.fresh(format!("(exists ({text}) {})", body.text), None)
        }

        fn assert(&mut self, node: Node) {
            self.log(format!("assert({})", node.text));
            self.asserted.push(node);
        }

        fn push(&mut self, n: u32) {
            self.log(format!("push({n})"));
            self.push_depth += n;
        }

        fn pop(&mut self, n: u32) {
            self.log(format!("pop({n})"));
            self.push_depth = self.push_depth.saturating_sub(n);
        }

        fn check_sat(&mut self) -> SatResult {
            self.log("check_sat");
            let unsat = self
                .asserted
                .iter()
                .chain(self.assumptions.iter())
                .any(|n| matches!(n.value, Some(Value::Bool(false))));
            if unsat {
                SatResult::Unsat
            } else {
                SatResult::Sat
            }
        }

        fn check_sat_assuming(&mut self, assumptions: Vec<Node>) -> SatResult {
            self.log("check_sat_assuming");
            self.failed.clear();
            let mut unsat = false;
            for (i, a) in assumptions.iter().enumerate() {
                if matches!(a.value, Some(Value::Bool(false))) {
                    self.failed.insert(i);
                    unsat = true;
                }
            }
            self.assumptions = assumptions;
            if unsat {
                SatResult::Unsat
            } else {
                self.check_sat()
            }
        }

        fn get_failed_assumptions(&self) -> Vec<usize> {
            let mut v: Vec<usize> = self.failed.iter().copied().collect();
            v.sort_unstable();
            v
        }

        fn release(&mut self, node: Node) {
            self.log(format!("release({})", node.id));
        }

        fn set_symbol(&mut self, node: &Node, name: &str) {
            self.log(format!("set_symbol({}, {name})", node.id));
        }

        fn terminate_requested(&self) -> bool {
            self.terminate
        }

        fn set_option(&mut self, name: &str, value: &str) {
            self.options.push((name.to_string(), value.to_string()));
        }

        fn produce_models(&self) -> bool {
            self.options.iter().any(|(k, v)| k == "produce-models" && v == "true")
        }

        fn get_model(&self) -> String {
            "(model)".to_string()
        }

        fn get_value(&mut self, nodes: &[Node]) -> Vec<String> {
            nodes
                .iter()
                .map(|n| match &n.value {
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Bv(bits)) => format!("#b{bits}"),
                    Some(Value::Other(s)) => s.clone(),
                    None => n.text.clone(),
                })
                .collect()
        }
    }
}
