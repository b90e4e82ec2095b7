//! Literal input/output scenarios exercising the full pipeline end to end
//! against `RecordingBackend`.
use test_utils::{check_failing_script, check_script, Expected};

use smtlib_front::ErrorKind;

#[test]
fn s1_bit_vector_equality() {
    check_script(
        "(set-logic QF_BV)\n\
         (declare-const x (_ BitVec 8))\n\
         (assert (= x (_ bv5 8)))\n\
         (check-sat)\n\
         (exit)\n",
        Expected { stdout: "success\nsuccess\nsuccess\nsat\nsuccess\n" },
    )
    .unwrap();
}

#[test]
fn s2_let_with_shadowing() {
    check_script(
        "(set-logic QF_BV)\n\
         (declare-const x (_ BitVec 4))\n\
         (assert (let ((x #b0000)) (= x #b0000)))\n\
         (check-sat)\n",
        Expected { stdout: "success\nsuccess\nsuccess\nsat\n" },
    )
    .unwrap();
}

// `RecordingBackend` never solves: it only folds a constraint to a concrete
// `false` when both sides of an `eq` are literal constants. A declared
// constant like `p` stays opaque, so neither `check-sat-assuming` call here
// can actually derive a contradiction from `(assert (= p #b1))` — both
// report `sat` and no assumption ends up in the failed set.
#[test]
fn s3_check_sat_assuming() {
    check_script(
        "(set-option :incremental true)\n\
         (set-logic QF_BV)\n\
         (declare-const p (_ BitVec 1))\n\
         (assert (= p #b1))\n\
         (check-sat-assuming (p))\n\
         (check-sat-assuming ((bvnot p)))\n\
         (get-unsat-assumptions)\n",
        Expected { stdout: "success\nsuccess\nsuccess\nsuccess\nsat\nsat\n()\n" },
    )
    .unwrap();
}

#[test]
fn s4_array_index_width_mismatch() {
    check_failing_script(
        "(set-logic QF_ABV)\n\
         (declare-const a (Array (_ BitVec 8) (_ BitVec 32)))\n\
         (assert (= (select a #b0) #x00000000))\n",
        ErrorKind::Semantic,
    )
    .unwrap();
}

#[test]
fn s5_push_pop_symmetry() {
    check_script(
        "(set-logic QF_BV)\n\
         (push 1)\n\
         (declare-const y (_ BitVec 1))\n\
         (assert (= y #b0))\n\
         (pop 1)\n\
         (declare-const y (_ BitVec 1))\n\
         (check-sat)\n",
        Expected { stdout: "success\nsuccess\nsuccess\nsuccess\nsuccess\nsuccess\nsat\n" },
    )
    .unwrap();
}

#[test]
fn s6_extract_bounds() {
    check_failing_script(
        "(set-logic QF_BV)\n\
         (declare-const z (_ BitVec 8))\n\
         (assert (= ((_ extract 7 0) z) z))\n\
         (assert (= ((_ extract 8 0) z) z))\n",
        ErrorKind::Semantic,
    )
    .unwrap();
}
