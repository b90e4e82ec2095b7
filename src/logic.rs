//! Logic-name inference (`spec.md` "Logic inference").
//!
//! `set-logic` is advisory: the final logic reported to the caller is
//! whatever `set-logic` declared, tightened if the script went on to use
//! features that name doesn't cover. Only the one upgrade path the design
//! calls out (`QF_BV` declared, functions observed) is implemented; any
//! other explicit logic is trusted as given.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Logic {
    QfBv,
    QfUfbv,
    QfAufbv,
    Bv,
    /// Any logic name the grammar doesn't special-case, kept verbatim
    /// (`QF_ABV`, `ALL`, a solver-specific extension, ...).
    Named(String),
}

impl Logic {
    pub fn parse(name: &str) -> Logic {
        match name {
            "QF_BV" => Logic::QfBv,
            "QF_UFBV" => Logic::QfUfbv,
            "QF_AUFBV" => Logic::QfAufbv,
            "BV" => Logic::Bv,
            other => Logic::Named(other.to_string()),
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::QfBv => f.write_str("QF_BV"),
            Logic::QfUfbv => f.write_str("QF_UFBV"),
            Logic::QfAufbv => f.write_str("QF_AUFBV"),
            Logic::Bv => f.write_str("BV"),
            Logic::Named(s) => f.write_str(s),
        }
    }
}

/// `explicit` is the logic `set-logic` declared, if any. Returns the final
/// logic together with a warning message when the declared logic had to be
/// tightened.
pub fn resolve(
    explicit: Option<&str>,
    need_functions: bool,
    need_arrays: bool,
    need_quantifiers: bool,
) -> (Logic, Option<String>) {
    let inferred = if need_quantifiers {
        Logic::Bv
    } else if need_functions && need_arrays {
        Logic::QfAufbv
    } else if need_functions {
        Logic::QfUfbv
    } else {
        Logic::QfBv
    };

    match explicit {
        None => (inferred, None),
        Some(name) => {
            let declared = Logic::parse(name);
            if declared == Logic::QfBv && (need_functions || need_quantifiers) {
                let warning = format!("logic '{declared}' declared but the script requires '{inferred}'; upgrading");
                (inferred, Some(warning))
            } else {
                (declared, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_declaration_infers_from_features() {
        let (logic, warn) = resolve(None, true, true, false);
        assert_eq!(logic, Logic::QfAufbv);
        assert!(warn.is_none());
    }

    #[test]
    fn declared_qf_bv_upgrades_when_functions_used() {
        let (logic, warn) = resolve(Some("QF_BV"), true, false, false);
        assert_eq!(logic, Logic::QfUfbv);
        assert!(warn.is_some());
    }

    #[test]
    fn declared_non_qf_bv_logic_is_trusted() {
        let (logic, warn) = resolve(Some("QF_ABV"), false, true, false);
        assert_eq!(logic, Logic::Named("QF_ABV".to_string()));
        assert!(warn.is_none());
    }
}
