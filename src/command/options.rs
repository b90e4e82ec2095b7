//! `set-option` registry.
//!
//! The handful of options the driver itself acts on (`:print-success`,
//! `:global-declarations`, `:incremental`, ...) get typed fields; everything
//! else is forwarded to [`crate::backend::Backend::set_option`] verbatim,
//! by its bare, colon-stripped name, per `spec.md`'s "any other option name"
//! rule.
pub struct OptionTable {
    pub print_success: bool,
    pub global_declarations: bool,
    pub produce_models: bool,
    pub produce_unsat_assumptions: bool,
    pub incremental: bool,
    pub regular_output_channel: Option<String>,
    /// Default bit-vector width `declare-sort` assigns a 0-ary sort. `0`
    /// means unconfigured: `declare-sort` is a capability error until this
    /// is set via `(set-option :decl-sort-bv-width n)`.
    pub decl_sort_bv_width: u32,
}

impl Default for OptionTable {
    fn default() -> Self {
        OptionTable {
            print_success: true,
            global_declarations: false,
            produce_models: false,
            produce_unsat_assumptions: true,
            incremental: false,
            regular_output_channel: None,
            decl_sort_bv_width: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionError {
    /// The value given for a bool- or integer-typed known option didn't parse.
    BadValue,
}

impl OptionTable {
    /// Applies `(set-option :name value)`. `name` has already had its
    /// leading `:` stripped by the lexer. Unknown names are handed to
    /// `forward` by the caller, which passes them to the backend.
    pub fn set(&mut self, name: &str, value: &str) -> Result<bool, OptionError> {
        let parse_bool = |v: &str| match v {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(OptionError::BadValue),
        };
        match name {
            "print-success" => {
                self.print_success = parse_bool(value)?;
                Ok(true)
            }
            "global-declarations" => {
                self.global_declarations = parse_bool(value)?;
                Ok(true)
            }
            "produce-models" => {
                self.produce_models = parse_bool(value)?;
                Ok(true)
            }
            "produce-unsat-assumptions" => {
                self.produce_unsat_assumptions = parse_bool(value)?;
                Ok(true)
            }
            "incremental" => {
                self.incremental = parse_bool(value)?;
                Ok(true)
            }
            "regular-output-channel" => {
                self.regular_output_channel = Some(value.trim_matches('"').to_string());
                Ok(true)
            }
            "decl-sort-bv-width" => {
                self.decl_sort_bv_width = value.parse::<u32>().map_err(|_| OptionError::BadValue)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let opts = OptionTable::default();
        assert!(opts.print_success);
        assert!(!opts.global_declarations);
        assert!(!opts.produce_models);
        assert!(opts.produce_unsat_assumptions);
        assert!(!opts.incremental);
        assert_eq!(opts.decl_sort_bv_width, 0);
    }

    #[test]
    fn unknown_option_name_is_not_handled_here() {
        let mut opts = OptionTable::default();
        assert_eq!(opts.set("random-backend-flag", "7"), Ok(false));
    }

    #[test]
    fn bad_bool_value_is_rejected() {
        let mut opts = OptionTable::default();
        assert_eq!(opts.set("print-success", "maybe"), Err(OptionError::BadValue));
    }
}
