//! Hash-consed sort system.
//!
//! `SortKey` is the parser's own structural representation of a sort
//! (`Bool`, `BitVec n`, `FloatingPoint eb sb`, `RoundingMode`, arrays,
//! function sorts). Being `Eq + Hash` itself, it is hash-consed for free by
//! structural equality; `SortRegistry` additionally caches the one backend
//! `Sort` handle built for each distinct `SortKey`, so a backend sort
//! constructor is invoked at most once per distinct parsed sort.
use std::collections::HashMap;

use crate::backend::Backend;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKey {
    Bool,
    BitVec(u32),
    FloatingPoint(u32, u32),
    RoundingMode,
    Array(Box<SortKey>, Box<SortKey>),
    Fun(Vec<SortKey>, Box<SortKey>),
}

impl SortKey {
    pub fn bv_width(&self) -> Option<u32> {
        match self {
            SortKey::BitVec(w) => Some(*w),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SortKey::Array(_, _))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, SortKey::Fun(_, _))
    }

    pub fn array_parts(&self) -> Option<(&SortKey, &SortKey)> {
        match self {
            SortKey::Array(i, e) => Some((i, e)),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Bool => write!(f, "Bool"),
            SortKey::BitVec(w) => write!(f, "(_ BitVec {w})"),
            SortKey::FloatingPoint(eb, sb) => write!(f, "(_ FloatingPoint {eb} {sb})"),
            SortKey::RoundingMode => write!(f, "RoundingMode"),
            SortKey::Array(i, e) => write!(f, "(Array {i} {e})"),
            SortKey::Fun(args, res) => {
                write!(f, "(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ") {res}")
            }
        }
    }
}

/// Caches one backend `Sort` handle per distinct `SortKey`, and tracks
/// `define-sort` nullary aliases (parametric sort definitions are rejected
/// before reaching this registry).
pub struct SortRegistry<B: Backend> {
    cache: HashMap<SortKey, B::Sort>,
    aliases: HashMap<String, SortKey>,
}

impl<B: Backend> Default for SortRegistry<B> {
    fn default() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert("Float16".to_string(), SortKey::FloatingPoint(5, 11));
        aliases.insert("Float32".to_string(), SortKey::FloatingPoint(8, 24));
        aliases.insert("Float64".to_string(), SortKey::FloatingPoint(11, 53));
        aliases.insert("Float128".to_string(), SortKey::FloatingPoint(15, 113));
        SortRegistry {
            cache: HashMap::new(),
            aliases,
        }
    }
}

impl<B: Backend> SortRegistry<B> {
    pub fn resolve_alias(&self, name: &str) -> Option<SortKey> {
        self.aliases.get(name).cloned()
    }

    pub fn define_alias(&mut self, name: String, key: SortKey) {
        self.aliases.insert(name, key);
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Materialize `key` into a backend `Sort`, constructing it on the
    /// backend only the first time this exact key is seen.
    pub fn materialize(&mut self, backend: &mut B, key: &SortKey) -> B::Sort {
        if let Some(sort) = self.cache.get(key) {
            return sort.clone();
        }
        let sort = match key {
            SortKey::Bool => backend.bool_sort(),
            SortKey::BitVec(w) => backend.bitvec_sort(*w),
            SortKey::FloatingPoint(eb, sb) => backend.float_sort(*eb, *sb),
            SortKey::RoundingMode => backend.rounding_mode_sort(),
            SortKey::Array(i, e) => {
                let i = self.materialize(backend, i);
                let e = self.materialize(backend, e);
                backend.array_sort(i, e)
            }
            SortKey::Fun(args, res) => {
                let args: Vec<B::Sort> = args.iter().map(|a| self.materialize(backend, a)).collect();
                let res = self.materialize(backend, res);
                backend.fun_sort(args, res)
            }
        };
        self.cache.insert(key.clone(), sort.clone());
        sort
    }

    /// Release every cached backend sort handle, e.g. on parser teardown.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_backend::RecordingBackend;

    #[test]
    fn predefined_float_aliases_resolve() {
        let reg = SortRegistry::<RecordingBackend>::default();
        assert_eq!(reg.resolve_alias("Float32"), Some(SortKey::FloatingPoint(8, 24)));
        assert_eq!(reg.resolve_alias("Float64"), Some(SortKey::FloatingPoint(11, 53)));
    }

    #[test]
    fn materialize_caches_by_structural_key() {
        let mut backend = RecordingBackend::default();
        let mut reg = SortRegistry::<RecordingBackend>::default();
        let key = SortKey::BitVec(8);
        let a = reg.materialize(&mut backend, &key);
        let b = reg.materialize(&mut backend, &key);
        assert_eq!(a, b);
        assert_eq!(backend.bitvec_sort_calls, 1);
    }
}
