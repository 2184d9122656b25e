//! String interning for identifiers and string-literal text.
//!
//! A [`Symbol`] is a 4-byte handle to an interned string. Comparing two
//! symbols is an integer comparison; the interner guarantees equal strings
//! always map to the same symbol.

use ahash::AHasher;
use dashmap::DashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    table.prime();
    table
});

/// A 4-byte handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    index: u32,
}

impl Symbol {
    pub fn intern(s: &str) -> Symbol {
        STRING_TABLE.intern(s)
    }

    pub fn as_str(self) -> &'static str {
        STRING_TABLE
            .get(self)
            .expect("Symbol was created by a different interner instance")
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A thread-safe string table backed by a lock-free concurrent map.
///
/// The pipeline itself runs one file at a time on a single thread (see the
/// concurrency model), but the table is `Sync` so an embedding host is free
/// to run independent `compile_and_run` calls on separate threads without
/// ever contending for a global lock — interning is append-only and never
/// invalidates a symbol handed out earlier.
struct StringTable {
    map: DashMap<u64, (&'static str, u32)>,
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(256),
            next_index: AtomicU32::new(0),
        }
    }

    /// Pre-interns the keywords and built-in names so repeated lookups of
    /// `cout`, `int`, etc. never pay the allocation cost.
    fn prime(&self) {
        const KNOWN: &[&str] = &[
            "int", "float", "double", "char", "bool", "void", "long", "short", "unsigned",
            "signed", "if", "else", "while", "for", "return", "break", "continue", "do", "true",
            "false", "include", "iostream", "namespace", "std", "using", "class", "struct",
            "const", "enum", "auto", "new", "delete", "switch", "case", "default", "nullptr",
            "main", "cout", "endl", "cin",
        ];
        for s in KNOWN {
            self.intern(s);
        }
    }

    fn intern(&self, s: &str) -> Symbol {
        let hash = Self::hash_str(s);
        if let Some(entry) = self.map.get(&hash) {
            if entry.value().0 == s {
                return Symbol { index: entry.value().1 };
            }
        }
        match self.map.entry(hash) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if entry.get().0 == s {
                    Symbol { index: entry.get().1 }
                } else {
                    self.insert_at_probe(s, hash)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
                let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                entry.insert((leaked, idx));
                Symbol { index: idx }
            }
        }
    }

    fn insert_at_probe(&self, s: &str, original_hash: u64) -> Symbol {
        const PROBE_PRIME: u64 = 0x9e3779b97f4a7c15;
        for i in 1u64..=32 {
            let probe = original_hash.wrapping_add(i.wrapping_mul(PROBE_PRIME));
            match self.map.get(&probe) {
                Some(entry) if entry.value().0 == s => return Symbol { index: entry.value().1 },
                Some(_) => continue,
                None => {
                    let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
                    let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                    self.map.insert(probe, (leaked, idx));
                    return Symbol { index: idx };
                }
            }
        }
        let leaked: &'static str = Box::leak(s.to_string().into_boxed_str());
        let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.map.insert(original_hash, (leaked, idx));
        Symbol { index: idx }
    }

    fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.map
            .iter()
            .find(|entry| entry.value().1 == symbol.index)
            .map(|entry| entry.value().0)
    }

    fn hash_str(s: &str) -> u64 {
        let mut hasher = AHasher::default();
        s.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_yields_same_symbol() {
        let a = Symbol::intern("hello_world");
        let b = Symbol::intern("hello_world");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_strings_yields_distinct_symbols() {
        let a = Symbol::intern("foo_sym");
        let b = Symbol::intern("bar_sym");
        assert_ne!(a, b);
    }

    #[test]
    fn as_str_round_trips() {
        let s = Symbol::intern("round_trip_check");
        assert_eq!(s.as_str(), "round_trip_check");
    }
}
