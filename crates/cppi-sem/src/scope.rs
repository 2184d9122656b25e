//! A scope arena addressed by stable integer ids, so a scope can be entered,
//! exited, and re-entered (e.g. when checking a function body after the
//! rest of the program has been collected) without invalidating handles
//! held elsewhere.

use cppi_util::{define_idx, IndexVec, Symbol};
use indexmap::IndexMap;

use crate::types::Type;

define_idx! {
    pub struct ScopeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    ForLoop,
    Class,
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub ty: Type,
    pub initialized: bool,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    bindings: IndexMap<Symbol, Binding>,
}

impl Scope {
    fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            kind,
            bindings: IndexMap::new(),
        }
    }
}

/// Tracks every scope opened during analysis and the binding tables inside
/// them. A function's body and its outermost block share one scope (§4.3):
/// callers get this by not pushing a fresh `Block` scope for a function's
/// top-level `{ ... }`.
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
    current: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        let root = scopes.push(Scope::new(None, ScopeKind::Global));
        Self { scopes, current: root }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn enter(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.push(Scope::new(Some(self.current), kind));
        self.current = id;
        id
    }

    pub fn exit(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Declares `name` in the current scope. Returns `false` if `name` is
    /// already bound in this exact scope (a redefinition); shadowing an
    /// outer scope's binding is always allowed.
    pub fn declare(&mut self, name: Symbol, ty: Type, initialized: bool) -> bool {
        let scope = &mut self.scopes[self.current];
        if scope.bindings.contains_key(&name) {
            return false;
        }
        scope.bindings.insert(name, Binding { ty, initialized });
        true
    }

    /// Walks outward from the current scope looking for `name`.
    pub fn resolve(&self, name: Symbol) -> Option<&Binding> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = &self.scopes[id];
            if let Some(binding) = scope.bindings.get(&name) {
                return Some(binding);
            }
            scope_id = scope.parent;
        }
        None
    }

    /// Marks `name` initialized in whichever ancestor scope actually binds
    /// it (assignment to an already-declared variable).
    pub fn mark_initialized(&mut self, name: Symbol) {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = &mut self.scopes[id];
            if let Some(binding) = scope.bindings.get_mut(&name) {
                binding.initialized = true;
                return;
            }
            scope_id = scope.parent;
        }
    }

    /// True if `kind` is reachable without crossing a `Function` boundary —
    /// used to validate `break`/`continue`-style nesting rules, and to find
    /// the nearest enclosing loop scope for `for`.
    pub fn enclosing_kind(&self, kind: ScopeKind) -> bool {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = &self.scopes[id];
            if scope.kind == kind {
                return true;
            }
            if scope.kind == ScopeKind::Function {
                return false;
            }
            scope_id = scope.parent;
        }
        false
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut tree = ScopeTree::new();
        let x = Symbol::intern("x");
        assert!(tree.declare(x, Type::Int, true));
        assert!(!tree.declare(x, Type::Int, true));
    }

    #[test]
    fn shadowing_in_nested_scope_is_allowed() {
        let mut tree = ScopeTree::new();
        let x = Symbol::intern("x_shadow");
        tree.declare(x, Type::Int, true);
        tree.enter(ScopeKind::Block);
        assert!(tree.declare(x, Type::Double, true));
        assert_eq!(tree.resolve(x).unwrap().ty, Type::Double);
        tree.exit();
        assert_eq!(tree.resolve(x).unwrap().ty, Type::Int);
    }

    #[test]
    fn resolve_walks_up_to_parent_scopes() {
        let mut tree = ScopeTree::new();
        let g = Symbol::intern("g_var");
        tree.declare(g, Type::Bool, true);
        tree.enter(ScopeKind::Function);
        tree.enter(ScopeKind::Block);
        assert!(tree.resolve(g).is_some());
    }

    #[test]
    fn unresolved_name_returns_none() {
        let tree = ScopeTree::new();
        assert!(tree.resolve(Symbol::intern("never_declared_xyz")).is_none());
    }
}
