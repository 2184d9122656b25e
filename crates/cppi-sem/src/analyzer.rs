//! Walks a `Program` once, building up scopes and a global function table,
//! and reports every reachable semantic error instead of stopping at the
//! first one (§4.3).

use cppi_par::{BinOp, Expr, IncDecOp, Literal, Program, Stmt, UnOp};
use cppi_util::Symbol;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::error::SemanticError;
use crate::scope::{ScopeKind, ScopeTree};
use crate::types::Type;

#[derive(Clone, Debug)]
struct FuncSig {
    ret: Type,
    params: Vec<Type>,
}

pub struct Analyzer {
    scopes: ScopeTree,
    functions: IndexMap<Symbol, FuncSig>,
    /// Names introduced by `class`/`struct` declarations. The language's
    /// type system never resolves variables to these (§4.3: "members are
    /// not otherwise used"), but the set still has to exist so a second
    /// `class Foo { ... }` is caught the same way a redefined function is.
    user_types: FxHashSet<Symbol>,
    current_return: Option<Type>,
    errors: Vec<SemanticError>,
}

/// Runs full semantic analysis over `program`, returning every error found.
/// An empty vec means the program is well-formed.
pub fn analyze(program: &Program) -> Vec<SemanticError> {
    let mut analyzer = Analyzer {
        scopes: ScopeTree::new(),
        functions: IndexMap::new(),
        user_types: FxHashSet::default(),
        current_return: None,
        errors: Vec::new(),
    };
    analyzer.seed_globals();
    analyzer.collect_functions(program);
    for item in &program.items {
        analyzer.analyze_stmt(item);
    }
    analyzer.check_main();
    analyzer.errors
}

impl Analyzer {
    /// Seeds the global scope with the four built-in names (§3): `cout` and
    /// `endl` resolve as bare identifiers once `using namespace std;` is in
    /// effect (or even without it, matching the reference analyzer), and the
    /// same two are registered again under their `std::`-qualified spelling.
    fn seed_globals(&mut self) {
        self.scopes.declare(Symbol::intern("cout"), Type::Ostream, true);
        self.scopes.declare(Symbol::intern("endl"), Type::StdString, true);
        self.scopes
            .declare(Symbol::intern("std::cout"), Type::Ostream, true);
        self.scopes
            .declare(Symbol::intern("std::endl"), Type::StdString, true);
    }

    /// Pre-registers every top-level function so calls can appear before
    /// their definition in source order.
    fn collect_functions(&mut self, program: &Program) {
        for item in &program.items {
            if let Stmt::FuncDecl {
                ret_type, name, params, span, ..
            } = item
            {
                let sig = FuncSig {
                    ret: (*ret_type).into(),
                    params: params.iter().map(|p| p.ty.into()).collect(),
                };
                if self.functions.contains_key(name) {
                    self.errors.push(SemanticError::Redefinition {
                        name: name.as_str().to_string(),
                        line: span.line,
                        column: span.column,
                    });
                } else {
                    self.functions.insert(*name, sig);
                }
            }
        }
    }

    fn check_main(&mut self) {
        match self.functions.get(&Symbol::intern("main")) {
            None => self.errors.push(SemanticError::MissingMain),
            Some(sig) => {
                if !matches!(sig.ret, Type::Int | Type::Void) {
                    self.errors.push(SemanticError::BadMainSignature { found: sig.ret });
                }
            }
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::ExprStmt { expr, .. } => {
                self.infer_expr(expr);
            }
            Stmt::VarDecl { ty, name, init, span } => {
                let init_ty = init.as_ref().map(|e| self.infer_expr(e));
                let resolved = if matches!(ty, cppi_par::TypeName::Auto) {
                    init_ty.unwrap_or(Type::Error)
                } else {
                    let declared: Type = (*ty).into();
                    if let Some(found) = init_ty {
                        if !found.assignable_to(declared) {
                            self.errors.push(SemanticError::TypeMismatch {
                                expected: declared,
                                found,
                                line: span.line,
                                column: span.column,
                            });
                        }
                    }
                    declared
                };
                if !self.scopes.declare(*name, resolved, init.is_some()) {
                    self.errors.push(SemanticError::Redefinition {
                        name: name.as_str().to_string(),
                        line: span.line,
                        column: span.column,
                    });
                }
            }
            Stmt::Block { statements, .. } => {
                self.scopes.enter(ScopeKind::Block);
                for s in statements {
                    self.analyze_stmt(s);
                }
                self.scopes.exit();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                span,
            } => {
                self.check_condition(condition, span.line, span.column);
                self.analyze_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.analyze_stmt(else_branch);
                }
            }
            Stmt::While { condition, body, span } => {
                self.check_condition(condition, span.line, span.column);
                self.analyze_stmt(body);
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.scopes.enter(ScopeKind::ForLoop);
                if let Some(init) = init {
                    self.analyze_stmt(init);
                }
                if let Some(condition) = condition {
                    let span = condition.span();
                    self.check_condition(condition, span.line, span.column);
                }
                if let Some(update) = update {
                    self.infer_expr(update);
                }
                self.analyze_stmt(body);
                self.scopes.exit();
            }
            Stmt::Return { value, span } => {
                let found = value.as_ref().map(|e| self.infer_expr(e)).unwrap_or(Type::Void);
                if let Some(expected) = self.current_return {
                    if !found.assignable_to(expected) {
                        self.errors.push(SemanticError::BadReturn {
                            expected,
                            found,
                            line: span.line,
                            column: span.column,
                        });
                    }
                }
            }
            Stmt::FuncDecl {
                ret_type,
                params,
                body,
                ..
            } => {
                let ret: Type = (*ret_type).into();
                self.scopes.enter(ScopeKind::Function);
                for param in params {
                    self.scopes.declare(param.name, param.ty.into(), true);
                }
                let previous_return = self.current_return.replace(ret);
                for s in body {
                    self.analyze_stmt(s);
                }
                self.current_return = previous_return;
                self.scopes.exit();
            }
            Stmt::ClassDecl { name, members, span, .. } => {
                if !self.user_types.insert(*name) {
                    self.errors.push(SemanticError::Redefinition {
                        name: name.as_str().to_string(),
                        line: span.line,
                        column: span.column,
                    });
                }
                self.scopes.enter(ScopeKind::Class);
                for member in members {
                    self.analyze_stmt(member);
                }
                self.scopes.exit();
            }
            Stmt::Include { .. } | Stmt::UsingNamespace { .. } => {}
        }
    }

    fn check_condition(&mut self, condition: &Expr, line: u32, column: u32) {
        let ty = self.infer_expr(condition);
        if !matches!(ty, Type::Bool | Type::Int | Type::Char | Type::Error) {
            self.errors.push(SemanticError::BadCondition { found: ty, line, column });
        }
    }

    fn infer_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Literal { value, .. } => match value {
                Literal::Int(_) => Type::Int,
                Literal::Float(_) => Type::Float,
                Literal::Bool(_) => Type::Bool,
                Literal::Char(_) => Type::Char,
                Literal::Str(_) => Type::StdString,
                Literal::Endl => Type::Ostream,
                Literal::Null => Type::Error,
            },
            Expr::StdOut { .. } => Type::Ostream,
            Expr::Identifier { name, span } => match self.scopes.resolve(*name) {
                None => {
                    self.errors.push(SemanticError::UndefinedName {
                        name: name.as_str().to_string(),
                        line: span.line,
                        column: span.column,
                    });
                    Type::Error
                }
                Some(binding) => {
                    if !binding.initialized {
                        self.errors.push(SemanticError::UseBeforeInit {
                            name: name.as_str().to_string(),
                            line: span.line,
                            column: span.column,
                        });
                    }
                    binding.ty
                }
            },
            Expr::Binary { op, left, right, span } => {
                let lt = self.infer_expr(left);
                let rt = self.infer_expr(right);
                self.infer_binary(*op, lt, rt, span.line, span.column)
            }
            Expr::Unary { op, operand, span } => {
                let ot = self.infer_expr(operand);
                match op {
                    UnOp::Not => Type::Bool,
                    UnOp::Neg => {
                        if ot.is_numeric() || ot == Type::Error {
                            ot
                        } else {
                            self.errors.push(SemanticError::TypeMismatch {
                                expected: Type::Int,
                                found: ot,
                                line: span.line,
                                column: span.column,
                            });
                            Type::Error
                        }
                    }
                }
            }
            Expr::PreIncDec { operand, span, .. } | Expr::PostIncDec { operand, span, .. } => {
                self.infer_incdec(operand, span.line, span.column)
            }
            Expr::Call { callee, args, span } => self.infer_call(*callee, args, span.line, span.column),
            Expr::Assign { target, value, span } => {
                let vt = self.infer_expr(value);
                match self.scopes.resolve(*target) {
                    None => {
                        self.errors.push(SemanticError::AssignToUndeclared {
                            name: target.as_str().to_string(),
                            line: span.line,
                            column: span.column,
                        });
                        Type::Error
                    }
                    Some(binding) => {
                        let declared = binding.ty;
                        if !vt.assignable_to(declared) {
                            self.errors.push(SemanticError::TypeMismatch {
                                expected: declared,
                                found: vt,
                                line: span.line,
                                column: span.column,
                            });
                        }
                        self.scopes.mark_initialized(*target);
                        declared
                    }
                }
            }
        }
    }

    fn infer_binary(&mut self, op: BinOp, lt: Type, rt: Type, line: u32, column: u32) -> Type {
        match op {
            BinOp::Shl => {
                if lt == Type::Ostream {
                    if rt == Type::Void {
                        self.errors.push(SemanticError::TypeMismatch {
                            expected: Type::Int,
                            found: rt,
                            line,
                            column,
                        });
                    }
                    Type::Ostream
                } else if let Some(result) = Type::promote(lt, rt) {
                    result
                } else {
                    self.errors.push(SemanticError::TypeMismatch {
                        expected: Type::Int,
                        found: if lt.is_numeric() { rt } else { lt },
                        line,
                        column,
                    });
                    Type::Error
                }
            }
            BinOp::Add if lt == Type::StdString || rt == Type::StdString => Type::StdString,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                match Type::promote(lt, rt) {
                    Some(result) => result,
                    None => {
                        self.errors.push(SemanticError::TypeMismatch {
                            expected: Type::Int,
                            found: if lt.is_numeric() { rt } else { lt },
                            line,
                            column,
                        });
                        Type::Error
                    }
                }
            }
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => {
                if lt != Type::Error
                    && rt != Type::Error
                    && lt != rt
                    && Type::promote(lt, rt).is_none()
                {
                    self.errors.push(SemanticError::TypeMismatch {
                        expected: lt,
                        found: rt,
                        line,
                        column,
                    });
                }
                Type::Bool
            }
            BinOp::And | BinOp::Or => {
                for t in [lt, rt] {
                    if !matches!(t, Type::Bool | Type::Int | Type::Char | Type::Error) {
                        self.errors.push(SemanticError::BadCondition { found: t, line, column });
                    }
                }
                Type::Bool
            }
        }
    }

    fn infer_incdec(&mut self, operand: &Expr, line: u32, column: u32) -> Type {
        let Expr::Identifier { name, span } = operand else {
            let found = self.infer_expr(operand);
            self.errors.push(SemanticError::TypeMismatch {
                expected: Type::Int,
                found,
                line,
                column,
            });
            return Type::Error;
        };
        match self.scopes.resolve(*name) {
            None => {
                self.errors.push(SemanticError::UndefinedName {
                    name: name.as_str().to_string(),
                    line: span.line,
                    column: span.column,
                });
                Type::Error
            }
            Some(binding) => {
                let ty = binding.ty;
                let was_initialized = binding.initialized;
                if !was_initialized {
                    self.errors.push(SemanticError::UseBeforeInit {
                        name: name.as_str().to_string(),
                        line: span.line,
                        column: span.column,
                    });
                }
                if !ty.is_numeric() && ty != Type::Error {
                    self.errors.push(SemanticError::TypeMismatch {
                        expected: Type::Int,
                        found: ty,
                        line: span.line,
                        column: span.column,
                    });
                }
                self.scopes.mark_initialized(*name);
                ty
            }
        }
    }

    fn infer_call(&mut self, callee: Symbol, args: &[Expr], line: u32, column: u32) -> Type {
        let Some(sig) = self.functions.get(&callee).cloned() else {
            for arg in args {
                self.infer_expr(arg);
            }
            self.errors.push(SemanticError::UndefinedFunction {
                name: callee.as_str().to_string(),
                line,
                column,
            });
            return Type::Error;
        };
        if sig.params.len() != args.len() {
            self.errors.push(SemanticError::ArityMismatch {
                name: callee.as_str().to_string(),
                expected: sig.params.len(),
                found: args.len(),
                line,
                column,
            });
        }
        for (arg, expected) in args.iter().zip(sig.params.iter()) {
            let found = self.infer_expr(arg);
            if !found.assignable_to(*expected) {
                self.errors.push(SemanticError::TypeMismatch {
                    expected: *expected,
                    found,
                    line,
                    column,
                });
            }
        }
        // Extra arguments past the declared arity are still analyzed so
        // their own errors surface, even though arity was already flagged.
        for arg in args.iter().skip(sig.params.len()) {
            self.infer_expr(arg);
        }
        sig.ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppi_lex::tokenize;
    use cppi_par::parse;

    fn analyze_src(src: &str) -> Vec<SemanticError> {
        let program = parse(tokenize(src)).expect("parses");
        analyze(&program)
    }

    #[test]
    fn well_formed_program_has_no_errors() {
        let errors = analyze_src("int main() { int x = 1; return x; }");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn redefinition_in_same_scope_is_reported() {
        let errors = analyze_src("int main() { int x = 1; int x = 2; return 0; }");
        assert!(matches!(errors[0], SemanticError::Redefinition { .. }));
    }

    #[test]
    fn use_before_init_is_reported() {
        let errors = analyze_src("int main() { int x; int y = x; return 0; }");
        assert!(errors.iter().any(|e| matches!(e, SemanticError::UseBeforeInit { .. })));
    }

    #[test]
    fn undefined_name_is_reported() {
        let errors = analyze_src("int main() { int y = z; return 0; }");
        assert!(errors.iter().any(|e| matches!(e, SemanticError::UndefinedName { .. })));
    }

    #[test]
    fn missing_main_is_reported() {
        let errors = analyze_src("int helper() { return 0; }");
        assert!(errors.contains(&SemanticError::MissingMain));
    }

    #[test]
    fn forward_call_to_later_function_is_allowed() {
        let errors = analyze_src("int main() { return helper(); } int helper() { return 1; }");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn stream_insertion_type_checks_as_ostream() {
        let errors = analyze_src(r#"int main() { std::cout << "hi" << std::endl; return 0; }"#);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn bare_cout_and_endl_resolve_without_using_declaration() {
        let errors = analyze_src(r#"int main() { cout << "Hello, World!" << endl; return 0; }"#);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn type_mismatch_on_bad_initializer_is_reported() {
        let errors = analyze_src(r#"int main() { int x = "oops"; return 0; }"#);
        assert!(errors.iter().any(|e| matches!(e, SemanticError::TypeMismatch { .. })));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let errors = analyze_src("int add(int a, int b) { return a + b; } int main() { return add(1); }");
        assert!(errors.iter().any(|e| matches!(e, SemanticError::ArityMismatch { .. })));
    }

    #[test]
    fn struct_members_are_skipped_but_do_not_error() {
        let errors = analyze_src("struct Point { int x; int y; }; int main() { return 0; }");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn redefining_a_class_name_is_reported() {
        let errors = analyze_src("class Box { int w; }; class Box { int h; }; int main() { return 0; }");
        assert!(errors.iter().any(|e| matches!(e, SemanticError::Redefinition { .. })));
    }
}
