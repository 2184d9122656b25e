//! Runtime values: the tagged union every expression reduces to (§3). A
//! `Value` never carries string-literal quotes — they are stripped once,
//! by the parser, rather than again on every read (§9 open question,
//! resolved toward "`Value`s never carry quotes").

use std::cmp::Ordering;
use std::fmt;

use cppi_par::{BinOp, TypeName};
use cppi_util::Span;

use crate::error::RuntimeError;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    /// The `cout`/`std::cout` stream handle. Carries no state of its own —
    /// the evaluator owns the one output buffer it writes through.
    Ostream,
    Void,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Double(x) => write!(f, "{x}"),
            // cout prints bool without `boolalpha`: 1 or 0, not Rust's true/false.
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Ostream | Value::Void => Ok(()),
        }
    }
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Double(x) => *x != 0.0,
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::Str(s) => !s.is_empty(),
            Value::Ostream | Value::Void => false,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            Value::Float(x) => *x as i64,
            Value::Double(x) => *x as i64,
            Value::Bool(b) => *b as i64,
            Value::Char(c) => *c as i64,
            Value::Str(s) => !s.is_empty() as i64,
            Value::Ostream | Value::Void => 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(i) => *i as f64,
            Value::Float(x) => *x as f64,
            Value::Double(x) => *x,
            Value::Bool(b) => *b as i64 as f64,
            Value::Char(c) => *c as i64 as f64,
            Value::Str(s) => !s.is_empty() as i64 as f64,
            Value::Ostream | Value::Void => 0.0,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Value::Char(c) => *c,
            other => char::from_u32(other.as_i64().max(0) as u32).unwrap_or('\0'),
        }
    }

    /// Position in the `char < int < float < double` promotion lattice;
    /// `None` for the non-numeric variants.
    fn rank(&self) -> Option<u8> {
        match self {
            Value::Char(_) => Some(0),
            Value::Int(_) => Some(1),
            Value::Float(_) => Some(2),
            Value::Double(_) => Some(3),
            _ => None,
        }
    }

    fn tag(&self) -> TypeName {
        match self {
            Value::Int(_) => TypeName::Int,
            Value::Float(_) => TypeName::Float,
            Value::Double(_) => TypeName::Double,
            Value::Bool(_) => TypeName::Bool,
            Value::Char(_) => TypeName::Char,
            Value::Str(_) => TypeName::StdString,
            Value::Ostream | Value::Void => TypeName::Void,
        }
    }
}

/// A freshly declared variable's zero value (§4.4): `0`, `0.0`, `false`,
/// `""`, `'\0'`.
pub fn default_for(ty: TypeName) -> Value {
    match ty {
        TypeName::Int => Value::Int(0),
        TypeName::Float => Value::Float(0.0),
        TypeName::Double => Value::Double(0.0),
        TypeName::Char => Value::Char('\0'),
        TypeName::Bool => Value::Bool(false),
        TypeName::Void => Value::Void,
        TypeName::StdString => Value::Str(String::new()),
        TypeName::Auto => Value::Void,
    }
}

/// Converts `value` to the representation `ty` names — the runtime
/// counterpart of the analyzer's `assignable_to` — used when a variable is
/// declared, a parameter is bound, or an existing variable's current value
/// decides the shape a new assignment must take (`coerce_like`, below).
pub fn coerce_to(value: Value, ty: TypeName) -> Value {
    match ty {
        TypeName::Int => Value::Int(value.as_i64()),
        TypeName::Float => Value::Float(value.as_f64() as f32),
        TypeName::Double => Value::Double(value.as_f64()),
        TypeName::Char => Value::Char(value.as_char()),
        TypeName::Bool => Value::Bool(value.is_truthy()),
        TypeName::Void => Value::Void,
        TypeName::StdString => match value {
            Value::Str(s) => Value::Str(s),
            other => Value::Str(other.to_string()),
        },
        // `auto` was already resolved to a concrete type by the analyzer;
        // an evaluator that still sees it keeps the value as evaluated.
        TypeName::Auto => value,
    }
}

pub fn coerce_like(existing: &Value, incoming: Value) -> Value {
    coerce_to(incoming, existing.tag())
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l.rank(), r.rank()) {
        (Some(_), Some(_)) => l.as_f64() == r.as_f64(),
        _ => match (l, r) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => l.to_string() == r.to_string(),
        },
    }
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ if l.rank().is_some() && r.rank().is_some() => l.as_f64().partial_cmp(&r.as_f64()),
        _ => None,
    }
}

/// Shared arithmetic: integer when both operands rank `char` or `int`,
/// floating otherwise, `double` winning over `float` per the lattice.
fn numeric_binary(
    l: Value,
    r: Value,
    span: Span,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (l.rank(), r.rank()) {
        (Some(lr), Some(rr)) if lr <= 1 && rr <= 1 => Ok(Value::Int(int_op(l.as_i64(), r.as_i64()))),
        (Some(_), Some(_)) => {
            let result = float_op(l.as_f64(), r.as_f64());
            if matches!(l, Value::Double(_)) || matches!(r, Value::Double(_)) {
                Ok(Value::Double(result))
            } else {
                Ok(Value::Float(result as f32))
            }
        }
        _ => Err(RuntimeError::Unsupported {
            detail: format!("arithmetic on non-numeric operands at line {}", span.line),
        }),
    }
}

fn add(l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    if matches!(l, Value::Str(_)) || matches!(r, Value::Str(_)) {
        Ok(Value::Str(format!("{l}{r}")))
    } else {
        numeric_binary(l, r, span, |a, b| a.wrapping_add(b), |a, b| a + b)
    }
}

fn division(l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    match (l.rank(), r.rank()) {
        (Some(lr), Some(rr)) if lr <= 1 && rr <= 1 => {
            let (li, ri) = (l.as_i64(), r.as_i64());
            if ri == 0 {
                return Err(RuntimeError::DivisionByZero {
                    line: span.line,
                    column: span.column,
                });
            }
            Ok(Value::Int(li / ri))
        }
        (Some(_), Some(_)) => {
            let result = l.as_f64() / r.as_f64();
            if matches!(l, Value::Double(_)) || matches!(r, Value::Double(_)) {
                Ok(Value::Double(result))
            } else {
                Ok(Value::Float(result as f32))
            }
        }
        _ => Err(RuntimeError::Unsupported {
            detail: format!("division on non-numeric operands at line {}", span.line),
        }),
    }
}

fn modulo(l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    match (l.rank(), r.rank()) {
        (Some(lr), Some(rr)) if lr <= 1 && rr <= 1 => {
            let (li, ri) = (l.as_i64(), r.as_i64());
            if ri == 0 {
                return Err(RuntimeError::DivisionByZero {
                    line: span.line,
                    column: span.column,
                });
            }
            Ok(Value::Int(li % ri))
        }
        (Some(_), Some(_)) => {
            let result = l.as_f64() % r.as_f64();
            if matches!(l, Value::Double(_)) || matches!(r, Value::Double(_)) {
                Ok(Value::Double(result))
            } else {
                Ok(Value::Float(result as f32))
            }
        }
        _ => Err(RuntimeError::Unsupported {
            detail: format!("modulo on non-numeric operands at line {}", span.line),
        }),
    }
}

/// Every binary operator except `&&`, `||`, and `<<`, which the evaluator
/// dispatches itself: short-circuiting and the stream/shift split both need
/// the unevaluated right-hand expression, not an already-reduced `Value`.
pub fn apply_binary(op: BinOp, l: Value, r: Value, span: Span) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => add(l, r, span),
        BinOp::Sub => numeric_binary(l, r, span, |a, b| a.wrapping_sub(b), |a, b| a - b),
        BinOp::Mul => numeric_binary(l, r, span, |a, b| a.wrapping_mul(b), |a, b| a * b),
        BinOp::Div => division(l, r, span),
        BinOp::Mod => modulo(l, r, span),
        BinOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        BinOp::NotEq => Ok(Value::Bool(!values_equal(&l, &r))),
        BinOp::Lt => Ok(Value::Bool(compare(&l, &r) == Some(Ordering::Less))),
        BinOp::Gt => Ok(Value::Bool(compare(&l, &r) == Some(Ordering::Greater))),
        BinOp::LtEq => Ok(Value::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Less | Ordering::Equal)
        ))),
        BinOp::GtEq => Ok(Value::Bool(matches!(
            compare(&l, &r),
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        BinOp::And | BinOp::Or | BinOp::Shl => Err(RuntimeError::Unsupported {
            detail: "short-circuit and stream operators must be dispatched by the evaluator".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::point(0, 1, 1)
    }

    #[test]
    fn int_division_truncates() {
        let result = apply_binary(BinOp::Div, Value::Int(7), Value::Int(2), dummy_span()).unwrap();
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn mixed_int_and_double_divides_as_double() {
        let result = apply_binary(BinOp::Div, Value::Int(7), Value::Double(2.0), dummy_span()).unwrap();
        assert_eq!(result, Value::Double(3.5));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let err = apply_binary(BinOp::Div, Value::Int(1), Value::Int(0), dummy_span()).unwrap_err();
        assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
    }

    #[test]
    fn string_concatenation_with_add() {
        let result = apply_binary(
            BinOp::Add,
            Value::Str("a".to_string()),
            Value::Str("b".to_string()),
            dummy_span(),
        )
        .unwrap();
        assert_eq!(result, Value::Str("ab".to_string()));
    }

    #[test]
    fn numeric_string_display_strips_no_quotes() {
        assert_eq!(Value::Str("hello".to_string()).to_string(), "hello");
    }

    #[test]
    fn bool_displays_as_one_or_zero() {
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::Bool(false).to_string(), "0");
    }

    #[test]
    fn coerce_to_int_truncates_a_double() {
        assert_eq!(coerce_to(Value::Double(3.9), TypeName::Int), Value::Int(3));
    }

    #[test]
    fn coerce_like_preserves_the_existing_variables_tag() {
        let existing = Value::Double(1.0);
        assert_eq!(coerce_like(&existing, Value::Int(5)), Value::Double(5.0));
    }

    #[test]
    fn comparison_across_char_and_int_uses_numeric_rank() {
        let result = apply_binary(BinOp::Lt, Value::Char('a'), Value::Int(100), dummy_span()).unwrap();
        assert_eq!(result, Value::Bool(('a' as i64) < 100));
    }
}
