//! Per-call activation record (§4.4): a stack of name→value layers so a
//! nested block can shadow an outer local and drop it cleanly on exit,
//! while a function's own body shares its bottom layer with its
//! parameters — the runtime counterpart of the analyzer not pushing an
//! extra `Block` scope for a function's top-level braces (§4.3).

use cppi_util::Symbol;
use rustc_hash::FxHashMap;

use crate::value::Value;

pub struct Frame {
    layers: Vec<FxHashMap<Symbol, Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            layers: vec![FxHashMap::default()],
        }
    }

    pub fn push_layer(&mut self) {
        self.layers.push(FxHashMap::default());
    }

    pub fn pop_layer(&mut self) {
        self.layers.pop();
    }

    pub fn declare(&mut self, name: Symbol, value: Value) {
        self.layers
            .last_mut()
            .expect("a frame always has at least one layer")
            .insert(name, value);
    }

    pub fn get(&self, name: Symbol) -> Option<Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(&name).cloned())
    }

    /// Stores into whichever layer already binds `name`, walking outward
    /// from the innermost. Returns `false` if no layer does.
    pub fn set(&mut self, name: Symbol, value: Value) -> bool {
        for layer in self.layers.iter_mut().rev() {
            if layer.contains_key(&name) {
                layer.insert(name, value);
                return true;
            }
        }
        false
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_layer_shadows_and_restores() {
        let mut frame = Frame::new();
        let x = Symbol::intern("frame_test_x");
        frame.declare(x, Value::Int(1));
        frame.push_layer();
        frame.declare(x, Value::Int(2));
        assert_eq!(frame.get(x), Some(Value::Int(2)));
        frame.pop_layer();
        assert_eq!(frame.get(x), Some(Value::Int(1)));
    }

    #[test]
    fn set_reaches_through_to_the_declaring_layer() {
        let mut frame = Frame::new();
        let y = Symbol::intern("frame_test_y");
        frame.declare(y, Value::Int(10));
        frame.push_layer();
        assert!(frame.set(y, Value::Int(20)));
        frame.pop_layer();
        assert_eq!(frame.get(y), Some(Value::Int(20)));
    }

    #[test]
    fn set_on_unknown_name_reports_failure() {
        let mut frame = Frame::new();
        assert!(!frame.set(Symbol::intern("frame_test_never_declared"), Value::Int(0)));
    }
}
