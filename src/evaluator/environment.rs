use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::Error;
use crate::ast::{Builtin, Symbol, Value};
use crate::builtinops::{Arity, BuiltinOp};

/// Shared handle to an environment.
///
/// Closures, child scopes and in-flight evaluations all hold clones of the same
/// `Rc`; a scope lives as long as any of them does.
pub type Env = Rc<Environment>;

/// One lexical scope: its own bindings plus an optional outer scope.
#[derive(Default)]
pub struct Environment {
    bindings: RefCell<HashMap<Symbol, Value>>,
    outer: Option<Env>,
}

impl Environment {
    /// Create a root environment with no outer scope.
    pub fn new() -> Env {
        Rc::new(Environment::default())
    }

    /// Create an empty scope nested inside `outer`.
    pub fn with_outer(outer: &Env) -> Env {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(Rc::clone(outer)),
        })
    }

    /// Bind `name` in this scope only, replacing any previous binding here.
    pub fn set(&self, name: Symbol, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Look `name` up through the outer chain.
    pub fn find(&self, name: Symbol) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.bindings.borrow().get(&name) {
                return Some(value.clone());
            }
            scope = scope.outer.as_deref()?;
        }
    }

    /// Look `name` up through the outer chain, failing with [`Error::NotFound`].
    pub fn get(&self, name: Symbol) -> Result<Value, Error> {
        self.find(name).ok_or_else(|| Error::NotFound(name.name()))
    }

    pub fn define(&self, name: &str, value: Value) {
        self.set(Symbol::intern(name), value);
    }

    /// Register a native function under `name`.
    ///
    /// The argument count is checked against `arity` before `func` runs.
    ///
    /// # Example
    /// ```
    /// use lispxp::ast::Value;
    /// use lispxp::builtinops::Arity;
    /// use lispxp::evaluator::create_global_env;
    /// use lispxp::Error;
    ///
    /// fn answer(_args: &[Value]) -> Result<Value, Error> {
    ///     Ok(Value::Number(42))
    /// }
    ///
    /// let env = create_global_env();
    /// env.register_builtin_function("answer", Arity::Exact(0), answer);
    /// assert_eq!(lispxp::rep("(answer)", &env).unwrap(), "42");
    /// ```
    pub fn register_builtin_function(
        &self,
        name: &str,
        arity: Arity,
        func: impl Fn(&[Value]) -> Result<Value, Error> + 'static,
    ) {
        let builtin = Builtin::new(name, move |args: &[Value]| {
            arity.validate(args.len())?;
            func(args)
        });
        self.define(name, Value::Builtin(builtin));
    }

    /// Bind a registry operation under its own name; calls go through [`BuiltinOp::call`].
    pub fn register_builtin_op(&self, op: &'static BuiltinOp) {
        let builtin = Builtin::new(op.name, move |args: &[Value]| op.call(args));
        self.define(op.name, Value::Builtin(builtin));
    }

    /// Get all bindings visible from this scope, inner bindings shadowing outer ones.
    /// Returns (name, value) pairs sorted by name.
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut visible = HashMap::new();
        let mut scope = Some(self);
        while let Some(current) = scope {
            for (name, value) in current.bindings.borrow().iter() {
                visible.entry(*name).or_insert_with(|| value.clone());
            }
            scope = current.outer.as_deref();
        }

        let mut result: Vec<_> = visible
            .into_iter()
            .map(|(name, value)| (name.name(), value))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

// Bindings may hold closures that point back at this scope, so only names are shown.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.borrow();
        let mut names: Vec<Symbol> = bindings.keys().copied().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("outer", &self.outer.is_some())
            .finish()
    }
}
