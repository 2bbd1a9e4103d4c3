//! This module defines the runtime value model of the interpreter. The main enum,
//! [`Value`], is a closed set of variants covering atoms, interned symbols and
//! keywords, sequences, mappings, closures, builtins and atoms. Symbols and keywords
//! are interned through a per-thread [`StringInterner`], so comparing or hashing
//! them is a comparison of small integer ids. Ergonomic helpers such as [`val`],
//! [`sym`], [`kw`] and [`nil`] build values in code and tests, and conversion
//! traits cover common Rust types.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

use crate::Error;
use crate::evaluator::Env;

/// Type alias for number values in the interpreter
pub type NumberType = i64;

/// Canonical erased builtin function type used by the evaluator.
pub type OperationFn = dyn Fn(&[Value]) -> Result<Value, Error>;

type SymbolInterner = StringInterner<DefaultBackend>;

thread_local! {
    static INTERNER: RefCell<SymbolInterner> = RefCell::new(SymbolInterner::new());
}

/// An interned name, used for both symbols and keywords.
///
/// Two `Symbol`s are equal exactly when their names are equal. Ordering
/// compares names, so collections keyed by symbols sort alphabetically.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(DefaultSymbol);

impl Symbol {
    pub fn intern(name: &str) -> Self {
        INTERNER.with(|interner| Symbol(interner.borrow_mut().get_or_intern(name)))
    }

    /// Run `f` with the name of this symbol.
    pub fn with_name<R>(self, f: impl FnOnce(&str) -> R) -> R {
        INTERNER.with(|interner| f(interner.borrow().resolve(self.0).unwrap_or_default()))
    }

    pub fn name(self) -> String {
        self.with_name(str::to_owned)
    }

    pub fn is(self, name: &str) -> bool {
        self.with_name(|own| own == name)
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            return Ordering::Equal;
        }
        INTERNER.with(|interner| {
            let interner = interner.borrow();
            interner.resolve(self.0).cmp(&interner.resolve(other.0))
        })
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_name(|name| f.write_str(name))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_name(|name| f.write_str(name))
    }
}

/// Keys allowed in a [`Value::Map`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Number(NumberType),
    String(Rc<str>),
    Keyword(Symbol),
}

impl MapKey {
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Number(n) => Value::Number(*n),
            MapKey::String(s) => Value::String(Rc::clone(s)),
            MapKey::Keyword(k) => Value::Keyword(*k),
        }
    }
}

impl TryFrom<&Value> for MapKey {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Number(n) => Ok(MapKey::Number(*n)),
            Value::String(s) => Ok(MapKey::String(Rc::clone(s))),
            Value::Keyword(k) => Ok(MapKey::Keyword(*k)),
            other => Err(Error::TypeError(format!(
                "map keys must be strings, keywords or numbers, got {other}"
            ))),
        }
    }
}

pub type Map = BTreeMap<MapKey, Value>;

/// Parameter binding spec of a closure: fixed names, then an optional rest name after `&`.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub fixed: Vec<Symbol>,
    pub rest: Option<Symbol>,
}

/// A user-defined function or macro.
pub struct Closure {
    pub params: Params,
    pub body: Value,
    pub env: Env,
    pub is_macro: bool,
}

/// A native function bound under `name`.
#[derive(Clone)]
pub struct Builtin {
    pub name: Rc<str>,
    pub func: Rc<OperationFn>,
}

impl Builtin {
    pub fn new(name: &str, func: impl Fn(&[Value]) -> Result<Value, Error> + 'static) -> Self {
        Builtin {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        (self.func)(args)
    }
}

/// Core value type of the interpreter.
///
/// Everything except [`Value::Atom`] is immutable once built: evaluation always
/// produces new values. Lists and vectors with equal elements compare equal.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(NumberType),
    Symbol(Symbol),
    Keyword(Symbol),
    String(Rc<str>),
    List(Rc<[Value]>),
    Vector(Rc<[Value]>),
    Map(Rc<Map>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// Mutable reference cell, compared by identity
    Atom(Rc<RefCell<Value>>),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(items.into())
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(items.into())
    }

    pub fn map(entries: Map) -> Value {
        Value::Map(Rc::new(entries))
    }

    pub fn atom(value: Value) -> Value {
        Value::Atom(Rc::new(RefCell::new(value)))
    }

    /// Everything except `nil` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Elements of a list or vector.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Some(items.as_ref()),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    /// True if this value is a symbol with the given name.
    pub fn is_symbol(&self, name: &str) -> bool {
        matches!(self, Value::Symbol(s) if s.is(name))
    }

    /// If this is a non-empty list headed by the symbol `name`, the remaining elements.
    pub fn form_args(&self, name: &str) -> Option<&[Value]> {
        match self {
            Value::List(items) => match items.split_first() {
                Some((head, rest)) if head.is_symbol(name) => Some(rest),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Closure(c) if c.is_macro => "macro",
            Value::Closure(_) | Value::Builtin(_) => "function",
            Value::Atom(_) => "atom",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Keyword(k) => write!(f, "Keyword({k})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(&&items[..]).finish(),
            Value::Vector(items) => f.debug_tuple("Vector").field(&&items[..]).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Closure(c) => write!(
                f,
                "Closure(params={:?}, body={:?}, macro={})",
                c.params, c.body, c.is_macro
            ),
            Value::Builtin(b) => write!(f, "Builtin({})", b.name),
            Value::Atom(cell) => write!(f, "Atom({:?})", cell.borrow()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::printer::pr_str(self, true))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) | (Value::Keyword(a), Value::Keyword(b)) => {
                a == b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::List(a) | Value::Vector(a),
                Value::List(b) | Value::Vector(b),
            ) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            // Builtins compare by name, not function pointer
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Atom(a), Value::Atom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// From trait implementations for Value - enables .into() conversion
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl From<Map> for Value {
    fn from(entries: Map) -> Self {
        Value::map(entries)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(Into::into).collect())
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

/// Helper for creating symbols
pub fn sym<S: AsRef<str>>(name: S) -> Value {
    Value::Symbol(Symbol::intern(name.as_ref()))
}

/// Helper for creating keywords, given the name without the leading colon
pub fn kw<S: AsRef<str>>(name: S) -> Value {
    Value::Keyword(Symbol::intern(name.as_ref()))
}

/// Helper for creating values from anything convertible
pub fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper for creating the empty list
pub fn nil() -> Value {
    Value::list(Vec::new())
}
