//! Built-in operations registry.
//!
//! Every native function bound in a fresh global environment is listed once in
//! [`BUILTIN_OPS`] with its name, its [`Arity`] and a plain function pointer
//! taking the evaluated arguments.
//!
//! ```text
//! (+ 1 2 3)              ; arithmetic, overflow is an error
//! (< 1 2 3)              ; chained comparison
//! (conj [1 2] 3)         ; sequence operations
//! (swap! counter + 1)    ; atoms
//! ```
//!
//! ## Error Handling
//!
//! - **Arity Checking**: argument counts are validated against the registered
//!   [`Arity`] before the function runs, so implementations may index `args`.
//! - **Type Safety**: operations reject arguments of the wrong kind with
//!   [`Error::TypeError`]; there is no implicit coercion between numbers and strings.
//! - **Overflow Detection**: integer arithmetic is checked and reports
//!   [`Error::EvalError`] instead of wrapping.
//!
//! ## Adding New Operations
//!
//! 1. Implement the function with the signature `fn(&[Value]) -> Result<Value, Error>`
//! 2. Add a [`BuiltinOp`] entry to `BUILTIN_OPS` with its name and arity
//! 3. Add tests covering edge cases and error conditions
//!
//! Builtins that call back into user code (`apply`, `map`, `swap!`) go through
//! [`crate::evaluator::apply`]. `eval` needs the global environment and is
//! registered by [`crate::evaluator::create_global_env`] instead.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rustyline::error::ReadlineError;
use smallvec::SmallVec;

use crate::Error;
use crate::ast::{Map, MapKey, NumberType, Symbol, Value};
use crate::evaluator::apply;
use crate::printer::pr_seq;
use crate::reader::read_str;

/// Number of arguments an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
    /// Between min and max arguments, inclusive
    Between(usize, usize),
    /// Any number of arguments
    Any,
}

impl Arity {
    pub fn validate(self, got: usize) -> Result<(), Error> {
        let ok = match self {
            Arity::Exact(n) => got == n,
            Arity::AtLeast(n) => got >= n,
            Arity::Between(min, max) => (min..=max).contains(&got),
            Arity::Any => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::arity_error(self, got))
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Between(min, max) => write!(f, "{min} to {max}"),
            Arity::Any => write!(f, "any number"),
        }
    }
}

/// Signature shared by every registered builtin.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, Error>;

/// Definition of a built-in operation
#[derive(Clone, Copy)]
pub struct BuiltinOp {
    /// The name the operation is bound to in the global environment
    pub name: &'static str,
    /// Expected number of arguments
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl BuiltinOp {
    /// Validate the argument count, then run the operation.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        self.arity.validate(args.len())?;
        (self.func)(args)
    }
}

impl fmt::Debug for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinOp")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        // Names uniquely identify operations
        self.name == other.name
    }
}

//
// Argument helpers
//

fn type_error(op: &str, expected: &str, got: &Value) -> Error {
    Error::TypeError(format!("{op}: expected {expected}, got {}", got.type_name()))
}

fn expect_number(op: &str, value: &Value) -> Result<NumberType, Error> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(type_error(op, "number", other)),
    }
}

fn expect_string<'a>(op: &str, value: &'a Value) -> Result<&'a str, Error> {
    match value {
        Value::String(s) => Ok(s.as_ref()),
        other => Err(type_error(op, "string", other)),
    }
}

fn expect_seq<'a>(op: &str, value: &'a Value) -> Result<&'a [Value], Error> {
    value
        .as_seq()
        .ok_or_else(|| type_error(op, "list or vector", value))
}

/// Like [`expect_seq`], with `nil` read as the empty sequence.
fn expect_seq_or_nil<'a>(op: &str, value: &'a Value) -> Result<&'a [Value], Error> {
    match value {
        Value::Nil => Ok(&[][..]),
        other => expect_seq(op, other),
    }
}

fn expect_map<'a>(op: &str, value: &'a Value) -> Result<&'a Map, Error> {
    match value {
        Value::Map(entries) => Ok(entries.as_ref()),
        other => Err(type_error(op, "map", other)),
    }
}

fn numbers(op: &str, args: &[Value]) -> Result<SmallVec<[NumberType; 8]>, Error> {
    args.iter().map(|arg| expect_number(op, arg)).collect()
}

fn overflow(op: &str) -> Error {
    Error::EvalError(format!("integer overflow in {op}"))
}

fn count_value(n: usize) -> Value {
    Value::Number(n as NumberType)
}

/// Insert alternating keys and values into `entries`.
fn insert_pairs(op: &str, entries: &mut Map, pairs: &[Value]) -> Result<(), Error> {
    if pairs.len() % 2 != 0 {
        return Err(Error::EvalError(format!(
            "{op}: expected key/value pairs, got an odd number of forms"
        )));
    }
    for pair in pairs.chunks_exact(2) {
        entries.insert(MapKey::try_from(&pair[0])?, pair[1].clone());
    }
    Ok(())
}

//
// Builtin Function Implementations
//

fn builtin_add(args: &[Value]) -> Result<Value, Error> {
    let mut sum: NumberType = 0;
    for n in numbers("+", args)? {
        sum = sum.checked_add(n).ok_or_else(|| overflow("addition"))?;
    }
    Ok(Value::Number(sum))
}

fn builtin_sub(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("-", args)?;
    let (first, rest) = nums
        .split_first()
        .ok_or_else(|| Error::arity_error(Arity::AtLeast(1), 0))?;

    if rest.is_empty() {
        return first
            .checked_neg()
            .map(Value::Number)
            .ok_or_else(|| overflow("negation"));
    }

    let mut result = *first;
    for n in rest {
        result = result.checked_sub(*n).ok_or_else(|| overflow("subtraction"))?;
    }
    Ok(Value::Number(result))
}

fn builtin_mul(args: &[Value]) -> Result<Value, Error> {
    let mut product: NumberType = 1;
    for n in numbers("*", args)? {
        product = product
            .checked_mul(n)
            .ok_or_else(|| overflow("multiplication"))?;
    }
    Ok(Value::Number(product))
}

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("/", args)?;
    let (first, rest) = nums
        .split_first()
        .ok_or_else(|| Error::arity_error(Arity::AtLeast(1), 0))?;

    if rest.is_empty() {
        return match first {
            0 => Err(Error::EvalError("division by zero".to_owned())),
            _ => Ok(Value::Number(1 / first)),
        };
    }

    let mut result = *first;
    for n in rest {
        if *n == 0 {
            return Err(Error::EvalError("division by zero".to_owned()));
        }
        result = result.checked_div(*n).ok_or_else(|| overflow("division"))?;
    }
    Ok(Value::Number(result))
}

fn builtin_rem(args: &[Value]) -> Result<Value, Error> {
    let nums = numbers("%", args)?;
    let mut result = nums[0];
    for n in &nums[1..] {
        if *n == 0 {
            return Err(Error::EvalError("division by zero".to_owned()));
        }
        result = result.checked_rem(*n).ok_or_else(|| overflow("remainder"))?;
    }
    Ok(Value::Number(result))
}

fn builtin_inc(args: &[Value]) -> Result<Value, Error> {
    let n = expect_number("1+", &args[0])?;
    n.checked_add(1)
        .map(Value::Number)
        .ok_or_else(|| overflow("1+"))
}

fn builtin_dec(args: &[Value]) -> Result<Value, Error> {
    let n = expect_number("1-", &args[0])?;
    n.checked_sub(1)
        .map(Value::Number)
        .ok_or_else(|| overflow("1-"))
}

fn builtin_abs(args: &[Value]) -> Result<Value, Error> {
    let n = expect_number("abs", &args[0])?;
    n.checked_abs()
        .map(Value::Number)
        .ok_or_else(|| overflow("abs"))
}

fn builtin_is_zero(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(expect_number("zero?", &args[0])? == 0))
}

// Macro to generate chained numeric comparison functions
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let nums = numbers($op_str, args)?;
            // All adjacent pairs must satisfy the comparison
            Ok(Value::Bool(nums.windows(2).all(|pair| pair[0] $op pair[1])))
        }
    };
}

numeric_comparison!(builtin_lt, <, "<");
numeric_comparison!(builtin_le, <=, "<=");
numeric_comparison!(builtin_gt, >, ">");
numeric_comparison!(builtin_ge, >=, ">=");

fn builtin_equal(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(args[0] == args[1]))
}

fn builtin_not_equal(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(args[0] != args[1]))
}

// Macro to generate single-argument type predicates
macro_rules! type_predicate {
    ($name:ident, $pattern:pat) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            Ok(Value::Bool(matches!(&args[0], $pattern)))
        }
    };
}

type_predicate!(builtin_is_nil, Value::Nil);
type_predicate!(builtin_is_true, Value::Bool(true));
type_predicate!(builtin_is_false, Value::Bool(false));
type_predicate!(builtin_is_symbol, Value::Symbol(_));
type_predicate!(builtin_is_keyword, Value::Keyword(_));
type_predicate!(builtin_is_string, Value::String(_));
type_predicate!(builtin_is_number, Value::Number(_));
type_predicate!(builtin_is_list, Value::List(_));
type_predicate!(builtin_is_vector, Value::Vector(_));
type_predicate!(builtin_is_sequential, Value::List(_) | Value::Vector(_));
type_predicate!(builtin_is_map, Value::Map(_));
type_predicate!(builtin_is_atom, Value::Atom(_));

fn builtin_is_fn(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(match &args[0] {
        Value::Closure(closure) => !closure.is_macro,
        Value::Builtin(_) => true,
        _ => false,
    }))
}

fn builtin_is_macro(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::Bool(
        matches!(&args[0], Value::Closure(closure) if closure.is_macro),
    ))
}

fn builtin_is_empty(args: &[Value]) -> Result<Value, Error> {
    let empty = match &args[0] {
        Value::Nil => true,
        Value::List(items) | Value::Vector(items) => items.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        Value::String(s) => s.is_empty(),
        other => return Err(type_error("empty?", "collection", other)),
    };
    Ok(Value::Bool(empty))
}

fn builtin_contains(args: &[Value]) -> Result<Value, Error> {
    let entries = expect_map("contains?", &args[0])?;
    let found = MapKey::try_from(&args[1]).is_ok_and(|key| entries.contains_key(&key));
    Ok(Value::Bool(found))
}

fn builtin_symbol(args: &[Value]) -> Result<Value, Error> {
    let name = expect_string("symbol", &args[0])?;
    Ok(Value::Symbol(Symbol::intern(name)))
}

fn builtin_keyword(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Keyword(_) => Ok(args[0].clone()),
        Value::String(name) => Ok(Value::Keyword(Symbol::intern(name))),
        other => Err(type_error("keyword", "string or keyword", other)),
    }
}

fn builtin_list(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::list(args.to_vec()))
}

fn builtin_vector(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::vector(args.to_vec()))
}

fn builtin_hash_map(args: &[Value]) -> Result<Value, Error> {
    let mut entries = Map::new();
    insert_pairs("hash-map", &mut entries, args)?;
    Ok(Value::map(entries))
}

fn builtin_vec(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Vector(_) => Ok(args[0].clone()),
        other => Ok(Value::vector(expect_seq_or_nil("vec", other)?.to_vec())),
    }
}

/// The elements of a collection as a list, or `nil` when there are none.
fn builtin_seq(args: &[Value]) -> Result<Value, Error> {
    let items: Vec<Value> = match &args[0] {
        Value::Nil => return Ok(Value::Nil),
        Value::List(items) | Value::Vector(items) => items.to_vec(),
        Value::String(s) => s.chars().map(|c| Value::from(c.to_string())).collect(),
        other => return Err(type_error("seq", "list, vector, string or nil", other)),
    };
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items))
    }
}

fn builtin_cons(args: &[Value]) -> Result<Value, Error> {
    let tail = expect_seq_or_nil("cons", &args[1])?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

fn builtin_concat(args: &[Value]) -> Result<Value, Error> {
    let mut items = Vec::new();
    for arg in args {
        items.extend_from_slice(expect_seq_or_nil("concat", arg)?);
    }
    Ok(Value::list(items))
}

/// Lists grow at the front, vectors at the back.
fn builtin_conj(args: &[Value]) -> Result<Value, Error> {
    let (target, extra) = (&args[0], &args[1..]);
    match target {
        Value::List(items) => {
            let mut result: Vec<Value> = extra.iter().rev().cloned().collect();
            result.extend_from_slice(items);
            Ok(Value::list(result))
        }
        Value::Vector(items) => {
            let mut result = items.to_vec();
            result.extend_from_slice(extra);
            Ok(Value::vector(result))
        }
        other => Err(type_error("conj", "list or vector", other)),
    }
}

fn builtin_count(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Nil => Ok(count_value(0)),
        Value::List(items) | Value::Vector(items) => Ok(count_value(items.len())),
        Value::Map(entries) => Ok(count_value(entries.len())),
        other => Err(type_error("count", "collection", other)),
    }
}

fn builtin_nth(args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq("nth", &args[0])?;
    let index = expect_number("nth", &args[1])?;
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| {
            Error::EvalError(format!(
                "nth: index {index} out of range for {} elements",
                items.len()
            ))
        })
}

fn builtin_first(args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq_or_nil("first", &args[0])?;
    Ok(items.first().cloned().unwrap_or(Value::Nil))
}

fn builtin_rest(args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq_or_nil("rest", &args[0])?;
    Ok(Value::list(items.iter().skip(1).cloned().collect()))
}

/// `(apply f a b [c d])` calls `f` with `a b c d`.
fn builtin_apply(args: &[Value]) -> Result<Value, Error> {
    let (func, rest) = (&args[0], &args[1..]);
    let Some((last, leading)) = rest.split_last() else {
        return Err(Error::arity_error(Arity::AtLeast(2), args.len()));
    };

    let mut call_args: Vec<Value> = leading.to_vec();
    call_args.extend_from_slice(expect_seq_or_nil("apply", last)?);
    apply(func, &call_args)
}

fn builtin_map(args: &[Value]) -> Result<Value, Error> {
    let items = expect_seq_or_nil("map", &args[1])?;
    let results = items
        .iter()
        .map(|item| apply(&args[0], std::slice::from_ref(item)))
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(Value::list(results))
}

fn builtin_assoc(args: &[Value]) -> Result<Value, Error> {
    let mut entries = expect_map("assoc", &args[0])?.clone();
    insert_pairs("assoc", &mut entries, &args[1..])?;
    Ok(Value::map(entries))
}

fn builtin_dissoc(args: &[Value]) -> Result<Value, Error> {
    let mut entries = expect_map("dissoc", &args[0])?.clone();
    for key in &args[1..] {
        entries.remove(&MapKey::try_from(key)?);
    }
    Ok(Value::map(entries))
}

fn builtin_get(args: &[Value]) -> Result<Value, Error> {
    let entries = match &args[0] {
        Value::Nil => return Ok(Value::Nil),
        other => expect_map("get", other)?,
    };
    Ok(MapKey::try_from(&args[1])
        .ok()
        .and_then(|key| entries.get(&key).cloned())
        .unwrap_or(Value::Nil))
}

fn builtin_keys(args: &[Value]) -> Result<Value, Error> {
    let entries = expect_map("keys", &args[0])?;
    Ok(Value::list(entries.keys().map(MapKey::to_value).collect()))
}

fn builtin_vals(args: &[Value]) -> Result<Value, Error> {
    let entries = expect_map("vals", &args[0])?;
    Ok(Value::list(entries.values().cloned().collect()))
}

fn builtin_atom(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::atom(args[0].clone()))
}

fn builtin_deref(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Atom(cell) => Ok(cell.borrow().clone()),
        other => Err(type_error("deref", "atom", other)),
    }
}

fn builtin_reset(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Atom(cell) => {
            cell.replace(args[1].clone());
            Ok(args[1].clone())
        }
        other => Err(type_error("reset!", "atom", other)),
    }
}

/// `(swap! a f x y)` stores `(f @a x y)` in `a` and returns it.
fn builtin_swap(args: &[Value]) -> Result<Value, Error> {
    let Value::Atom(cell) = &args[0] else {
        return Err(type_error("swap!", "atom", &args[0]));
    };

    // The function may read the atom itself, so no borrow is held across the call
    let current = cell.borrow().clone();
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(current);
    call_args.extend_from_slice(&args[2..]);

    let updated = apply(&args[1], &call_args)?;
    cell.replace(updated.clone());
    Ok(updated)
}

fn builtin_throw(args: &[Value]) -> Result<Value, Error> {
    Err(Error::Raised(args[0].clone()))
}

fn builtin_str(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(pr_seq(args, false, "")))
}

fn builtin_pr_str(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(pr_seq(args, true, " ")))
}

fn builtin_prn(args: &[Value]) -> Result<Value, Error> {
    println!("{}", pr_seq(args, true, " "));
    Ok(Value::Nil)
}

fn builtin_println(args: &[Value]) -> Result<Value, Error> {
    println!("{}", pr_seq(args, false, " "));
    Ok(Value::Nil)
}

/// `(substr s start [length])` with a 1-based `start`, counted in characters.
fn builtin_substr(args: &[Value]) -> Result<Value, Error> {
    let text = expect_string("substr", &args[0])?;
    let start = expect_number("substr", &args[1])?;
    let length = args
        .get(2)
        .map(|arg| expect_number("substr", arg))
        .transpose()?;

    let char_count = text.chars().count();
    let skip = usize::try_from(start)
        .ok()
        .and_then(|start| start.checked_sub(1))
        .filter(|skip| *skip <= char_count)
        .ok_or_else(|| {
            Error::EvalError(format!(
                "substr: start {start} out of range for {char_count} characters"
            ))
        })?;
    let take = match length {
        None => char_count,
        Some(n) => usize::try_from(n)
            .map_err(|_| Error::EvalError(format!("substr: negative length {n}")))?,
    };
    Ok(Value::from(text.chars().skip(skip).take(take).collect::<String>()))
}

/// Leading integer of a string, ignoring surrounding whitespace; `0` when there is none.
fn builtin_atoi(args: &[Value]) -> Result<Value, Error> {
    let text = expect_string("atoi", &args[0])?.trim_start();
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .map_or(unsigned, |end| &unsigned[..end]);
    if digits.is_empty() {
        return Ok(Value::Number(0));
    }
    let literal = &text[..text.len() - unsigned.len() + digits.len()];
    literal
        .parse::<NumberType>()
        .map(Value::Number)
        .map_err(|_| overflow("atoi"))
}

fn builtin_chr(args: &[Value]) -> Result<Value, Error> {
    let code = expect_number("chr", &args[0])?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::from(c.to_string()))
        .ok_or_else(|| Error::EvalError(format!("chr: {code} is not a character code")))
}

/// Code of the first character, `0` for the empty string.
fn builtin_ascii(args: &[Value]) -> Result<Value, Error> {
    let text = expect_string("ascii", &args[0])?;
    let code = text.chars().next().map_or(0, |c| NumberType::from(u32::from(c)));
    Ok(Value::Number(code))
}

fn builtin_read_string(args: &[Value]) -> Result<Value, Error> {
    read_str(expect_string("read-string", &args[0])?)
}

fn builtin_slurp(args: &[Value]) -> Result<Value, Error> {
    let path = expect_string("slurp", &args[0])?;
    std::fs::read_to_string(path)
        .map(Value::from)
        .map_err(|e| Error::EvalError(format!("slurp: cannot read '{path}': {e}")))
}

/// Prompt on the terminal and return the entered line, or `nil` at end of input.
fn builtin_readline(args: &[Value]) -> Result<Value, Error> {
    let prompt = expect_string("readline", &args[0])?;
    let mut editor = rustyline::DefaultEditor::new()
        .map_err(|e| Error::EvalError(format!("readline: {e}")))?;
    match editor.readline(prompt) {
        Ok(line) => Ok(Value::from(line)),
        Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(Value::Nil),
        Err(e) => Err(Error::EvalError(format!("readline: {e}"))),
    }
}

/// Terminate the process with the given status, `0` by default.
fn builtin_exit(args: &[Value]) -> Result<Value, Error> {
    let status = match args.first() {
        Some(arg) => {
            let code = expect_number("exit", arg)?;
            i32::try_from(code)
                .map_err(|_| Error::EvalError(format!("exit: status {code} out of range")))?
        }
        None => 0,
    };
    std::process::exit(status)
}

fn builtin_time_ms(_args: &[Value]) -> Result<Value, Error> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| Error::EvalError(format!("time-ms: {e}")))?;
    NumberType::try_from(elapsed.as_millis())
        .map(Value::Number)
        .map_err(|_| overflow("time-ms"))
}

/// Global registry of all built-in operations.
static BUILTIN_OPS: &[BuiltinOp] = &[
    // Arithmetic operations
    BuiltinOp {
        name: "+",
        arity: Arity::Any,
        func: builtin_add,
    },
    BuiltinOp {
        name: "-",
        arity: Arity::AtLeast(1),
        func: builtin_sub,
    },
    BuiltinOp {
        name: "*",
        arity: Arity::Any,
        func: builtin_mul,
    },
    BuiltinOp {
        name: "/",
        arity: Arity::AtLeast(1),
        func: builtin_div,
    },
    BuiltinOp {
        name: "%",
        arity: Arity::AtLeast(2),
        func: builtin_rem,
    },
    BuiltinOp {
        name: "1+",
        arity: Arity::Exact(1),
        func: builtin_inc,
    },
    BuiltinOp {
        name: "1-",
        arity: Arity::Exact(1),
        func: builtin_dec,
    },
    BuiltinOp {
        name: "abs",
        arity: Arity::Exact(1),
        func: builtin_abs,
    },
    // Comparison operations
    BuiltinOp {
        name: "=",
        arity: Arity::Exact(2),
        func: builtin_equal,
    },
    BuiltinOp {
        name: "/=",
        arity: Arity::Exact(2),
        func: builtin_not_equal,
    },
    BuiltinOp {
        name: "<",
        arity: Arity::AtLeast(2),
        func: builtin_lt,
    },
    BuiltinOp {
        name: "<=",
        arity: Arity::AtLeast(2),
        func: builtin_le,
    },
    BuiltinOp {
        name: ">",
        arity: Arity::AtLeast(2),
        func: builtin_gt,
    },
    BuiltinOp {
        name: ">=",
        arity: Arity::AtLeast(2),
        func: builtin_ge,
    },
    // Predicates
    BuiltinOp {
        name: "nil?",
        arity: Arity::Exact(1),
        func: builtin_is_nil,
    },
    BuiltinOp {
        name: "true?",
        arity: Arity::Exact(1),
        func: builtin_is_true,
    },
    BuiltinOp {
        name: "false?",
        arity: Arity::Exact(1),
        func: builtin_is_false,
    },
    BuiltinOp {
        name: "symbol?",
        arity: Arity::Exact(1),
        func: builtin_is_symbol,
    },
    BuiltinOp {
        name: "keyword?",
        arity: Arity::Exact(1),
        func: builtin_is_keyword,
    },
    BuiltinOp {
        name: "string?",
        arity: Arity::Exact(1),
        func: builtin_is_string,
    },
    BuiltinOp {
        name: "number?",
        arity: Arity::Exact(1),
        func: builtin_is_number,
    },
    BuiltinOp {
        name: "fn?",
        arity: Arity::Exact(1),
        func: builtin_is_fn,
    },
    BuiltinOp {
        name: "macro?",
        arity: Arity::Exact(1),
        func: builtin_is_macro,
    },
    BuiltinOp {
        name: "list?",
        arity: Arity::Exact(1),
        func: builtin_is_list,
    },
    BuiltinOp {
        name: "vector?",
        arity: Arity::Exact(1),
        func: builtin_is_vector,
    },
    BuiltinOp {
        name: "sequential?",
        arity: Arity::Exact(1),
        func: builtin_is_sequential,
    },
    BuiltinOp {
        name: "map?",
        arity: Arity::Exact(1),
        func: builtin_is_map,
    },
    BuiltinOp {
        name: "atom?",
        arity: Arity::Exact(1),
        func: builtin_is_atom,
    },
    BuiltinOp {
        name: "zero?",
        arity: Arity::Exact(1),
        func: builtin_is_zero,
    },
    BuiltinOp {
        name: "empty?",
        arity: Arity::Exact(1),
        func: builtin_is_empty,
    },
    BuiltinOp {
        name: "contains?",
        arity: Arity::Exact(2),
        func: builtin_contains,
    },
    // Constructors and conversion
    BuiltinOp {
        name: "symbol",
        arity: Arity::Exact(1),
        func: builtin_symbol,
    },
    BuiltinOp {
        name: "keyword",
        arity: Arity::Exact(1),
        func: builtin_keyword,
    },
    BuiltinOp {
        name: "list",
        arity: Arity::Any,
        func: builtin_list,
    },
    BuiltinOp {
        name: "vector",
        arity: Arity::Any,
        func: builtin_vector,
    },
    BuiltinOp {
        name: "hash-map",
        arity: Arity::Any,
        func: builtin_hash_map,
    },
    BuiltinOp {
        name: "vec",
        arity: Arity::Exact(1),
        func: builtin_vec,
    },
    BuiltinOp {
        name: "seq",
        arity: Arity::Exact(1),
        func: builtin_seq,
    },
    // Sequence operations
    BuiltinOp {
        name: "cons",
        arity: Arity::Exact(2),
        func: builtin_cons,
    },
    BuiltinOp {
        name: "concat",
        arity: Arity::Any,
        func: builtin_concat,
    },
    BuiltinOp {
        name: "conj",
        arity: Arity::AtLeast(1),
        func: builtin_conj,
    },
    BuiltinOp {
        name: "count",
        arity: Arity::Exact(1),
        func: builtin_count,
    },
    BuiltinOp {
        name: "nth",
        arity: Arity::Exact(2),
        func: builtin_nth,
    },
    BuiltinOp {
        name: "first",
        arity: Arity::Exact(1),
        func: builtin_first,
    },
    BuiltinOp {
        name: "rest",
        arity: Arity::Exact(1),
        func: builtin_rest,
    },
    BuiltinOp {
        name: "apply",
        arity: Arity::AtLeast(2),
        func: builtin_apply,
    },
    BuiltinOp {
        name: "map",
        arity: Arity::Exact(2),
        func: builtin_map,
    },
    // Map operations
    BuiltinOp {
        name: "assoc",
        arity: Arity::AtLeast(1),
        func: builtin_assoc,
    },
    BuiltinOp {
        name: "dissoc",
        arity: Arity::AtLeast(1),
        func: builtin_dissoc,
    },
    BuiltinOp {
        name: "get",
        arity: Arity::Exact(2),
        func: builtin_get,
    },
    BuiltinOp {
        name: "keys",
        arity: Arity::Exact(1),
        func: builtin_keys,
    },
    BuiltinOp {
        name: "vals",
        arity: Arity::Exact(1),
        func: builtin_vals,
    },
    // Atoms
    BuiltinOp {
        name: "atom",
        arity: Arity::Exact(1),
        func: builtin_atom,
    },
    BuiltinOp {
        name: "deref",
        arity: Arity::Exact(1),
        func: builtin_deref,
    },
    BuiltinOp {
        name: "reset!",
        arity: Arity::Exact(2),
        func: builtin_reset,
    },
    BuiltinOp {
        name: "swap!",
        arity: Arity::AtLeast(2),
        func: builtin_swap,
    },
    // Error handling
    BuiltinOp {
        name: "throw",
        arity: Arity::Exact(1),
        func: builtin_throw,
    },
    // Strings and I/O
    BuiltinOp {
        name: "str",
        arity: Arity::Any,
        func: builtin_str,
    },
    BuiltinOp {
        name: "pr-str",
        arity: Arity::Any,
        func: builtin_pr_str,
    },
    BuiltinOp {
        name: "prn",
        arity: Arity::Any,
        func: builtin_prn,
    },
    BuiltinOp {
        name: "println",
        arity: Arity::Any,
        func: builtin_println,
    },
    BuiltinOp {
        name: "substr",
        arity: Arity::Between(2, 3),
        func: builtin_substr,
    },
    BuiltinOp {
        name: "atoi",
        arity: Arity::Exact(1),
        func: builtin_atoi,
    },
    BuiltinOp {
        name: "chr",
        arity: Arity::Exact(1),
        func: builtin_chr,
    },
    BuiltinOp {
        name: "ascii",
        arity: Arity::Exact(1),
        func: builtin_ascii,
    },
    BuiltinOp {
        name: "read-string",
        arity: Arity::Exact(1),
        func: builtin_read_string,
    },
    BuiltinOp {
        name: "slurp",
        arity: Arity::Exact(1),
        func: builtin_slurp,
    },
    BuiltinOp {
        name: "readline",
        arity: Arity::Exact(1),
        func: builtin_readline,
    },
    BuiltinOp {
        name: "time-ms",
        arity: Arity::Exact(0),
        func: builtin_time_ms,
    },
    BuiltinOp {
        name: "exit",
        arity: Arity::Between(0, 1),
        func: builtin_exit,
    },
];

/// Get all builtin operations
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}
