//! LispXP - a small Lisp interpreter
//!
//! This crate reads textual source into [`ast::Value`]s, evaluates them against a
//! chain of lexical environments and prints results back to text.
//!
//! ```text
//! user> (def! sum (fn* (n acc) (if (= n 0) acc (sum (- n 1) (+ acc n)))))
//! #<function>
//! user> (sum 100000 0)
//! 5000050000
//! user> `(1 ~(+ 1 1) ~@(list 3 4))
//! (1 2 3 4)
//! user> (try* (throw {:code 7}) (catch* e (get e :code)))
//! 7
//! ```
//!
//! ## Evaluation model
//!
//! The evaluator is a trampoline: forms in tail position (`let*` and closure
//! bodies, the last form of `do`, `if` branches, quasiquote results) replace the
//! loop's working expression instead of recursing, so self-recursive functions
//! written with an accumulator run in constant host stack.
//!
//! Every loop iteration macro-expands first and only then dispatches on the
//! literal name of special forms, so a user macro named `if` shadows the
//! builtin form while a plain `(def! if ...)` does not.
//!
//! ## Modules
//!
//! - `ast`: the value model, symbol interning and construction helpers
//! - `reader`: text to values
//! - `printer`: values to text
//! - `evaluator`: environments, quasiquote, macro expansion and the eval loop
//! - `builtinops`: the builtin function library
//! - `prelude`: definitions written in the language itself

use std::fmt;

use crate::ast::Value;
use crate::builtinops::Arity;

/// Maximum reader nesting depth.
/// Deeper input is rejected with [`ParseErrorKind::TooDeeplyNested`].
pub const MAX_PARSE_DEPTH: usize = 1024;

/// Remaining stack below which recursive evaluation grows the stack.
pub const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated when recursive evaluation grows the stack.
pub const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Invalid or unexpected syntax (bad tokens, malformed maps, bad escapes)
    InvalidSyntax,
    /// Input ended before the form was complete (unterminated string, unclosed delimiters)
    Incomplete,
    /// Form nesting exceeded [`MAX_PARSE_DEPTH`]
    TooDeeplyNested,
    /// Extra input found after a complete form
    TrailingContent,
    /// The input held no form at all, only whitespace and comments
    Empty,
    /// Implementation-imposed limit exceeded (integer literal out of range)
    ImplementationLimit,
}

/// A structured error providing detailed information about a reader failure.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with a context snippet taken from `input` around `error_offset`
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;

        let context_start = error_offset.saturating_sub(20);
        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < input.chars().count() {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\r', "");
        let found = input.chars().nth(error_offset).map(String::from);

        Self::new(kind, message, Some(display_context), found)
    }
}

/// Error types for the interpreter.
///
/// Every kind travels through the same `Result` channel; `try*`/`catch*` is the
/// only construct that intercepts them (see [`Error::into_value`]).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    ParseError(#[from] ParseError),
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("{0} is not applicable")]
    NotApplicable(String),
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    ArityError { expected: Arity, got: usize },
    #[error("{0}")]
    MalformedForm(String),
    #[error("{0}")]
    TypeError(String),
    #[error("{0}")]
    EvalError(String),
    /// A value raised by `throw`
    #[error("{0}")]
    Raised(Value),
}

impl Error {
    pub fn arity_error(expected: Arity, got: usize) -> Self {
        Error::ArityError { expected, got }
    }

    pub fn malformed(form: &str, message: impl fmt::Display) -> Self {
        Error::MalformedForm(format!("{form}: {message}"))
    }

    /// The value a `catch*` handler sees for this error.
    ///
    /// Raised values pass through untouched; engine errors become a string
    /// holding their message.
    pub fn into_value(self) -> Value {
        match self {
            Error::Raised(value) => value,
            other => Value::from(other.to_string()),
        }
    }

    /// True for reader errors caused by input that held no form.
    pub fn is_empty_input(&self) -> bool {
        matches!(
            self,
            Error::ParseError(ParseError {
                kind: ParseErrorKind::Empty,
                ..
            })
        )
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod prelude;
pub mod printer;
pub mod reader;

/// Read one form from `input`, evaluate it in `env` and print the result readably.
pub fn rep(input: &str, env: &evaluator::Env) -> Result<String, Error> {
    let ast = reader::read_str(input)?;
    let result = evaluator::eval(ast, env)?;
    Ok(printer::pr_str(&result, true))
}
