//! Quasiquote expansion.
//!
//! `quasiquote` rewrites an unevaluated template into ordinary code built from
//! `cons`, `concat`, `vec` and `quote`; evaluating that code yields the
//! templated value. Expansion never touches an environment.

use crate::Error;
use crate::ast::{Value, sym};

/// Expand a quasiquoted template.
///
/// - `(unquote x)` becomes `x`.
/// - Lists and vectors fold right to left: `(splice-unquote x)` elements become
///   `(concat x acc)`, anything else `(cons <expanded> acc)`. Vectors are wrapped
///   in `(vec ...)`.
/// - Symbols and maps are quoted; other values are returned as they are.
pub fn quasiquote(form: &Value) -> Result<Value, Error> {
    match form {
        Value::List(_) => {
            if let Some(args) = form.form_args("unquote") {
                return single_arg("unquote", args).cloned();
            }
            expand_sequence(form.as_seq().unwrap_or_default())
        }
        Value::Vector(items) => Ok(Value::list(vec![sym("vec"), expand_sequence(items)?])),
        Value::Symbol(_) | Value::Map(_) => Ok(Value::list(vec![sym("quote"), form.clone()])),
        _ => Ok(form.clone()),
    }
}

fn expand_sequence(items: &[Value]) -> Result<Value, Error> {
    let mut acc = Value::list(Vec::new());
    for item in items.iter().rev() {
        acc = match item.form_args("splice-unquote") {
            Some(args) => {
                let spliced = single_arg("splice-unquote", args)?;
                Value::list(vec![sym("concat"), spliced.clone(), acc])
            }
            None => Value::list(vec![sym("cons"), quasiquote(item)?, acc]),
        };
    }
    Ok(acc)
}

fn single_arg<'a>(form: &str, args: &'a [Value]) -> Result<&'a Value, Error> {
    match args {
        [arg] => Ok(arg),
        _ => Err(Error::malformed(
            form,
            format!("expected exactly 1 argument, got {}", args.len()),
        )),
    }
}
