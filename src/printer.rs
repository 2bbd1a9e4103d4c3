//! Rendering values back to text.
//!
//! With `readably` set, strings are quoted and escaped so that the output reads
//! back to an equal value; without it their contents are written raw. All other
//! values print the same either way.

use std::fmt::Write;

use crate::ast::Value;

/// Print `value` to a new string.
pub fn pr_str(value: &Value, readably: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, readably);
    out
}

fn write_value(out: &mut String, value: &Value, readably: bool) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Symbol(s) => s.with_name(|name| out.push_str(name)),
        Value::Keyword(k) => {
            out.push(':');
            k.with_name(|name| out.push_str(name));
        }
        Value::String(s) if readably => write_escaped(out, s),
        Value::String(s) => out.push_str(s),
        Value::List(items) => write_seq(out, items.iter(), "(", ")", readably),
        Value::Vector(items) => write_seq(out, items.iter(), "[", "]", readably),
        Value::Map(entries) => {
            let flattened: Vec<Value> = entries
                .iter()
                .flat_map(|(key, value)| [key.to_value(), value.clone()])
                .collect();
            write_seq(out, flattened.iter(), "{", "}", readably);
        }
        Value::Closure(c) if c.is_macro => out.push_str("#<macro>"),
        Value::Closure(_) => out.push_str("#<function>"),
        Value::Builtin(b) => {
            let _ = write!(out, "#<builtin-function:{}>", b.name);
        }
        Value::Atom(cell) => {
            out.push_str("(atom ");
            write_value(out, &cell.borrow(), readably);
            out.push(')');
        }
    }
}

fn write_seq<'a>(
    out: &mut String,
    items: impl Iterator<Item = &'a Value>,
    open: &str,
    close: &str,
    readably: bool,
) {
    out.push_str(open);
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_value(out, item, readably);
    }
    out.push_str(close);
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Print each value and join the results with `separator`.
pub fn pr_seq(values: &[Value], readably: bool, separator: &str) -> String {
    values
        .iter()
        .map(|value| pr_str(value, readably))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Builtin, MapKey, Symbol, kw, nil, sym, val};
    use crate::evaluator::Environment;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn test_print_data_driven() {
        let test_cases = vec![
            (Value::Nil, "nil", "nil"),
            (val(true), "true", "true"),
            (val(-12), "-12", "-12"),
            (sym("abc"), "abc", "abc"),
            (kw("k"), ":k", ":k"),
            (val("plain"), "\"plain\"", "plain"),
            (val("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"", "a\"b\\c\nd"),
            (nil(), "()", "()"),
            (val([val(1), val("s")]), "(1 \"s\")", "(1 s)"),
            (
                Value::vector(vec![val(1), Value::vector(vec![])]),
                "[1 []]",
                "[1 []]",
            ),
            (
                Value::map(btreemap! {
                    MapKey::Keyword(Symbol::intern("b")) => val("x"),
                    MapKey::String("a".into()) => val(1),
                }),
                "{\"a\" 1 :b \"x\"}",
                "{a 1 :b x}",
            ),
            (Value::atom(val("in")), "(atom \"in\")", "(atom in)"),
            (
                Value::Builtin(Builtin::new("+", |_| Ok(Value::Nil))),
                "#<builtin-function:+>",
                "#<builtin-function:+>",
            ),
        ];

        for (value, readable, raw) in test_cases {
            assert_eq!(pr_str(&value, true), readable, "readable {value:?}");
            assert_eq!(pr_str(&value, false), raw, "raw {value:?}");
        }
    }

    #[test]
    fn test_print_closures() {
        use crate::ast::{Closure, Params};

        let closure = |is_macro| {
            Value::Closure(Rc::new(Closure {
                params: Params {
                    fixed: vec![],
                    rest: None,
                },
                body: Value::Nil,
                env: Environment::new(),
                is_macro,
            }))
        };
        assert_eq!(pr_str(&closure(false), true), "#<function>");
        assert_eq!(pr_str(&closure(true), true), "#<macro>");
    }

    #[test]
    fn test_pr_seq() {
        let values = [val("a"), val(1), kw("c")];
        assert_eq!(pr_seq(&values, true, " "), "\"a\" 1 :c");
        assert_eq!(pr_seq(&values, false, ""), "a1:c");
        assert_eq!(pr_seq(&[], true, " "), "");
    }
}
