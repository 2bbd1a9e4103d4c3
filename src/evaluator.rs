//! The evaluator: macro expansion, special forms and function application.
//!
//! [`eval`] is a trampoline. Special forms whose result is the value of a
//! sub-form in tail position reassign the loop's `ast`/`env` and go round again
//! instead of recursing; everything else (arguments, `try*` bodies, non-tail
//! sub-forms) recurses through [`eval`], which grows the host stack on demand.

use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, error, info, trace};

use crate::ast::{Closure, Map, Params, Symbol, Value};
use crate::builtinops::{Arity, get_builtin_ops};
use crate::printer::pr_str;
use crate::{Error, STACK_GROWTH, STACK_RED_ZONE};

mod environment;
mod quasiquote;

pub use environment::{Env, Environment};
pub use quasiquote::quasiquote;

/// Evaluated arguments of one application; most calls fit inline.
type Args = SmallVec<[Value; 8]>;

/// Forms the evaluator handles itself, matched by the literal name at the head of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Quote,
    QuasiquoteExpand,
    Quasiquote,
    Def,
    Let,
    Do,
    If,
    Fn,
    DefMacro,
    MacroExpand,
    Try,
}

impl SpecialForm {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "quote" => SpecialForm::Quote,
            "quasiquoteexpand" => SpecialForm::QuasiquoteExpand,
            "quasiquote" => SpecialForm::Quasiquote,
            "def!" => SpecialForm::Def,
            "let*" => SpecialForm::Let,
            "do" => SpecialForm::Do,
            "if" => SpecialForm::If,
            "fn*" => SpecialForm::Fn,
            "defmacro!" => SpecialForm::DefMacro,
            "macroexpand" => SpecialForm::MacroExpand,
            "try*" => SpecialForm::Try,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            SpecialForm::Quote => "quote",
            SpecialForm::QuasiquoteExpand => "quasiquoteexpand",
            SpecialForm::Quasiquote => "quasiquote",
            SpecialForm::Def => "def!",
            SpecialForm::Let => "let*",
            SpecialForm::Do => "do",
            SpecialForm::If => "if",
            SpecialForm::Fn => "fn*",
            SpecialForm::DefMacro => "defmacro!",
            SpecialForm::MacroExpand => "macroexpand",
            SpecialForm::Try => "try*",
        }
    }
}

/// Evaluate `ast` in `env`.
pub fn eval(ast: Value, env: &Env) -> Result<Value, Error> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || eval_loop(ast, Rc::clone(env)))
}

fn eval_loop(mut ast: Value, mut env: Env) -> Result<Value, Error> {
    let debug_eval = Symbol::intern("DEBUG-EVAL");

    loop {
        if env.find(debug_eval).is_some_and(|flag| flag.is_truthy()) {
            info!(target: "lispxp::eval", "EVAL: {}", pr_str(&ast, true));
        }

        if !is_application(&ast) {
            return eval_ast(&ast, &env);
        }

        ast = macroexpand(ast, &env)?;
        let Value::List(items) = &ast else {
            return eval_ast(&ast, &env);
        };
        let Some((head, args)) = items.split_first() else {
            return eval_ast(&ast, &env);
        };
        trace!(form = %ast, "eval");

        let special = match head {
            Value::Symbol(name) => name.with_name(SpecialForm::from_name),
            _ => None,
        };

        let (next_ast, next_env) = match special {
            Some(SpecialForm::Quote) => return Ok(expect_args(SpecialForm::Quote, args, 1)?[0].clone()),
            Some(SpecialForm::QuasiquoteExpand) => {
                return quasiquote(&expect_args(SpecialForm::QuasiquoteExpand, args, 1)?[0]);
            }
            Some(SpecialForm::Quasiquote) => {
                (quasiquote(&expect_args(SpecialForm::Quasiquote, args, 1)?[0])?, env)
            }
            Some(SpecialForm::Def) => return eval_def(args, &env),
            Some(SpecialForm::Let) => eval_let(args, &env)?,
            Some(SpecialForm::Do) => match args.split_last() {
                None => return Ok(Value::Nil),
                Some((last, init)) => {
                    for form in init {
                        eval(form.clone(), &env)?;
                    }
                    (last.clone(), env)
                }
            },
            Some(SpecialForm::If) => match eval_if(args, &env)? {
                Some(branch) => (branch, env),
                None => return Ok(Value::Nil),
            },
            Some(SpecialForm::Fn) => return eval_fn(args, &env),
            Some(SpecialForm::DefMacro) => return eval_defmacro(args, &env),
            Some(SpecialForm::MacroExpand) => {
                let form = &expect_args(SpecialForm::MacroExpand, args, 1)?[0];
                return macroexpand(form.clone(), &env);
            }
            Some(SpecialForm::Try) => return eval_try(args, &env),
            None => {
                let func = eval(head.clone(), &env)?;
                let args = args
                    .iter()
                    .map(|arg| eval(arg.clone(), &env))
                    .collect::<Result<Args, Error>>()?;
                match func {
                    Value::Builtin(builtin) => return builtin.call(&args),
                    Value::Closure(closure) => {
                        let call_env = bind_params(&closure, &args)?;
                        (closure.body.clone(), call_env)
                    }
                    other => return Err(Error::NotApplicable(other.to_string())),
                }
            }
        };

        ast = next_ast;
        env = next_env;
    }
}

fn is_application(ast: &Value) -> bool {
    matches!(ast, Value::List(items) if !items.is_empty())
}

/// Evaluate a form that is not an application: symbols are looked up,
/// collections are evaluated element-wise and everything else evaluates to itself.
fn eval_ast(ast: &Value, env: &Env) -> Result<Value, Error> {
    match ast {
        Value::Symbol(name) => env.get(*name),
        Value::List(items) => Ok(Value::list(eval_items(items, env)?)),
        Value::Vector(items) => Ok(Value::vector(eval_items(items, env)?)),
        Value::Map(entries) => {
            let evaluated = entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), eval(value.clone(), env)?)))
                .collect::<Result<Map, Error>>()?;
            Ok(Value::map(evaluated))
        }
        Value::Nil
        | Value::Bool(_)
        | Value::Number(_)
        | Value::Keyword(_)
        | Value::String(_)
        | Value::Closure(_)
        | Value::Builtin(_)
        | Value::Atom(_) => Ok(ast.clone()),
    }
}

fn eval_items(items: &[Value], env: &Env) -> Result<Vec<Value>, Error> {
    items.iter().map(|item| eval(item.clone(), env)).collect()
}

/// If `ast` is a list headed by a symbol bound to a macro, that macro closure.
fn macro_call<'a>(ast: &'a Value, env: &Env) -> Option<(Rc<Closure>, &'a [Value])> {
    let (head, args) = match ast {
        Value::List(items) => items.split_first()?,
        _ => return None,
    };
    match env.find(head.as_symbol()?)? {
        Value::Closure(closure) if closure.is_macro => Some((closure, args)),
        _ => None,
    }
}

/// Expand `ast` until its head no longer names a macro.
///
/// Macros receive their arguments unevaluated.
pub fn macroexpand(mut ast: Value, env: &Env) -> Result<Value, Error> {
    while let Some((closure, args)) = macro_call(&ast, env) {
        let expanded = call_closure(&closure, args)?;
        trace!(from = %ast, to = %expanded, "macroexpand");
        ast = expanded;
    }
    Ok(ast)
}

/// Apply a function value to already evaluated arguments.
///
/// Used by builtins such as `apply`, `map` and `swap!` that call back into user code.
pub fn apply(func: &Value, args: &[Value]) -> Result<Value, Error> {
    match func {
        Value::Builtin(builtin) => builtin.call(args),
        Value::Closure(closure) => call_closure(closure, args),
        other => Err(Error::NotApplicable(other.to_string())),
    }
}

fn call_closure(closure: &Closure, args: &[Value]) -> Result<Value, Error> {
    let call_env = bind_params(closure, args)?;
    eval(closure.body.clone(), &call_env)
}

/// Create the call scope of `closure`, nested in its captured environment.
fn bind_params(closure: &Closure, args: &[Value]) -> Result<Env, Error> {
    let Params { fixed, rest } = &closure.params;
    let arity_ok = match rest {
        Some(_) => args.len() >= fixed.len(),
        None => args.len() == fixed.len(),
    };
    if !arity_ok {
        let expected = match rest {
            Some(_) => Arity::AtLeast(fixed.len()),
            None => Arity::Exact(fixed.len()),
        };
        return Err(Error::arity_error(expected, args.len()));
    }

    let call_env = Environment::with_outer(&closure.env);
    for (name, arg) in fixed.iter().zip(args) {
        call_env.set(*name, arg.clone());
    }
    if let Some(rest) = rest {
        call_env.set(*rest, Value::list(args[fixed.len()..].to_vec()));
    }
    Ok(call_env)
}

fn expect_args(form: SpecialForm, args: &[Value], count: usize) -> Result<&[Value], Error> {
    if args.len() == count {
        Ok(args)
    } else {
        Err(Error::malformed(
            form.name(),
            format!("expected {count} arguments, got {}", args.len()),
        ))
    }
}

fn expect_symbol(form: SpecialForm, value: &Value) -> Result<Symbol, Error> {
    value
        .as_symbol()
        .ok_or_else(|| Error::malformed(form.name(), format!("expected a symbol, got {value}")))
}

fn eval_def(args: &[Value], env: &Env) -> Result<Value, Error> {
    let args = expect_args(SpecialForm::Def, args, 2)?;
    let name = expect_symbol(SpecialForm::Def, &args[0])?;
    let value = eval(args[1].clone(), env)?;
    env.set(name, value.clone());
    Ok(value)
}

/// Returns the body and the new scope holding the bindings.
fn eval_let(args: &[Value], env: &Env) -> Result<(Value, Env), Error> {
    let args = expect_args(SpecialForm::Let, args, 2)?;
    let bindings = args[0].as_seq().ok_or_else(|| {
        Error::malformed("let*", "bindings must be a list or vector")
    })?;
    if bindings.len() % 2 != 0 {
        return Err(Error::malformed(
            "let*",
            "bindings must have an even number of forms",
        ));
    }

    let let_env = Environment::with_outer(env);
    for pair in bindings.chunks_exact(2) {
        let name = expect_symbol(SpecialForm::Let, &pair[0])?;
        let value = eval(pair[1].clone(), &let_env)?;
        let_env.set(name, value);
    }
    Ok((args[1].clone(), let_env))
}

/// Returns the branch to continue with, or `None` when a missing else branch was taken.
fn eval_if(args: &[Value], env: &Env) -> Result<Option<Value>, Error> {
    let (condition, then_branch, else_branch) = match args {
        [condition, then_branch] => (condition, then_branch, None),
        [condition, then_branch, else_branch] => (condition, then_branch, Some(else_branch)),
        _ => {
            return Err(Error::malformed(
                "if",
                format!("expected 2 or 3 arguments, got {}", args.len()),
            ));
        }
    };

    if eval(condition.clone(), env)?.is_truthy() {
        Ok(Some(then_branch.clone()))
    } else {
        Ok(else_branch.cloned())
    }
}

fn parse_params(spec: &Value) -> Result<Params, Error> {
    let items = spec
        .as_seq()
        .ok_or_else(|| Error::malformed("fn*", "parameters must be a list or vector"))?;

    let mut fixed = Vec::with_capacity(items.len());
    let mut iter = items.iter();
    while let Some(item) = iter.next() {
        let name = expect_symbol(SpecialForm::Fn, item)?;
        if !name.is("&") {
            fixed.push(name);
            continue;
        }
        return match (iter.next(), iter.next()) {
            (Some(rest), None) => Ok(Params {
                fixed,
                rest: Some(expect_symbol(SpecialForm::Fn, rest)?),
            }),
            _ => Err(Error::malformed(
                "fn*",
                "'&' must be followed by exactly one parameter",
            )),
        };
    }
    Ok(Params { fixed, rest: None })
}

fn eval_fn(args: &[Value], env: &Env) -> Result<Value, Error> {
    let args = expect_args(SpecialForm::Fn, args, 2)?;
    let params = parse_params(&args[0])?;
    debug!(params = ?params, "closure created");
    Ok(Value::Closure(Rc::new(Closure {
        params,
        body: args[1].clone(),
        env: Rc::clone(env),
        is_macro: false,
    })))
}

fn eval_defmacro(args: &[Value], env: &Env) -> Result<Value, Error> {
    let args = expect_args(SpecialForm::DefMacro, args, 2)?;
    let name = expect_symbol(SpecialForm::DefMacro, &args[0])?;
    let Value::Closure(closure) = eval(args[1].clone(), env)? else {
        return Err(Error::malformed("defmacro!", "value must be a function"));
    };

    let macro_value = Value::Closure(Rc::new(Closure {
        params: closure.params.clone(),
        body: closure.body.clone(),
        env: Rc::clone(&closure.env),
        is_macro: true,
    }));
    env.set(name, macro_value.clone());
    Ok(macro_value)
}

/// `(try* body)` or `(try* body (catch* name handler))`.
///
/// The catch clause is checked before the body runs, so a malformed clause is
/// reported even when nothing is raised.
fn eval_try(args: &[Value], env: &Env) -> Result<Value, Error> {
    let (body, handler) = match args {
        [body] => (body, None),
        [body, clause] => (body, Some(parse_catch(clause)?)),
        _ => {
            return Err(Error::malformed(
                "try*",
                format!("expected 1 or 2 arguments, got {}", args.len()),
            ));
        }
    };

    match (eval(body.clone(), env), handler) {
        (Err(err), Some((name, handler))) => {
            debug!(error = %err, "caught");
            let catch_env = Environment::with_outer(env);
            catch_env.set(name, err.into_value());
            eval(handler.clone(), &catch_env)
        }
        (result, _) => result,
    }
}

fn parse_catch(clause: &Value) -> Result<(Symbol, &Value), Error> {
    let Some(parts) = clause.form_args("catch*") else {
        return Err(Error::malformed("try*", "second argument must be a catch* form"));
    };
    match parts {
        [name, handler] => Ok((expect_symbol(SpecialForm::Try, name)?, handler)),
        _ => Err(Error::malformed(
            "catch*",
            format!("expected a name and a handler, got {} forms", parts.len()),
        )),
    }
}

/// Create a global environment holding every builtin and the prelude definitions.
pub fn create_global_env() -> Env {
    let env = Environment::new();

    for op in get_builtin_ops() {
        env.register_builtin_op(op);
    }

    // `eval` always runs in the global scope, which owns this builtin
    let global = Rc::downgrade(&env);
    env.register_builtin_function("eval", Arity::Exact(1), move |args: &[Value]| {
        let root = global
            .upgrade()
            .ok_or_else(|| Error::EvalError("global environment is gone".to_owned()))?;
        eval(args[0].clone(), &root)
    });

    if let Err(err) = crate::prelude::install(&env) {
        error!(error = %err, "prelude failed to load");
    }
    env
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{kw, nil, sym, val};
    use crate::reader::read_str;
    use pretty_assertions::assert_eq;

    /// Test result variants for data-driven evaluation tests
    #[derive(Debug)]
    enum TestResult {
        EvalResult(Value),           // Evaluation should succeed with this value
        Printed(&'static str),       // Evaluation should succeed and print like this
        SpecificError(&'static str), // Evaluation should fail with error containing this string
        AnyError,                    // Evaluation should fail (any error)
    }
    use TestResult::*;

    fn success<T: Into<Value>>(value: T) -> TestResult {
        EvalResult(val(value))
    }

    /// Run cases in order against one shared environment
    fn run_in_environment(test_cases: Vec<(&str, TestResult)>) {
        let env = create_global_env();
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            execute_test_case(input, expected, &env, &format!("#{}", i + 1));
        }
    }

    fn execute_test_case(input: &str, expected: &TestResult, env: &Env, test_id: &str) {
        let expr = read_str(input)
            .unwrap_or_else(|e| panic!("{test_id}: unexpected parse error for '{input}': {e:?}"));

        match (eval(expr, env), expected) {
            (Ok(actual), EvalResult(expected_val)) => {
                assert_eq!(&actual, expected_val, "{test_id}: {input}");
            }
            (Ok(actual), Printed(text)) => {
                assert_eq!(pr_str(&actual, true), *text, "{test_id}: {input}");
            }
            (Err(_), AnyError) => {}
            (Err(e), SpecificError(expected_text)) => {
                let error_msg = e.to_string();
                assert!(
                    error_msg.contains(expected_text),
                    "{test_id}: error should contain '{expected_text}', got: {error_msg}"
                );
            }
            (Ok(actual), AnyError | SpecificError(_)) => {
                panic!("{test_id}: expected error for '{input}', got {actual:?}");
            }
            (Err(err), EvalResult(_) | Printed(_)) => {
                panic!("{test_id}: expected success for '{input}', got error {err:?}");
            }
        }
    }

    #[test]
    fn test_self_evaluating_and_collections() {
        run_in_environment(vec![
            ("42", success(42)),
            ("\"hi\"", success("hi")),
            ("nil", EvalResult(Value::Nil)),
            ("true", success(true)),
            (":kw", EvalResult(kw("kw"))),
            ("()", EvalResult(nil())),
            ("[1 (+ 1 1)]", Printed("[1 2]")),
            ("{:a (+ 1 2)}", Printed("{:a 3}")),
            ("(list 1 [2 (+ 1 2)])", Printed("(1 [2 3])")),
            ("undefined-symbol", SpecificError("'undefined-symbol' not found")),
        ]);
    }

    #[test]
    fn test_special_forms() {
        run_in_environment(vec![
            ("(quote (a b))", EvalResult(val([sym("a"), sym("b")]))),
            ("(def! x 3)", success(3)),
            ("x", success(3)),
            ("(let* (y 4 z (+ y 1)) (* y z))", success(20)),
            ("(let* [a 1] a)", success(1)),
            ("(do (def! d 1) (+ d 1))", success(2)),
            ("(do)", EvalResult(Value::Nil)),
            ("(if true 1 2)", success(1)),
            ("(if nil 1 2)", success(2)),
            ("(if false 1)", EvalResult(Value::Nil)),
            ("(if 0 1 2)", success(1)),
            ("(if \"\" 1 2)", success(1)),
            ("((fn* (a b) (+ a b)) 2 3)", success(5)),
            ("((fn* [& more] more) 1 2)", EvalResult(val([1, 2]))),
            ("((fn* (a & more) more) 1)", EvalResult(nil())),
            ("(fn* (a) a)", Printed("#<function>")),
        ]);
    }

    #[test]
    fn test_malformed_forms() {
        run_in_environment(vec![
            ("(let* (a) a)", SpecificError("even number")),
            ("(let* a 1)", SpecificError("list or vector")),
            ("(let* (1 2) 3)", SpecificError("expected a symbol")),
            ("(def! 1 2)", SpecificError("def!")),
            ("(if)", SpecificError("if")),
            ("(fn* (a &) a)", SpecificError("'&'")),
            ("(fn* (& a b) a)", SpecificError("'&'")),
            ("(quote)", SpecificError("quote")),
            ("(defmacro! m 1)", SpecificError("defmacro!")),
        ]);
    }

    #[test]
    fn test_application_errors() {
        run_in_environment(vec![
            ("(1 2)", SpecificError("1 is not applicable")),
            ("(\"f\")", SpecificError("is not applicable")),
            ("((fn* (a b) a) 1)", SpecificError("expected 2, got 1")),
            ("((fn* (a) a) 1 2)", SpecificError("expected 1, got 2")),
            ("((fn* (a & r) a))", SpecificError("expected at least 1, got 0")),
        ]);
    }

    #[test]
    fn test_def_inside_let_does_not_leak() {
        run_in_environment(vec![
            ("(let* (x 1) (let* (x 2) x))", success(2)),
            ("x", SpecificError("'x' not found")),
            ("(def! x 10)", success(10)),
            ("(let* (x 1) (def! x 5))", success(5)),
            ("x", success(10)),
            ("(let* (q 1) (do (def! inner 7) inner))", success(7)),
            ("inner", AnyError),
        ]);
    }

    #[test]
    fn test_closures_capture_lexical_scope() {
        run_in_environment(vec![
            ("(def! make-adder (fn* (n) (fn* (x) (+ x n))))", Printed("#<function>")),
            ("(def! add5 (make-adder 5))", Printed("#<function>")),
            ("(def! n 1000)", success(1000)),
            ("(add5 1)", success(6)),
            ("(def! counter (let* (c (atom 0)) (fn* () (swap! c + 1))))", Printed("#<function>")),
            ("(counter)", success(1)),
            ("(counter)", success(2)),
            // the body sees the caller's globals only through the captured chain
            ("(def! f (fn* () free))", Printed("#<function>")),
            ("(let* (free 1) (f))", SpecificError("'free' not found")),
            ("(def! free 2)", success(2)),
            ("(f)", success(2)),
        ]);
    }

    #[test]
    fn test_tail_calls_do_not_grow_stack() {
        run_in_environment(vec![
            (
                "(def! sum-to (fn* (n acc) (if (= n 0) acc (sum-to (- n 1) (+ acc n)))))",
                Printed("#<function>"),
            ),
            ("(sum-to 100000 0)", success(5_000_050_000_i64)),
            (
                "(def! count-down (fn* (n) (let* (m (- n 1)) (do nil (if (> m 0) (count-down m) :done)))))",
                Printed("#<function>"),
            ),
            ("(count-down 100000)", EvalResult(kw("done"))),
        ]);
    }

    #[test]
    fn test_deep_non_tail_recursion_grows_stack() {
        run_in_environment(vec![
            (
                "(def! depth (fn* (n) (if (= n 0) 0 (+ 1 (depth (- n 1))))))",
                Printed("#<function>"),
            ),
            ("(depth 20000)", success(20000)),
        ]);
    }

    #[test]
    fn test_quasiquote() {
        run_in_environment(vec![
            ("(def! a 2)", success(2)),
            ("(quasiquote (1 (unquote a) 3))", EvalResult(val([1, 2, 3]))),
            (
                "(quasiquote (1 (splice-unquote (list 2 3)) 4))",
                EvalResult(val([1, 2, 3, 4])),
            ),
            ("(quasiquote a)", EvalResult(sym("a"))),
            ("`[1 ~a]", Printed("[1 2]")),
            ("`(0 ~@[] 1)", Printed("(0 1)")),
            ("`{\"k\" a}", Printed("{\"k\" a}")),
            ("(quasiquoteexpand (1 ~a))", Printed("(cons 1 (cons a ()))")),
            ("`(nested (b ~a))", Printed("(nested (b 2))")),
        ]);
    }

    #[test]
    fn test_macros() {
        run_in_environment(vec![
            ("(defmacro! unless (fn* (c a b) (list 'if c b a)))", Printed("#<macro>")),
            ("(unless false 1 2)", success(1)),
            ("(macroexpand (unless x y z))", Printed("(if x z y)")),
            ("(macroexpand (+ 1 2))", Printed("(+ 1 2)")),
            // expansion result is itself expanded again
            ("(defmacro! twice-unless (fn* (c a b) `(unless ~c ~a ~b)))", Printed("#<macro>")),
            ("(macroexpand (twice-unless true 1 2))", Printed("(if true 2 1)")),
            // arguments arrive unevaluated
            ("(defmacro! quoted (fn* (x) (list 'quote x)))", Printed("#<macro>")),
            ("(quoted (no such call))", Printed("(no such call)")),
            // macros are expanded lazily inside nested forms
            ("(if true (unless false :yes :no) :never)", EvalResult(kw("yes"))),
        ]);
    }

    #[test]
    fn test_user_macro_shadows_special_form() {
        run_in_environment(vec![
            ("(defmacro! if (fn* (& xs) :shadowed))", Printed("#<macro>")),
            ("(if true 1 2)", EvalResult(kw("shadowed"))),
        ]);
    }

    #[test]
    fn test_plain_binding_does_not_shadow_special_form() {
        run_in_environment(vec![
            ("(def! if 1)", success(1)),
            ("(if true :then :else)", EvalResult(kw("then"))),
            ("if", success(1)),
        ]);
    }

    #[test]
    fn test_try_catch() {
        run_in_environment(vec![
            ("(try* (throw 7) (catch* e (+ e 1)))", success(8)),
            ("(try* 1 (catch* e 2))", success(1)),
            ("(try* (throw {:a 1}) (catch* e (get e :a)))", success(1)),
            ("(try* (foo-undefined) (catch* e e))", success("'foo-undefined' not found")),
            ("(try* (nth [] 1) (catch* e (string? e)))", success(true)),
            ("(try* ((fn* (a) a)) (catch* e e))", success("wrong number of arguments: expected 1, got 0")),
            ("(try* (foo-undefined))", SpecificError("'foo-undefined' not found")),
            ("(try* (throw 1) (catch* e (throw (+ e 1))))", AnyError),
            ("(try* (try* (throw 1) (catch* e (throw (+ e 1)))) (catch* e e))", success(2)),
            // the handler binding is scoped to the handler
            ("(try* (throw 3) (catch* caught caught))", success(3)),
            ("caught", SpecificError("'caught' not found")),
        ]);
    }

    #[test]
    fn test_malformed_catch() {
        run_in_environment(vec![
            ("(try* 1 (catch e 2))", SpecificError("catch*")),
            ("(try* 1 (catch* e))", SpecificError("catch*")),
            ("(try* 1 (catch* e 2 3))", SpecificError("catch*")),
            ("(try* 1 2 3)", SpecificError("try*")),
            ("(try* (throw 1) (catch* \"e\" 2))", SpecificError("expected a symbol")),
        ]);
    }

    #[test]
    fn test_raised_error_reaches_caller() {
        let env = create_global_env();
        let err = eval(read_str("(throw [1 2])").unwrap(), &env).unwrap_err();
        assert_eq!(err, crate::Error::Raised(val([1, 2])));
        assert_eq!(err.into_value(), Value::vector(vec![val(1), val(2)]));
    }

    #[test]
    fn test_apply_function_values() {
        let env = create_global_env();
        let plus = env.get(Symbol::intern("+")).unwrap();
        assert_eq!(apply(&plus, &[val(1), val(2)]), Ok(val(3)));

        let closure = eval(read_str("(fn* (a & r) (cons a r))").unwrap(), &env).unwrap();
        assert_eq!(apply(&closure, &[val(1), val(2)]), Ok(val([1, 2])));

        assert_eq!(
            apply(&val(1), &[]),
            Err(crate::Error::NotApplicable("1".to_owned()))
        );
    }

    #[test]
    fn test_eval_builtin_uses_global_scope() {
        run_in_environment(vec![
            ("(eval (list + 1 2))", success(3)),
            ("(let* (local 1) (eval 'local))", AnyError),
            ("(let* (g 1) (eval '(def! g 5)))", success(5)),
            ("g", success(5)),
        ]);
    }
}
