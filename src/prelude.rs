//! Definitions written in the language itself, evaluated into every global environment.

use crate::Error;
use crate::ast::Value;
use crate::evaluator::{Env, eval};
use crate::reader::read_str;

/// Name the REPL banner reports as the host.
pub const HOST_LANGUAGE: &str = "rust";

const PRELUDE: &[&str] = &[
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    r#"(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw "odd number of forms to cond")) (cons 'cond (rest (rest xs)))))))"#,
    // `and`/`or` short-circuit and always yield a boolean
    "(defmacro! and (fn* (& xs)
       (if (empty? xs) true `(if ~(first xs) (and ~@(rest xs)) false))))",
    "(defmacro! or (fn* (& xs)
       (if (empty? xs) false `(if ~(first xs) true (or ~@(rest xs))))))",
    "(defmacro! bound? (fn* (name)
       (if (symbol? name) `(try* (do ~name true) (catch* _ false)) false)))",
    "(defmacro! while (fn* (test & body)
       `(let* (*while-loop* (fn* () (if ~test (do ~@body (*while-loop*)) nil)))
          (*while-loop*))))",
    "(defmacro! repeat (fn* (n & body)
       `(let* (*repeat-loop* (fn* (*repeat-count*)
                               (if (< *repeat-count* 1)
                                 nil
                                 (if (= *repeat-count* 1)
                                   (do ~@body)
                                   (do ~@body (*repeat-loop* (- *repeat-count* 1)))))))
          (*repeat-loop* ~n))))",
    "(def! car first)",
    "(def! cdr rest)",
    "(def! append concat)",
    "(def! strcat str)",
];

/// Evaluate the prelude into `env` and bind `*host-language*` and an empty `*ARGV*`.
pub fn install(env: &Env) -> Result<(), Error> {
    for source in PRELUDE {
        eval(read_str(source)?, env)?;
    }
    env.define("*host-language*", Value::from(HOST_LANGUAGE));
    env.define("*ARGV*", Value::list(Vec::new()));
    Ok(())
}
