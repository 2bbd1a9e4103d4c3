use std::env;
use std::panic;
use std::path::PathBuf;
use std::process;

use lispxp::ast::Value;
use lispxp::evaluator::{self, Env, Environment};
use lispxp::printer::pr_str;
use lispxp::rep;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

const PROMPT: &str = "user> ";
const HISTORY_FILE: &str = ".lispxp-history";

/// Initialize tracing for debug output.
///
/// `RUST_LOG` selects what is shown; without it only `lispxp` info events
/// (such as `DEBUG-EVAL` traces) reach stderr.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lispxp=info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();

    let result = panic::catch_unwind(|| match args.split_first() {
        Some((file, script_args)) => run_file(file, script_args),
        None => {
            run_repl();
            0
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(panic_info) => {
            eprintln!("The interpreter encountered an unexpected error and must exit.");

            if let Some(msg) = panic_info.downcast_ref::<&str>() {
                eprintln!("Error: {msg}");
            } else if let Some(msg) = panic_info.downcast_ref::<String>() {
                eprintln!("Error: {msg}");
            } else {
                eprintln!("Error: Unknown panic occurred");
            }

            process::exit(1);
        }
    }
}

/// Bind `*ARGV*`, load `file` and return the process exit code.
fn run_file(file: &str, script_args: &[String]) -> i32 {
    let env = evaluator::create_global_env();
    let argv = script_args.iter().map(|arg| Value::from(arg.as_str())).collect();
    env.define("*ARGV*", Value::list(argv));

    let command = format!("(load-file {})", pr_str(&Value::from(file), true));
    match rep(&command, &env) {
        Ok(_) => 0,
        Err(e) => {
            println!("Error: {e}");
            1
        }
    }
}

fn history_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}

fn run_repl() {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Could not initialize REPL: {err}");
            return;
        }
    };

    let history = history_path();
    if let Some(path) = &history {
        if let Err(err) = rl.load_history(path) {
            debug!(path = %path.display(), error = %err, "no history loaded");
        }
    }

    let env = evaluator::create_global_env();
    eval_line(r#"(println (str "Mal [" *host-language* "]"))"#, &env);

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":env" => print_environment(&env),
                    ":quit" | ":exit" => break,
                    _ => eval_line(line, &env),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    if let Some(path) = &history {
        if let Err(err) = rl.save_history(path) {
            warn!(path = %path.display(), error = %err, "could not save history");
        }
    }
}

/// Read, evaluate and print one line. Input holding only whitespace or comments prints nothing.
fn eval_line(line: &str, env: &Env) {
    match rep(line, env) {
        Ok(result) => println!("{result}"),
        Err(e) if e.is_empty_input() => {}
        Err(e) => println!("Error: {e}"),
    }
}

fn print_environment(env: &Environment) {
    let bindings = env.get_all_bindings();

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Separate built-in functions from user-defined values
    let mut builtins = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match value {
            Value::Builtin(_) => builtins.push(name),
            _ => user_defined.push((name, value)),
        }
    }

    if !builtins.is_empty() {
        println!("Built-in functions ({}):", builtins.len());
        // Print in columns for readability
        let mut col = 0;
        for name in builtins {
            print!("  {name:<15}");
            col += 1;
            if col % 4 == 0 {
                println!();
            }
        }
        if col % 4 != 0 {
            println!();
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
