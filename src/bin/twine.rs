//! CLI wrapper around the bundled script packages.
//!
//! Usage:
//!   twine tables                          # Print the compiled tables
//!   twine call <function> [args..]        # Call a script function
//!   twine var <name> [--conditional]      # Evaluate a script variable
//!   twine -c <config.toml> <command> ..   # Use a configuration file

use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use twine::binder::context::{PageMerger, UserData};
use twine::binder::{ExecutionContext, Result, Value};
use twine::extension::{ScriptContext, TwineConfig, VariableValue};
use twine::packages::register_script_packages;

/// Page merger that hands script text back unevaluated.
#[derive(Debug)]
struct EchoMerger;

impl PageMerger for EchoMerger {
    fn evaluate_script(&self, script: &str) -> Result<String> {
        Ok(script.to_string())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let config = if args.first().map(|a| a == "-c" || a == "--config").unwrap_or(false) {
        if args.len() < 2 {
            print_usage();
            process::exit(1);
        }
        let path = args.remove(1);
        args.remove(0);
        match TwineConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        TwineConfig::default()
    };

    let mut scripts = ScriptContext::new();
    if let Err(e) = register_script_packages(&mut scripts) {
        eprintln!("Unable to load script packages: {}", e);
        process::exit(1);
    }

    let ctx = match build_context(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match args.first().map(String::as_str) {
        Some("tables") => print_tables(&scripts),
        Some("call") if args.len() >= 2 => {
            let arguments: Vec<Option<Value>> = args[2..].iter().map(|a| Some(parse_argument(a))).collect();
            match scripts.call_function(&args[1], &arguments, &ctx) {
                Ok(Some(value)) => println!("{}", value),
                Ok(None) => println!("(nil)"),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
        Some("var") if args.len() >= 2 => {
            let conditional = args.iter().skip(2).any(|a| a == "--conditional");
            match scripts.evaluate_variable(&args[1], &ctx, conditional) {
                Ok(VariableValue::Conditional(b)) => println!("{}", b),
                Ok(VariableValue::Text(s)) => println!("{}", s),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
        Some("-h") | Some("--help") => print_usage(),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("twine - typed method binding demo");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  twine tables                          Print the compiled tables");
    eprintln!("  twine call <function> [args..]        Call a script function");
    eprintln!("  twine var <name> [--conditional]      Evaluate a script variable");
    eprintln!("  twine -c <config.toml> <command> ..   Use a configuration file");
}

fn build_context(config: &TwineConfig) -> Result<ExecutionContext> {
    let mut binder = config.new_binder()?;
    binder.put_local("IdcService", "TWINE_DEMO");

    let user = env::var("USER").unwrap_or_else(|_| "anonymous".to_string());
    Ok(ExecutionContext::new()
        .with_user_data(UserData::new(user.clone()).with_property("dFullName", user))
        .with_binder(Arc::new(binder))
        .with_page_merger(Arc::new(EchoMerger)))
}

/// Script arguments arrive as integers, floats or strings.
fn parse_argument(arg: &str) -> Value {
    if let Ok(n) = arg.parse::<i64>() {
        Value::Long(n)
    } else if let Ok(n) = arg.parse::<f64>() {
        Value::Double(n)
    } else {
        Value::from(arg)
    }
}

fn print_tables(scripts: &ScriptContext) {
    for extension in scripts.extensions() {
        println!("[{}]", extension.name());
        for (name, row) in extension
            .function_table()
            .iter()
            .zip(extension.function_definition_table())
        {
            println!("  function {:<24} {:?}", name, row.as_slice());
        }
        for (name, row) in extension
            .variable_table()
            .iter()
            .zip(extension.variable_definition_table())
        {
            println!("  variable {:<24} {:?}", name, row);
        }
    }
}
