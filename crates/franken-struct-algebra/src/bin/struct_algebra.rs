use std::fs;

use frankenengine_struct_algebra::algebra::{OperandsInput, Operation, StructAlgebra};
use frankenengine_struct_algebra::config::AlgebraConfig;

fn main() {
    if let Err(error) = run(std::env::args().skip(1).collect()) {
        eprintln!("{error}");
        std::process::exit(2);
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    if args.is_empty() {
        return Err(usage());
    }

    match args[0].as_str() {
        "help" | "--help" | "-h" => {
            println!("{}", usage());
            Ok(())
        }
        name => {
            let operation = name
                .parse::<Operation>()
                .map_err(|_| format!("unknown operation '{name}'\n\n{}", usage()))?;
            run_operation(operation, &args[1..])
        }
    }
}

fn usage() -> String {
    let operations = Operation::ALL
        .iter()
        .map(|op| op.as_str())
        .collect::<Vec<_>>()
        .join("|");
    [
        "struct_algebra usage:".to_string(),
        "  struct_algebra <operation> --input <path> [--config <path>] [--events]".to_string(),
        format!("      <operation>: {operations}"),
        "      input file: {\"operands\": [<json>, ...]}".to_string(),
    ]
    .join("\n")
}

fn run_operation(operation: Operation, args: &[String]) -> Result<(), String> {
    let mut input_path: Option<&str> = None;
    let mut config_path: Option<&str> = None;
    let mut with_events = false;

    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--input" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| "--input requires a path".to_string())?;
                input_path = Some(value.as_str());
            }
            "--config" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| "--config requires a path".to_string())?;
                config_path = Some(value.as_str());
            }
            "--events" => with_events = true,
            flag => return Err(format!("unknown flag for {operation}: {flag}")),
        }
        index += 1;
    }

    let path = input_path.ok_or_else(|| "missing required --input <path>".to_string())?;
    let input = load_input(path)?;
    let config = match config_path {
        Some(config_path) => AlgebraConfig::load(config_path).map_err(|error| error.to_string())?,
        None => AlgebraConfig::default(),
    };

    let mut session = StructAlgebra::with_config(&config);
    let output = match session.run_json(operation, &input) {
        Ok(output) => output,
        Err(error) => {
            if with_events {
                for event in session.drain_events() {
                    if let Ok(line) = serde_json::to_string(&event) {
                        eprintln!("{line}");
                    }
                }
            }
            return Err(format!("{}: {error}", error.code().stable_code()));
        }
    };

    let rendered = if with_events {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string_pretty(&output.result)
    }
    .map_err(|error| format!("failed to encode {operation} output: {error}"))?;
    println!("{rendered}");

    Ok(())
}

fn load_input(path: &str) -> Result<OperandsInput, String> {
    let content = fs::read_to_string(path)
        .map_err(|error| format!("failed to read input file '{path}': {error}"))?;
    serde_json::from_str::<OperandsInput>(&content)
        .map_err(|error| format!("failed to parse input file '{path}' as JSON: {error}"))
}
