use std::{env, fs, io, process::ExitCode, time::Instant};

use quill::{Interpreter, ast::Program};

const USAGE: &str = "usage: quill [--verbose] <program.ast.json>";

fn main() -> ExitCode {
    let mut verbose = false;
    let mut file_path: Option<String> = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--verbose" => verbose = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ if file_path.is_none() => file_path = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }
    let Some(file_path) = file_path else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let program = match read_program(&file_path) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let interpreter = Interpreter::new().with_verbose(verbose);
    let start = Instant::now();
    match interpreter.run_stdio(&program) {
        Ok(value) => {
            let elapsed = start.elapsed();
            match value {
                Some(value) => eprintln!("success after: {elapsed:?}\n{value}"),
                None => eprintln!("success after: {elapsed:?}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let elapsed = start.elapsed();
            eprintln!("error after: {elapsed:?}\n{err}");
            ExitCode::FAILURE
        }
    }
}

/// Reads and deserializes the JSON-encoded AST emitted by the parser.
fn read_program(file_path: &str) -> Result<Program, io::Error> {
    let contents = fs::read_to_string(file_path)?;
    serde_json::from_str(&contents).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, format!("{file_path}: {err}")))
}
