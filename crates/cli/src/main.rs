//! APEX out-of-order superscalar simulator — interactive REPL (spec.md §6).
//!
//! `cpu <asm_file>` parses the given assembly file lazily (only
//! `Initialize` actually builds the machine) and then reads commands from
//! stdin, one per line, until `q` or end of input.

use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

use apex_core::config::Config;
use apex_core::core::TickOutcome;
use apex_core::sim::{Simulator, parse_memory_image};

#[derive(Parser, Debug)]
#[command(name = "cpu", about = "APEX out-of-order superscalar simulator")]
struct Cli {
    /// Assembly source file, loaded at PC = 4000 on `Initialize`.
    asm_file: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let source = match fs::read_to_string(&cli.asm_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading {}: {e}", cli.asm_file);
            return ExitCode::FAILURE;
        }
    };

    let mut sim = Simulator::new(Config::default(), source);
    run_repl(&mut sim)
}

/// Reads one command per line from stdin and dispatches it, returning the
/// process exit code once `q` or end of input is reached or a fatal
/// error terminates the machine (spec.md §6's process-exit rule).
fn run_repl(sim: &mut Simulator) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next().unwrap_or("").trim();

        match cmd {
            "q" => break,
            "Initialize" => {
                if let Err(e) = sim.initialize() {
                    eprintln!("fatal: {e}");
                    return ExitCode::FAILURE;
                }
                println!("initialized");
            }
            "Single_step" => match sim.single_step() {
                None => println!("error: not initialized"),
                Some(Ok(TickOutcome::Halted)) => println!("halted"),
                Some(Ok(TickOutcome::Running)) => println!("ok"),
                Some(Err(e)) => {
                    eprintln!("fatal: {e}");
                    return ExitCode::FAILURE;
                }
            },
            "Simulate" => {
                let Ok(n) = arg.parse::<u64>() else {
                    println!("error: invalid count '{arg}'");
                    continue;
                };
                match sim.simulate(n) {
                    None => println!("error: not initialized"),
                    Some(Ok(TickOutcome::Halted)) => println!("halted"),
                    Some(Ok(TickOutcome::Running)) => println!("ok"),
                    Some(Err(e)) => {
                        eprintln!("fatal: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            "Display" => match sim.display() {
                Ok(s) => {
                    let _ = write!(stdout, "{s}");
                }
                Err(e) => println!("error: {e}"),
            },
            "ShowMem" => {
                let Ok(addr) = arg.parse::<i32>() else {
                    println!("error: invalid address '{arg}'");
                    continue;
                };
                match sim.show_mem(addr) {
                    Ok(s) => println!("{s}"),
                    Err(e) => println!("error: {e}"),
                }
            }
            "SetMem" => match fs::read_to_string(arg) {
                Ok(text) => match parse_memory_image(&text).and_then(|values| sim.set_mem(&values)) {
                    Ok(()) => println!("ok"),
                    Err(e) => println!("error: {e}"),
                },
                Err(e) => println!("error: could not read '{arg}': {e}"),
            },
            other => println!("error: unknown command '{other}'"),
        }
    }

    ExitCode::SUCCESS
}
