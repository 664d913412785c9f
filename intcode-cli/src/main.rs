//! Intcode CLI: run, disassemble, and chain programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/load error
//! - 2: Program needed more input than was available
//! - 3: Runtime error

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "chain" => commands::chain(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: intcode <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <prog> [options]                  Run a program to halt");
    eprintln!("      --input a,b,..                    Queue integer inputs");
    eprintln!("      --ascii LINE                      Queue a line of text (repeatable)");
    eprintln!("      --ascii-output                    Print output as text, read text from stdin");
    eprintln!("      --bits64                          Fault on values outside 64 bits");
    eprintln!("      --trace                           Print each instruction to stderr");
    eprintln!("  disassemble <prog>                    List a program's instructions");
    eprintln!("  chain <prog> --phases p,q,.. [--input SIGNAL] [--feedback]");
    eprintln!("                                        Run a chain of amplifiers");
}
