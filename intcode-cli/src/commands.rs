//! CLI command implementations.

use intcode_common::{Program, Word};
use intcode_vm::{ascii, Config, Pipeline, RuntimeError, State, Vm, WordWidth};
use std::fs;
use std::io::{self, BufRead, Write};

/// Flags accepted by `run`.
#[derive(Debug, Default, PartialEq)]
struct RunOptions {
    path: String,
    inputs: Vec<Word>,
    ascii_lines: Vec<String>,
    ascii_output: bool,
    bits64: bool,
    trace: bool,
}

/// Flags accepted by `chain`.
#[derive(Debug, Default, PartialEq)]
struct ChainOptions {
    path: String,
    phases: Vec<Word>,
    signal: Word,
    feedback: bool,
    bits64: bool,
}

/// Run a program to halt, reading stdin whenever its inputs run dry.
pub fn run(args: &[String]) -> Result<(), i32> {
    let options = parse_run_args(args)?;
    let program = read_program(&options.path)?;

    let width = if options.bits64 {
        WordWidth::Bits64
    } else {
        WordWidth::Unbounded
    };
    let mut vm = Vm::with_config(&program, Config::default().word_width(width));
    vm.extend_input(options.inputs.iter().cloned());
    for line in &options.ascii_lines {
        vm.push_line(line);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut text = Vec::new();

    loop {
        let state = advance(&mut vm, options.trace).map_err(|e| {
            flush_text(&mut text);
            eprintln!("runtime error: {e}");
            3
        })?;

        match state {
            State::Output => {
                let Some(value) = vm.take_output() else {
                    continue;
                };
                if options.ascii_output {
                    text.push(value);
                } else {
                    println!("{value}");
                }
            }
            State::AwaitingInput => {
                flush_text(&mut text);
                let line = match lines.next() {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        eprintln!("error: cannot read stdin: {e}");
                        return Err(1);
                    }
                    None => {
                        eprintln!("error: program needs more input (at {})", vm.ip());
                        return Err(2);
                    }
                };
                if options.ascii_output {
                    vm.push_line(&line);
                } else {
                    vm.extend_input(parse_words(&line)?);
                }
            }
            State::Halted => {
                flush_text(&mut text);
                return Ok(());
            }
            // `advance` never stops on these.
            State::Running | State::Fatal => {}
        }
    }
}

/// Disassemble a program to a listing.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: intcode disassemble <prog>");
        return Err(1);
    }

    let program = read_program(&args[0])?;
    print!("{}", intcode_common::disassemble(&program));
    Ok(())
}

/// Run a chain of amplifiers and print the final signal.
pub fn chain(args: &[String]) -> Result<(), i32> {
    let options = parse_chain_args(args)?;
    let program = read_program(&options.path)?;

    let config = if options.bits64 {
        Config::default().word_width(WordWidth::Bits64)
    } else {
        Config::default()
    };
    let mut pipeline =
        Pipeline::with_config(&program, &options.phases, config).feedback(options.feedback);

    match pipeline.run(options.signal) {
        Ok(Some(signal)) => {
            println!("{signal}");
            Ok(())
        }
        Ok(None) => match pipeline.stages().last().map(Vm::state) {
            Some(State::AwaitingInput) => {
                eprintln!("error: chain needs more input than it was given");
                Err(2)
            }
            _ => {
                eprintln!("chain halted without producing a signal");
                Ok(())
            }
        },
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

// --- Helpers ---

/// Execute until the VM stops, printing each instruction when tracing.
fn advance(vm: &mut Vm, trace: bool) -> Result<State, RuntimeError> {
    if !trace {
        return vm.run();
    }
    loop {
        if let Some(text) = vm.current_instruction() {
            eprintln!("{:>6}  {text}  (rb {})", vm.ip(), vm.relative_base());
        }
        match vm.step()? {
            State::Running => continue,
            state => return Ok(state),
        }
    }
}

/// Print buffered ASCII output.
fn flush_text(text: &mut Vec<Word>) {
    if text.is_empty() {
        return;
    }
    print!("{}", ascii::render(text));
    // Stdout going away is not the program's failure.
    let _ = io::stdout().flush();
    text.clear();
}

/// Read and parse a program file.
fn read_program(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::parse(&text).map_err(|e| {
        eprintln!("error: invalid program '{path}': {e}");
        1
    })
}

/// Parse a comma-separated list of integers.
fn parse_words(text: &str) -> Result<Vec<Word>, i32> {
    Program::parse(text)
        .map(|list| list.words().to_vec())
        .map_err(|e| {
            eprintln!("error: invalid input list: {e}");
            1
        })
}

/// Take the value following flag `args[*i]`, advancing `i` past it.
fn flag_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, i32> {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => {
            eprintln!("error: {flag} requires a value");
            Err(1)
        }
    }
}

fn parse_run_args(args: &[String]) -> Result<RunOptions, i32> {
    let mut options = RunOptions::default();
    let mut path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                let value = flag_value(args, &mut i)?;
                options.inputs.extend(parse_words(value)?);
            }
            "--ascii" => {
                let value = flag_value(args, &mut i)?;
                options.ascii_lines.push(value.to_string());
            }
            "--ascii-output" => options.ascii_output = true,
            "--bits64" => options.bits64 = true,
            "--trace" => options.trace = true,
            flag if flag.starts_with("--") => {
                eprintln!("error: unknown flag '{flag}'");
                return Err(1);
            }
            positional if path.is_none() => path = Some(positional.to_string()),
            extra => {
                eprintln!("error: unexpected argument '{extra}'");
                return Err(1);
            }
        }
        i += 1;
    }

    options.path = path.ok_or_else(|| {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: intcode run <prog> [--input a,b,..] [--ascii LINE] [--ascii-output] [--bits64] [--trace]");
        1
    })?;
    Ok(options)
}

fn parse_chain_args(args: &[String]) -> Result<ChainOptions, i32> {
    let mut options = ChainOptions::default();
    let mut path = None;
    let mut phases = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--phases" => {
                let value = flag_value(args, &mut i)?;
                phases = Some(parse_words(value)?);
            }
            "--input" => {
                let value = flag_value(args, &mut i)?;
                let words = parse_words(value)?;
                if words.len() != 1 {
                    eprintln!("error: --input takes a single signal");
                    return Err(1);
                }
                options.signal = words[0].clone();
            }
            "--feedback" => options.feedback = true,
            "--bits64" => options.bits64 = true,
            flag if flag.starts_with("--") => {
                eprintln!("error: unknown flag '{flag}'");
                return Err(1);
            }
            positional if path.is_none() => path = Some(positional.to_string()),
            extra => {
                eprintln!("error: unexpected argument '{extra}'");
                return Err(1);
            }
        }
        i += 1;
    }

    let usage = "Usage: intcode chain <prog> --phases p,q,.. [--input SIGNAL] [--feedback]";
    options.path = path.ok_or_else(|| {
        eprintln!("error: chain requires an input file");
        eprintln!("{usage}");
        1
    })?;
    options.phases = phases.ok_or_else(|| {
        eprintln!("error: --phases is required");
        eprintln!("{usage}");
        1
    })?;
    Ok(options)
}
