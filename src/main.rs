// puml2rs: generate a Rust state machine from a PlantUML state diagram.
//
// Usage:
//   puml2rs <INPUT.puml> [OUTPUT] [OPTIONS]
//
// OUTPUT defaults to the input path with an .rs extension; an existing
// directory receives <stem>.rs inside it. The generated file is run through
// rustfmt so any rustfmt.toml in the project applies to it.

use std::path::{Path, PathBuf};
use std::process::{self, Command};

use puml2rs::{GenOptions, Source, generate, parse};

struct Args {
    input: PathBuf,
    output: PathBuf,
    options: GenOptions,
    format: bool,
}

fn main() {
    let args = parse_args().unwrap_or_else(|msg| fatal(&msg));

    let content = std::fs::read_to_string(&args.input)
        .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", args.input.display())));

    let source = Source::from_text(&args.input.display().to_string(), &content);
    let diagram = parse(&source).unwrap_or_else(|e| fatal(&e.to_string()));
    let code = generate(&diagram, &args.options).unwrap_or_else(|e| fatal(&e.to_string()));

    std::fs::write(&args.output, code)
        .unwrap_or_else(|e| fatal(&format!("failed to write {}: {e}", args.output.display())));

    if args.format {
        run_rustfmt(&args.output).unwrap_or_else(|msg| fatal(&msg));
    }
}

fn parse_args() -> Result<Args, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut module: Option<String> = None;
    let mut classname: Option<String> = None;
    let mut format = true;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-m" | "--module" => {
                module = Some(args.next().ok_or("missing value for --module")?);
            }
            "-c" | "--classname" => {
                classname = Some(args.next().ok_or("missing value for --classname")?);
            }
            "-f" | "--no-format" => format = false,
            _ if arg.starts_with('-') => return Err(format!("unknown option: {arg}")),
            _ => {
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else if output.is_none() {
                    output = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("unexpected argument: {arg}"));
                }
            }
        }
    }

    let input = input.ok_or("missing input file (try --help)")?;

    let output = match output {
        None => input.with_extension("rs"),
        Some(dir) if dir.is_dir() => {
            let name = input.with_extension("rs");
            let name = name
                .file_name()
                .ok_or_else(|| format!("cannot derive an output name from {}", input.display()))?;
            dir.join(name)
        }
        Some(path) => path,
    };

    let machine_name = match classname {
        Some(name) => name,
        None => {
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| format!("cannot derive a class name from {}", input.display()))?;
            to_pascal_case(stem)
        }
    };

    Ok(Args {
        input,
        output,
        options: GenOptions {
            machine_name,
            module,
        },
        format,
    })
}

fn print_help() {
    println!("puml2rs: generate a Rust state machine from a PlantUML state diagram.");
    println!();
    println!("Usage: puml2rs <INPUT.puml> [OUTPUT] [OPTIONS]");
    println!();
    println!("The generated code is run through rustfmt in place, so an existing");
    println!("rustfmt.toml applies to it.");
    println!();
    println!("Arguments:");
    println!("  INPUT.puml               PlantUML state machine description file");
    println!("  OUTPUT                   output file or directory; default is the");
    println!("                           input file with an .rs extension");
    println!();
    println!("Options:");
    println!("  -m, --module NAME        wrap the generated code in `pub mod NAME`");
    println!("  -c, --classname NAME     name of the generated machine type; default");
    println!("                           is the input file stem in Pascal case");
    println!("  -f, --no-format          do not run rustfmt on the generated code");
    println!("  -h, --help               print this help");
}

fn run_rustfmt(path: &Path) -> Result<(), String> {
    let status = Command::new("rustfmt")
        .arg("--edition")
        .arg("2024")
        .arg(path)
        .status()
        .map_err(|e| format!("failed to run rustfmt: {e}"))?;

    if !status.success() {
        return Err(format!("rustfmt exited with {status}"));
    }
    Ok(())
}

/// Converts a file stem like `simple_fsm` to `SimpleFsm`.
fn to_pascal_case(s: &str) -> String {
    s.split(['_', ' ', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn fatal(message: &str) -> ! {
    eprintln!("puml2rs: {message}");
    process::exit(1);
}
