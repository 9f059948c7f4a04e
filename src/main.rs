use std::{env, fs};

use bhasha::bytecode::disasm::print_bc;
use bhasha::frontend::token_dumper::TokenDumper;
use bhasha::frontend::{Lexer, Parser};
use bhasha::{compile, example_for, list_languages, run_with_config, StdinInput, VmConfig};

/// Step cap for CLI runs; an accidental `while (true)` should error out
/// instead of hanging the terminal.
const CLI_MAX_STEPS: usize = 1_000_000;

fn main() {
    simple_logger::SimpleLogger::new().env().init().ok();

    let args: Vec<String> = env::args().collect();

    let tokens_only = args.contains(&"--tokens".to_string());
    let no_color = args.contains(&"--no-color".to_string());
    let ast = args.contains(&"--ast".to_string());
    let bytecode = args.contains(&"--bc".to_string()) || args.contains(&"--bytecode".to_string());

    let lang = args
        .iter()
        .position(|a| a == "--lang")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or("en");

    // First non-flag argument (that is not the --lang value) is the filename.
    let lang_value_pos = args.iter().position(|a| a == "--lang").map(|i| i + 1);
    let filename = args
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, a)| !a.starts_with('-') && Some(*i) != lang_value_pos)
        .map(|(_, a)| a);

    match filename {
        Some(filename) => {
            let source = match fs::read_to_string(filename) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("Failed to read '{}': {}", filename, e);
                    std::process::exit(1);
                }
            };

            if tokens_only {
                dump_tokens(&source, lang, no_color);
            } else if ast {
                dump_ast(&source, lang);
            } else {
                run_program(&source, lang, bytecode);
            }
        }
        None => {
            print_usage();
            if let Some(example) = example_for(lang) {
                println!();
                println!("Example ({}):", lang);
                println!("{}", example);
            }
        }
    }
}

fn print_usage() {
    println!("bhasha - a programming language with pluggable natural-language keywords");
    println!();
    println!("Usage:");
    println!("  bhasha <file.bh>                 Run a program (English keywords)");
    println!("  bhasha --lang <code> <file.bh>   Run with another keyword language");
    println!("  bhasha --tokens <file.bh>        Show the token stream");
    println!("  bhasha --ast <file.bh>           Show the parsed syntax tree");
    println!("  bhasha --bc <file.bh>            Show the compiled bytecode");
    println!("  bhasha --no-color                Disable ANSI colors in --tokens");
    println!();
    println!("Languages:");
    for entry in list_languages() {
        println!("  {}  {}", entry.code, entry.name);
    }
}

fn lookup_or_exit(lang: &str) -> &'static bhasha::LanguageEntry {
    match bhasha::lang::lookup(lang) {
        Some(entry) => entry,
        None => {
            eprintln!("Unknown language code '{}'", lang);
            std::process::exit(1);
        }
    }
}

fn dump_tokens(source: &str, lang: &str, no_color: bool) {
    let entry = lookup_or_exit(lang);
    let tokens = Lexer::new(source, entry).tokenize();

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    dumper.dump(&tokens);
}

fn dump_ast(source: &str, lang: &str) {
    let entry = lookup_or_exit(lang);
    let tokens = Lexer::new(source, entry).tokenize();
    match Parser::new(tokens).parse() {
        Ok(program) => println!("{:#?}", program),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(source: &str, lang: &str, bytecode: bool) {
    let program = match compile(source, lang) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            std::process::exit(1);
        }
    };

    if bytecode {
        print_bc(&program);
        return;
    }

    let config = VmConfig {
        max_steps: Some(CLI_MAX_STEPS),
    };
    match run_with_config(&program, &mut StdinInput, config) {
        Ok(execution) => {
            for line in execution.output_lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            std::process::exit(1);
        }
    }
}
