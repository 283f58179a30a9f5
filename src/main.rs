use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser as ClapParser;

use lox::ast_printer::AstPrinter;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script to run; omit to start an interactive session
    script: Option<PathBuf>,

    /// Print the parsed syntax tree instead of executing
    #[arg(short, long)]
    print: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Cli = Cli::parse();

    match args.script {
        Some(path) => run_file(&path, args.print),
        None => run_prompt(),
    }
}

fn run_file(path: &PathBuf, print_ast: bool) -> anyhow::Result<()> {
    // The file must be UTF-8; validating here means the scanner only
    // ever sees well-formed source bytes.
    let source = fs::read_to_string(path)?;

    let (tokens, mut had_error) = scan(source.as_bytes());

    let mut parser: Parser = Parser::new(tokens);
    let statements = parser.parse();

    for err in parser.take_errors() {
        eprintln!("{}", err);
        had_error = true;
    }

    if print_ast {
        if had_error {
            std::process::exit(64);
        }

        for stmt in &statements {
            println!("{}", AstPrinter::print_stmt(stmt));
        }

        return Ok(());
    }

    if had_error {
        std::process::exit(64);
    }

    let mut stdout = io::stdout();
    let mut interpreter = Interpreter::new(&mut stdout);

    let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
    if !resolve_errors.is_empty() {
        for err in resolve_errors {
            eprintln!("{}", err);
        }

        std::process::exit(64);
    }

    if let Err(err) = interpreter.interpret(&statements) {
        eprintln!("{}", err);
        std::process::exit(70);
    }

    Ok(())
}

/// Read-eval-print loop.  One interpreter session is shared across
/// prompts so definitions persist; the error state resets per line.
fn run_prompt() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut prompt_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interpreter = Interpreter::new(&mut interp_stdout);

    // Expression ids must stay unique across prompts: the interpreter's
    // binding-distance table outlives each line's parser.
    let mut next_id: usize = 0;

    let mut input = String::new();
    loop {
        prompt_stdout.write_all(b"> ")?;
        prompt_stdout.flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }

        let (tokens, mut had_error) = scan(input.as_bytes());

        let mut parser: Parser = Parser::with_offset(tokens, next_id);
        let statements = parser.parse();
        next_id = parser.next_id();

        for err in parser.take_errors() {
            eprintln!("{}", err);
            had_error = true;
        }

        if had_error {
            continue;
        }

        let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
        if !resolve_errors.is_empty() {
            for err in resolve_errors {
                eprintln!("{}", err);
            }

            continue;
        }

        if let Err(err) = interpreter.interpret(&statements) {
            eprintln!("{}", err);
        }
    }

    Ok(())
}

/// Drive the scanner to completion, reporting errors as they surface.
/// The token list always ends with `EOF`, even after scan errors.
fn scan(source: &[u8]) -> (Vec<Token>, bool) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),

            Err(err) => {
                eprintln!("{}", err);
                had_error = true;
            }
        }
    }

    (tokens, had_error)
}
