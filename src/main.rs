use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser as _;
use clap_stdin::FileOrStdin;
use log::{info, LevelFilter};

use mincc::analyzer::check;
use mincc::codegen::Backend;
use mincc::error::{CompileError, CompileResult};
use mincc::lexer::Lexer;
use mincc::parser::Parser;

#[derive(Debug, clap::Parser)]
#[command(author, version, about = "Compiles a mincc program to C or NASM assembly")]
struct Args {
    /// Source file, `-` reads from stdin
    input: FileOrStdin,

    /// Output file: `.c` for C, `.asm` for NASM
    output: PathBuf,

    /// Print the token stream to stderr
    #[arg(long)]
    dump_tokens: bool,

    /// Print the parsed program to stderr
    #[arg(long)]
    dump_ast: bool,

    /// Stop after the checker, write nothing
    #[arg(long)]
    check: bool,

    /// Raise the log level, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> CompileResult<()> {
    let backend = Backend::from_path(&args.output)?;
    let source = args
        .input
        .contents()
        .map_err(|e| CompileError::Io(std::io::Error::other(e)))?;

    let start = Instant::now();
    let tokens = Lexer::tokenize(&source)?;
    if args.dump_tokens {
        for t in tokens.iter() {
            eprintln!("{:>4}:{:<4} {:<14?} {:?}", t.pos.line, t.pos.column, t.kind, t.lexeme);
        }
    }

    let program = Parser::new(tokens).parse()?;
    if args.dump_ast {
        eprintln!("{:#?}", program);
    }

    check(&program)?;
    if args.check {
        info!("checked in {:?}", start.elapsed());
        return Ok(());
    }

    let text = backend.generate(&program)?;
    mincc::write_output(&args.output, &text)?;
    info!("compiled {} in {:?}", args.output.display(), start.elapsed());

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}
