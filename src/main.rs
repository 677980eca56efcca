// decompi: pseudocode compiler front-end with a terminal report viewer

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser as CliParser, ValueEnum};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{LevelFilter, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use decompi::parser::DEFAULT_MAX_DEPTH;
use decompi::parser::lexer::Lexer;
use decompi::ui::App;
use decompi::{CompilationResult, Compiler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Interactive report viewer
    Tui,
    /// Plain-text tables on stdout
    Table,
    /// The compilation result as JSON
    Json,
}

#[derive(Debug, CliParser)]
#[command(name = "decompi", version, about = "Compile pseudocode and report errors, operators and control structures")]
struct Cli {
    /// Source file, or `-` to read standard input
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tui)]
    format: Format,

    /// Print the token stream instead of compiling
    #[arg(long)]
    tokens: bool,

    /// Maximum nesting of blocks, parentheses, unary operators and operator chains
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether the source compiled without diagnostics.
fn run(cli: &Cli) -> Result<bool> {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("failed to initialise logging")?;

    let (name, source) = read_source(&cli.file)?;
    info!("read {} ({} bytes)", name, source.len());

    if cli.tokens {
        return Ok(dump_tokens(&source));
    }

    let result = Compiler::new()
        .with_max_depth(cli.max_depth)
        .compile(&source);

    match cli.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
            println!("{}", json);
        }
        Format::Table => print_tables(&result),
        Format::Tui => run_tui(App::new(result.clone(), source, name))?,
    }

    Ok(result.errors.is_empty())
}

fn read_source(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
        return Ok(("<stdin>".to_string(), source));
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok((path.display().to_string(), source))
}

/// One token per line; returns whether the input lexed cleanly.
fn dump_tokens(source: &str) -> bool {
    let mut clean = true;
    for item in Lexer::new(source) {
        match item {
            Ok(token) => println!(
                "{:>4}:{:<3} {:<12} {}",
                token.location.line,
                token.location.column,
                format!("{:?}", token.kind.category()),
                token
            ),
            Err(err) => {
                clean = false;
                println!("{:>4}:{:<3} {:<12} {}", err.location.line, err.location.column, "ERROR", err.message);
            }
        }
    }
    clean
}

fn print_tables(result: &CompilationResult) {
    if result.errors.is_empty() {
        println!("No errors.");
    } else {
        println!("Errors ({}):", result.errors.len());
        println!("  {:<18} {:>5} {:>6}  {:<12} {}", "TYPE", "LINE", "COLUMN", "LEXEME", "DESCRIPTION");
        for error in &result.errors {
            println!(
                "  {:<18} {:>5} {:>6}  {:<12} {}",
                error.kind.label(),
                error.line,
                error.column,
                error.lexeme,
                error.description
            );
        }
    }

    println!();
    println!("Operators ({}):", result.operator_report.len());
    for op in &result.operator_report {
        println!("  {:<4} {:>5}:{:<4} {}", op.operator, op.line, op.column, op.occurrence);
    }

    println!();
    println!("Control structures ({}):", result.control_report.len());
    for control in &result.control_report {
        println!("  {:<6} line {:<5} {}", control.kind.to_string(), control.line, control.condition);
    }

    if let Some(program) = result.authoritative_program() {
        println!();
        println!("Program:");
        for line in program.to_string().lines() {
            println!("  {}", line);
        }
    }
}

fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("report viewer failed")
}
