use clap::{Parser, Subcommand};
use mjc::CodegenOptions;
use mjc::diagnostics::{CompileError, render_error};
use mjc::parser::ast::Program;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "mjc", version, about = "MiniJava to LLVM IR compiler")]
struct Cli {
    /// Lower classes in parallel (output is identical to sequential lowering)
    #[arg(long, global = true)]
    parallel: bool,

    /// Treat the input file as a JSON AST instead of MiniJava source
    #[arg(long, global = true)]
    ast_json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to a textual LLVM module
    Compile {
        /// Source file path
        file: PathBuf,
        /// Output path (defaults to the input path with a .ll extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the generated module to stdout
    EmitIr {
        /// Source file path
        file: PathBuf,
    },
    /// Print the symbol table as JSON
    Symbols {
        /// Source file path
        file: PathBuf,
    },
    /// Print the parsed AST as JSON
    Ast {
        /// Source file path
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .init();
}

fn load(path: &Path, ast_json: bool) -> Result<(String, Program), (String, CompileError)> {
    let text = std::fs::read_to_string(path).map_err(|e| (String::new(), CompileError::io(path, e)))?;
    let program = if ast_json { mjc::parse_ast_json(&text) } else { mjc::parse_source(&text) };
    match program {
        Ok(program) => Ok((text, program)),
        Err(err) => Err((text, err)),
    }
}

fn run(cli: &Cli) -> Result<(), (String, CompileError)> {
    let options = CodegenOptions { parallel: cli.parallel };

    match &cli.command {
        Commands::Compile { file, output } => {
            let (source, program) = load(file, cli.ast_json)?;
            let ir = mjc::compile_program(&program, &options).map_err(|e| (source.clone(), e))?;
            let output = output.clone().unwrap_or_else(|| file.with_extension("ll"));
            std::fs::write(&output, ir).map_err(|e| (source, CompileError::io(&output, e)))?;
            eprintln!("compiled {} -> {}", file.display(), output.display());
        }
        Commands::EmitIr { file } => {
            let (source, program) = load(file, cli.ast_json)?;
            let ir = mjc::compile_program(&program, &options).map_err(|e| (source, e))?;
            print!("{ir}");
        }
        Commands::Symbols { file } => {
            let (source, program) = load(file, cli.ast_json)?;
            let json = mjc::symtab::build_symbol_table(&program)
                .and_then(|table| table.to_json())
                .map_err(|e| (source, e))?;
            println!("{json}");
        }
        Commands::Ast { file } => {
            let (source, program) = load(file, cli.ast_json)?;
            let json = serde_json::to_string_pretty(&program).map_err(|e| (source, CompileError::from(e)))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((source, err)) => {
            let file = match &cli.command {
                Commands::Compile { file, .. }
                | Commands::EmitIr { file }
                | Commands::Symbols { file }
                | Commands::Ast { file } => file.to_string_lossy().to_string(),
            };
            if cli.ast_json {
                // Spans refer to the original source, which we do not have.
                eprintln!("error: {err}");
            } else {
                render_error(&source, &file, &err);
            }
            ExitCode::FAILURE
        }
    }
}
