use aggregate_compiler::cli::{self, CliError, CompileOptions, SnippetOptions};
use clap::{ArgAction, Parser as ClapParser, Subcommand};
use std::{
    fs,
    io::{self, Read},
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "aggc")]
#[command(about = "aggc - Compile TypeScript builder functions into aggregation pipelines")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every aggregate/aggregateOp call in a program
    Compile {
        /// Program file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Placeholder for builder functions without a parameter
        #[arg(long)]
        placeholder: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Compile one standalone expression
    Expr {
        /// The expression, e.g. 'this.na + this.nb'
        expression: String,

        /// Type of the placeholder, e.g. '{ na: number; nb: number }'
        #[arg(short, long)]
        context: Option<String>,

        #[arg(long, default_value = aggregate_compiler::DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Assemble one stage chain into a pipeline
    Pipeline {
        /// The chain, e.g. 'this.$addFields({ bar: this.foo })'
        chain: String,

        /// Type of the placeholder
        #[arg(short, long)]
        context: Option<String>,

        #[arg(long, default_value = aggregate_compiler::DEFAULT_PLACEHOLDER)]
        placeholder: String,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show the operator reference
    Operators {
        /// Topic name (omit to list topics)
        topic: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Compile {
            input,
            placeholder,
            pretty,
        } => run_compile(input, placeholder, pretty),
        Commands::Expr {
            expression,
            context,
            placeholder,
            pretty,
        } => {
            let options = SnippetOptions {
                source: expression,
                context,
                placeholder,
            };
            cli::execute_expr(&options).map(|json| print_json(&json, pretty))
        }
        Commands::Pipeline {
            chain,
            context,
            placeholder,
            pretty,
        } => {
            let options = SnippetOptions {
                source: chain,
                context,
                placeholder,
            };
            cli::execute_pipeline(&options).map(|json| print_json(&json, pretty))
        }
        Commands::Operators { topic: None } => {
            print!("{}", cli::get_reference_overview());
            Ok(())
        }
        Commands::Operators { topic: Some(topic) } => {
            cli::get_operator_reference(&topic).map(|content| print!("{}", content))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aggregate_compiler={level}")));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_compile(
    input: Option<String>,
    placeholder: Option<String>,
    pretty: bool,
) -> Result<(), CliError> {
    let source = match input {
        Some(path) => fs::read_to_string(path)?,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let options = CompileOptions {
        source,
        placeholder,
    };
    let report = cli::execute_compile(&options)?;
    print_json(&report.document, pretty);
    for diagnostic in &report.diagnostics {
        eprintln!("{}", diagnostic);
    }

    if report.failed() > 0 {
        return Err(CliError::EntryFailures {
            failed: report.failed(),
            total: report.total,
        });
    }
    Ok(())
}

fn print_json(json: &serde_json::Value, pretty: bool) {
    if pretty {
        println!("{:#}", json);
    } else {
        println!("{}", json);
    }
}
