use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use weka_dl4j_layers::architecture::{build_model, finalize, load_architecture};
use weka_dl4j_layers::options::{codec, registry, ConfigObject};
use weka_dl4j_layers::{ConfigError, Result};

// Command-line front end for the layer option surface.
#[derive(Parser)]
#[command(name = "layer_options")]
#[command(about = "Inspect and apply Weka-style options for DeepLearning4J layers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the options of a configuration type
    List { kind: String },
    /// Decode options, then print the normalized option line and the finalized specification
    Parse {
        kind: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Build the network described by a JSON architecture file
    Build { file: PathBuf },
}

fn list_options(kind: &str) -> Result<String> {
    let schema = registry::lookup(kind)?;
    Ok(codec::describe(schema))
}

fn parse_options(kind: &str, options: &[String]) -> Result<String> {
    let schema = registry::lookup(kind)?;
    let mut object = ConfigObject::new(schema);
    codec::decode(&mut object, options)?;

    let line = codec::encode_line(&object)?;
    let spec = finalize(&mut object)?;
    Ok(format!("{}\n{}", line, serde_json::to_string_pretty(&spec)?))
}

fn build_network(file: &Path) -> Result<String> {
    let architecture = load_architecture(file)?;
    build_model(&architecture)?.to_json()
}

fn run(command: &Commands) -> Result<String> {
    match command {
        Commands::List { kind } => list_options(kind),
        Commands::Parse { kind, options } => parse_options(kind, options),
        Commands::Build { file } => build_network(file),
    }
}

/// Error text for the terminal: the error itself, then one line per decode issue.
fn report(err: &ConfigError) -> String {
    let mut text = format!("Error: {}", err);
    for issue in err.issues() {
        text.push_str(&format!("\n  {}", issue));
    }
    text
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("{}", report(&err));
            process::exit(1);
        }
    }
}
