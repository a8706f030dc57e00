//! overlay - inspect layered configuration.
//!
//! Loads overrides, the environment and configuration files in that order
//! (earlier sources win) and prints the merged tree or a single value.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use overlay_config::{Config, Node, convert, env};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "overlay")]
#[command(version)]
#[command(about = "Inspect layered configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged tree as YAML
    Dump {
        #[command(flatten)]
        sources: Sources,
    },

    /// Print the value at a dotted path
    Get {
        /// Dotted path, e.g. foo.redis.port
        path: String,

        /// Printed when nothing is found at the path
        #[arg(long)]
        default: Option<String>,

        #[command(flatten)]
        sources: Sources,
    },
}

#[derive(Args)]
struct Sources {
    /// Load environment variables (FOO_BAR=1 becomes foo.bar)
    #[arg(long)]
    env: bool,

    /// YAML file to load (repeatable)
    #[arg(long = "yaml", value_name = "FILE")]
    yaml: Vec<PathBuf>,

    /// JSON file to load (repeatable)
    #[arg(long = "json", value_name = "FILE")]
    json: Vec<PathBuf>,

    /// Overrides in flag form, e.g. -- -foo.id=1 --foo.name bar
    #[arg(last = true, value_name = "OVERRIDES")]
    overrides: Vec<String>,
}

impl Sources {
    fn load(&self) -> Result<Config> {
        let mut config = Config::new();

        let count = config.load_args(self.overrides.as_slice());
        tracing::debug!(count, "Overrides loaded");

        if self.env {
            let vars = std::env::vars_os().map(|(k, v)| {
                (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned())
            });
            let count = config.load_envs(env::entries_from_vars(vars));
            tracing::debug!(count, "Environment loaded");
        }

        for path in &self.yaml {
            config
                .load_yaml_file(path)
                .with_context(|| format!("Failed to load YAML file: {}", path.display()))?;
        }
        for path in &self.json {
            config
                .load_json_file(path)
                .with_context(|| format!("Failed to load JSON file: {}", path.display()))?;
        }

        Ok(config)
    }
}

fn render(node: &Node) -> String {
    match node {
        Node::Scalar(scalar) => format!("{}\n", scalar),
        Node::Seq(_) | Node::Map(_) => convert::node_to_yaml_string(node),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Dump { sources } => {
            let config = sources.load()?;
            print!("{}", config.dump_yaml());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get {
            path,
            default,
            sources,
        } => {
            let config = sources.load()?;
            match (config.get(&path), default) {
                (Some(node), _) => {
                    print!("{}", render(node));
                    Ok(ExitCode::SUCCESS)
                }
                (None, Some(default)) => {
                    println!("{}", default);
                    Ok(ExitCode::SUCCESS)
                }
                (None, None) => {
                    eprintln!("Error: key doesn't exist: {}", path);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overlay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
