//! Process-level loading driven by reserved command-line flags.
//!
//! Reserved flags live in the `ov.` namespace and never reach the
//! configuration tree:
//!
//! ```text
//! -ov.help     | -ov.h    print loader usage and exit
//! -ov.verbose  | -ov.v    log progress at info level
//! -ov.env      | -ov.e    also load the process environment
//! -ov.file.yaml| -ov.f.y  load a YAML file (repeatable)
//! -ov.file.json| -ov.f.j  load a JSON file (repeatable)
//! -ov.dryrun   | -ov.dr   print the merged tree as YAML and exit
//! ```
//!
//! Sources are loaded in a fixed order: arguments, then the environment,
//! then files in the order they were given. Since earlier sources win,
//! arguments override everything.
//!
//! [`LoadOptions::load_from`] does the work without touching the process;
//! [`LoadOptions::load`] wraps it with `std::env` input and process exits.

use crate::config::Config;
use crate::error::ConfigError;
use crate::flags::RawFlag;
use crate::interpret::interpret;
use crate::{env, flags, global};
use std::fmt::{self, Write as _};
use std::path::PathBuf;
use std::process;
use thiserror::Error;

/// Namespace of the loader's own flags.
pub const RESERVED_PREFIX: &str = "ov.";

macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Kind of value a flag expects; used in usage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Float => "float",
            ValueKind::String => "string",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservedFlag {
    Help,
    Verbose,
    Env,
    YamlFile,
    JsonFile,
    DryRun,
}

struct ReservedEntry {
    flag: ReservedFlag,
    full: &'static str,
    short: &'static str,
    kind: ValueKind,
    help: &'static str,
}

const RESERVED_FLAGS: &[ReservedEntry] = &[
    ReservedEntry {
        flag: ReservedFlag::Help,
        full: "ov.help",
        short: "ov.h",
        kind: ValueKind::Bool,
        help: "Print this help message.",
    },
    ReservedEntry {
        flag: ReservedFlag::Verbose,
        full: "ov.verbose",
        short: "ov.v",
        kind: ValueKind::Bool,
        help: "Log loading progress at info level.",
    },
    ReservedEntry {
        flag: ReservedFlag::Env,
        full: "ov.env",
        short: "ov.e",
        kind: ValueKind::Bool,
        help: "Load from environment variables.",
    },
    ReservedEntry {
        flag: ReservedFlag::YamlFile,
        full: "ov.file.yaml",
        short: "ov.f.y",
        kind: ValueKind::String,
        help: "Load a YAML file.",
    },
    ReservedEntry {
        flag: ReservedFlag::JsonFile,
        full: "ov.file.json",
        short: "ov.f.j",
        kind: ValueKind::String,
        help: "Load a JSON file.",
    },
    ReservedEntry {
        flag: ReservedFlag::DryRun,
        full: "ov.dryrun",
        short: "ov.dr",
        kind: ValueKind::Bool,
        help: "Load, print the merged YAML, then exit.",
    },
];

fn reserved_flag(key: &str) -> Option<ReservedFlag> {
    RESERVED_FLAGS
        .iter()
        .find(|entry| entry.full == key || entry.short == key)
        .map(|entry| entry.flag)
}

/// Errors that stop a process-level load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown reserved flag `-{0}`")]
    UnknownFlag(String),

    #[error("flag `-{flag}` expects a boolean, got `{value}`")]
    InvalidFlagValue { flag: String, value: String },

    #[error(
        "required file(s) not provided: {}; add them with `-ov.f.y=...` or `-ov.f.j=...`",
        .0.join(", ")
    )]
    MissingRequiredFiles(Vec<String>),

    #[error("failed to load {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// A usage line for one of the application's own keys.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEntry {
    pub key: String,
    pub kind: ValueKind,
    pub default: Option<String>,
    pub help: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputFile {
    path: String,
    format: FileFormat,
}

/// What a successful load asks the process to do.
#[derive(Debug)]
pub enum Loaded {
    /// Sources loaded; carry on.
    Ready(Config),
    /// Help was requested; print this text and exit successfully.
    Help(String),
    /// Dry run requested; print the tree and exit successfully.
    DryRun(Config),
}

/// Reserved flags and application flags picked out of the arguments.
#[derive(Debug, Default)]
struct Directives {
    loader_help: bool,
    app_help: bool,
    verbose: bool,
    env: bool,
    dry_run: bool,
    files: Vec<InputFile>,
}

/// Options for a process-level load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    required_files: Vec<String>,
    usage: Vec<UsageEntry>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a file to be given with `-ov.f.y`/`-ov.f.j`.
    ///
    /// A given path satisfies the requirement when it ends with `name`.
    pub fn with_file_require(mut self, name: impl Into<String>) -> Self {
        self.required_files.push(name.into());
        self
    }

    /// Describe one of the application's keys for `-h`/`--help`.
    pub fn with_usage(
        mut self,
        key: impl Into<String>,
        kind: ValueKind,
        default: Option<&str>,
        help: impl Into<String>,
    ) -> Self {
        self.usage.push(UsageEntry {
            key: key.into(),
            kind,
            default: default.map(str::to_string),
            help: help.into(),
        });
        self
    }

    /// Load from explicit arguments (program name excluded) and `KEY=VALUE`
    /// environment entries.
    pub fn load_from<S, I, E>(&self, args: &[S], envs: I) -> Result<Loaded, LoadError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let directives = parse_directives(args)?;

        if directives.loader_help {
            return Ok(Loaded::Help(loader_usage()));
        }
        if directives.app_help {
            return Ok(Loaded::Help(app_usage(&self.usage)));
        }

        let verbose = directives.verbose;
        progress!(
            verbose,
            env = directives.env,
            dry_run = directives.dry_run,
            "Loading configuration"
        );

        self.check_required_files(&directives.files)?;

        let mut config = Config::new();

        let count = config.load_args(args);
        progress!(verbose, count, "Command-line arguments loaded");

        if directives.env {
            let count = config.load_envs(envs);
            progress!(verbose, count, "Environment variables loaded");
        }

        for file in &directives.files {
            let result = match file.format {
                FileFormat::Yaml => config.load_yaml_file(&file.path),
                FileFormat::Json => config.load_json_file(&file.path),
            };
            result.map_err(|source| LoadError::File {
                path: PathBuf::from(&file.path),
                source,
            })?;
            progress!(verbose, path = %file.path, "File loaded");
        }

        if directives.dry_run {
            Ok(Loaded::DryRun(config))
        } else {
            Ok(Loaded::Ready(config))
        }
    }

    /// Load from the process arguments and environment.
    ///
    /// Prints usage and exits with code 0 on help, prints the tree and exits
    /// with code 0 on a dry run, and prints the error and exits with code 1
    /// when loading fails.
    pub fn load(&self) -> Config {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let envs = env::entries_from_vars(std::env::vars_os().map(|(name, value)| {
            (
                name.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        }));

        match self.load_from(args.as_slice(), envs) {
            Ok(Loaded::Ready(config)) => config,
            Ok(Loaded::Help(text)) => {
                print!("{}", text);
                process::exit(0);
            }
            Ok(Loaded::DryRun(config)) => {
                print!("{}", config.dump_yaml());
                process::exit(0);
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        }
    }

    /// [`load`](Self::load) and install the result as the process-wide
    /// configuration.
    ///
    /// If a configuration was already installed it is kept and the newly
    /// loaded one is discarded.
    pub fn init_global(&self) -> &'static Config {
        if global::install(self.load()).is_err() {
            tracing::warn!("Global configuration already installed; keeping the existing one");
        }
        global::config()
    }

    fn check_required_files(&self, files: &[InputFile]) -> Result<(), LoadError> {
        let missing: Vec<String> = self
            .required_files
            .iter()
            .filter(|required| !files.iter().any(|file| file.path.ends_with(required.as_str())))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadError::MissingRequiredFiles(missing))
        }
    }
}

fn parse_directives<S: AsRef<str>>(args: &[S]) -> Result<Directives, LoadError> {
    let mut directives = Directives::default();

    // File paths must keep their text, so reserved flags are read untyped.
    for flag in flags::tokenize_raw(args) {
        if flag.key == "h" || flag.key == "help" {
            directives.app_help = flag_bool(&flag)?;
            continue;
        }
        if !flag.key.starts_with(RESERVED_PREFIX) {
            continue;
        }

        match reserved_flag(flag.key) {
            Some(ReservedFlag::Help) => directives.loader_help = flag_bool(&flag)?,
            Some(ReservedFlag::Verbose) => directives.verbose = flag_bool(&flag)?,
            Some(ReservedFlag::Env) => directives.env = flag_bool(&flag)?,
            Some(ReservedFlag::DryRun) => directives.dry_run = flag_bool(&flag)?,
            Some(ReservedFlag::YamlFile) => directives.files.push(InputFile {
                path: flag.value.to_string(),
                format: FileFormat::Yaml,
            }),
            Some(ReservedFlag::JsonFile) => directives.files.push(InputFile {
                path: flag.value.to_string(),
                format: FileFormat::Json,
            }),
            None => return Err(LoadError::UnknownFlag(flag.key.to_string())),
        }
    }

    Ok(directives)
}

fn flag_bool(flag: &RawFlag<'_>) -> Result<bool, LoadError> {
    interpret(flag.value)
        .as_bool()
        .ok_or_else(|| LoadError::InvalidFlagValue {
            flag: flag.key.to_string(),
            value: flag.value.to_string(),
        })
}

/// Usage text for the reserved flags.
pub fn loader_usage() -> String {
    let mut out = String::from("Usage of overlay-config:\n");
    for entry in RESERVED_FLAGS {
        let _ = writeln!(out, "  -{}|-{} {}", entry.full, entry.short, entry.kind);
        let _ = writeln!(out, "        {}", entry.help);
    }
    out
}

/// Usage text for the application's keys.
pub fn app_usage(entries: &[UsageEntry]) -> String {
    if entries.is_empty() {
        return "No usage info.\n".to_string();
    }

    let mut out = String::from("Usage of app:\n");
    out.push_str("  -h|--help bool\n        Print this help message.\n");
    for entry in entries {
        let _ = writeln!(out, "  -{} {}", entry.key, entry.kind);
        let _ = match &entry.default {
            Some(default) => writeln!(out, "        {} (default {})", entry.help, default),
            None => writeln!(out, "        {}", entry.help),
        };
    }
    out
}
