use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sieve_engine::config::paths;
use sieve_engine::store::script_io;
use sieve_engine::store::{FileRepository, ScriptRepository, StoreError};
use sieve_engine::{
    ConfigError, InterpreterConfig, MailAdapter, ParsedMessage, SieveError, SieveInterpreter,
};

#[derive(Parser)]
#[command(name = "sievers", version)]
#[command(about = "Run and check SIEVE mail filtering scripts")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Interpreter config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a script against a message and print the queued actions
    Run {
        /// Script file, or - for stdin
        script: PathBuf,

        /// RFC 822 message file, or - for stdin
        message: PathBuf,

        /// Envelope sender
        #[arg(long)]
        from: Option<String>,

        /// Envelope recipient (repeatable)
        #[arg(long)]
        to: Vec<String>,
    },

    /// Validate a script and print it in canonical form
    Check {
        /// Script file, or - for stdin
        script: PathBuf,

        /// Rewrite the file in canonical form
        #[arg(long)]
        write: bool,
    },

    /// List the capabilities scripts may require
    Capabilities,

    /// Manage stored scripts
    Scripts {
        /// Repository root (defaults to the user data directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Script owner
        #[arg(long, default_value = "default")]
        user: String,

        #[command(subcommand)]
        action: ScriptsCommand,
    },
}

#[derive(Subcommand)]
enum ScriptsCommand {
    /// List stored scripts
    List,
    /// Print a stored script
    Get { name: String },
    /// Check and store a script file under a name
    Put { name: String, file: PathBuf },
    /// Mark a script as active
    Activate { name: String },
    /// Delete a script that is not active
    Delete { name: String },
    /// Rename a script
    Rename { from: String, to: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sieve(#[from] SieveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No script repository location available, pass --root")]
    NoRepository,
}

fn load_config(path: Option<&Path>) -> Result<InterpreterConfig, ConfigError> {
    match path {
        Some(path) => InterpreterConfig::load(path),
        None => InterpreterConfig::load_default(),
    }
}

fn cmd_run(
    interpreter: &SieveInterpreter,
    script: &Path,
    message: &Path,
    from: Option<&str>,
    to: &[String],
) -> Result<(), CliError> {
    let script = script_io::read_input(script)?;
    let raw = script_io::read_input(message)?;

    let mut mail = ParsedMessage::parse(&raw)?;
    if let Some(from) = from {
        mail.add_envelope("from", from);
    }
    for recipient in to {
        mail.add_envelope("to", recipient.as_str());
    }

    let outcome = interpreter.interpret(&mut mail, &script);
    // queued actions are reported even when evaluation failed part way
    println!("{}", serde_json::to_string_pretty(mail.actions())?);
    outcome?;
    Ok(())
}

fn cmd_check(interpreter: &SieveInterpreter, path: &Path, write: bool) -> Result<(), CliError> {
    let script = interpreter.check(&script_io::read_input(path)?)?;
    let canonical = script.to_string();
    if write {
        script_io::save_script(path, &canonical)?;
        tracing::info!(path = %path.display(), "script rewritten");
    } else {
        print!("{canonical}");
    }
    Ok(())
}

fn cmd_scripts(
    interpreter: &SieveInterpreter,
    root: Option<PathBuf>,
    user: &str,
    action: &ScriptsCommand,
) -> Result<(), CliError> {
    let root = root
        .or_else(paths::scripts_dir)
        .ok_or(CliError::NoRepository)?;
    let repo = FileRepository::new(root);

    match action {
        ScriptsCommand::List => {
            for info in repo.list_scripts(user)? {
                let marker = if info.active { "*" } else { " " };
                println!("{marker} {}", info.name);
            }
        }
        ScriptsCommand::Get { name } => print!("{}", repo.get_script(user, name)?),
        ScriptsCommand::Put { name, file } => {
            let data = script_io::read_input(file)?;
            interpreter.check(&data)?;
            let text = String::from_utf8_lossy(&data);
            repo.put_script(user, name, &text)?;
        }
        ScriptsCommand::Activate { name } => repo.set_active(user, name)?,
        ScriptsCommand::Delete { name } => repo.delete_script(user, name)?,
        ScriptsCommand::Rename { from, to } => repo.rename_script(user, from, to)?,
    }
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let interpreter = SieveInterpreter::from_config(&config)?;

    match args.command {
        Command::Run {
            script,
            message,
            from,
            to,
        } => cmd_run(&interpreter, &script, &message, from.as_deref(), &to),
        Command::Check { script, write } => cmd_check(&interpreter, &script, write),
        Command::Capabilities => {
            for capability in interpreter.registry().capabilities() {
                println!("{capability}");
            }
            Ok(())
        }
        Command::Scripts { root, user, action } => {
            cmd_scripts(&interpreter, root, &user, &action)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
