//! mcped - MCP server configuration editor
//!
//! Usage:
//!   mcped list                 # Show configured servers
//!   mcped add -i               # Add a server interactively
//!   mcped load config.json     # Replace the list with a file
//!   mcped save --dir .         # Write claude_desktop_config.json
//!   mcped share                # Print a share link

mod interactive;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcped_core::clipboard::Clipboard;
use mcped_core::editor::Editor;
use mcped_core::mcp::{
    AddStatus, ParseError, ServerEntry, ServerUpdate, ValidationResult, parse_mcp_json,
};
use mcped_core::notice::{Notice, NoticeLevel};
use mcped_core::settings::{default_settings_path, load_settings};
use mcped_core::storage::FileStorage;
use mcped_core::store::next_server_key;
use mcped_core::types::ServerType;

use crate::interactive::{AddServerFlow, PrefilledServer, parse_env_pair, split_args};

#[derive(Parser)]
#[command(name = "mcped")]
#[command(about = "MCP server configuration editor", long_about = None)]
struct Cli {
    /// Storage file holding the server list
    #[arg(long, global = true, value_name = "PATH")]
    storage: Option<PathBuf>,

    /// Settings file (default: <config dir>/mcped/settings.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured servers
    #[command(alias = "ls")]
    List,

    /// Print the configuration JSON as it would be saved
    Show,

    /// Add a server
    ///
    /// Without options a blank stdio server is appended. With --json the
    /// servers of an `mcpServers` document are merged in, overwriting
    /// servers with the same name.
    Add(AddArgs),

    /// Edit a server's name, type, command or URL
    Set {
        /// Name of the server to edit
        key: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New type (stdio or sse)
        #[arg(long = "type", short = 't', value_parser = parse_server_type)]
        server_type: Option<ServerType>,
        /// New command (stdio servers)
        #[arg(long)]
        command: Option<String>,
        /// New URL (sse servers)
        #[arg(long)]
        url: Option<String>,
    },

    /// Copy a server under a fresh name
    Duplicate {
        key: String,
    },

    /// Remove a server
    #[command(alias = "rm")]
    Remove {
        key: String,
    },

    /// Remove every server
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Edit a stdio server's arguments
    Arg(ArgArgs),

    /// Edit a server's environment variables
    Env(EnvArgs),

    /// Replace the server list with a configuration file
    Load {
        file: PathBuf,
    },

    /// Save the configuration file
    Save {
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Write the configuration JSON to stdout
    Copy,

    /// Write a share link to stdout
    Share,

    /// Replace the server list with the configuration carried by a share link
    Open {
        url: String,
    },

    /// Check a configuration file without loading it
    Validate {
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable output
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only show errors
    Quiet,
}

#[derive(Args)]
struct AddArgs {
    /// Read an mcpServers document from FILE ("-" for stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "interactive")]
    json: Option<String>,
    /// Interactive mode - prompts for every field
    #[arg(short, long)]
    interactive: bool,
    /// Skip the confirmation prompt in interactive mode
    #[arg(short = 'y', long)]
    yes: bool,
    /// Server name
    #[arg(long)]
    name: Option<String>,
    /// Server type (stdio or sse); inferred from --command or --url when omitted
    #[arg(long = "type", short = 't', value_parser = parse_server_type)]
    server_type: Option<ServerType>,
    /// Command for stdio servers
    #[arg(long, conflicts_with = "url")]
    command: Option<String>,
    /// URL for sse servers
    #[arg(long)]
    url: Option<String>,
    /// Arguments for stdio servers (space separated)
    #[arg(long, value_name = "ARGS")]
    args: Option<String>,
    /// Environment variable (KEY=VALUE)
    #[arg(long, value_name = "KEY=VALUE")]
    env: Vec<String>,
}

#[derive(Args)]
struct ArgArgs {
    #[command(subcommand)]
    command: ArgSubcommand,
}

#[derive(Subcommand)]
enum ArgSubcommand {
    /// Append an empty argument
    Add { key: String },
    /// Set the argument at INDEX (0-based)
    Set {
        key: String,
        index: usize,
        value: String,
    },
    /// Remove the argument at INDEX (0-based)
    Remove { key: String, index: usize },
}

#[derive(Args)]
struct EnvArgs {
    #[command(subcommand)]
    command: EnvSubcommand,
}

#[derive(Subcommand)]
enum EnvSubcommand {
    /// Add an empty variable under the next free KEY_N name
    Add { key: String },
    /// Set a variable's value, optionally renaming it
    Set {
        key: String,
        name: String,
        value: String,
        /// New variable name
        #[arg(long)]
        rename: Option<String>,
    },
    /// Remove a variable
    Remove { key: String, name: String },
}

/// Clipboard stand-in for a terminal: copied text goes to stdout.
struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}").context("Failed to write to stdout")?;
        stdout.flush().context("Failed to flush stdout")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcped=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let format = cli.format;
    let mut editor = open_editor(cli.config, cli.storage)?;

    let ok = run_cli(&mut editor, cli.command, format)?;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn open_editor(
    config: Option<PathBuf>,
    storage: Option<PathBuf>,
) -> Result<Editor<FileStorage>> {
    let settings_path = match config {
        Some(path) => path,
        None => default_settings_path()?,
    };
    let settings = load_settings(&settings_path)?;

    let storage_path = match storage.or_else(|| settings.storage_path.clone()) {
        Some(path) => path,
        None => FileStorage::default_path()?,
    };
    tracing::debug!(
        settings = %settings_path.display(),
        storage = %storage_path.display(),
        "opening editor"
    );

    Editor::open(FileStorage::new(storage_path), settings)
}

/// Dispatch one command. Returns `false` when the action failed and the
/// process should exit non-zero.
fn run_cli(
    editor: &mut Editor<FileStorage>,
    command: Commands,
    format: OutputFormat,
) -> Result<bool> {
    match command {
        Commands::List => {
            print_servers(editor.store().servers(), format)?;
            Ok(true)
        }
        Commands::Show => {
            println!("{}", editor.json_preview()?);
            Ok(true)
        }
        Commands::Add(args) => run_add(editor, args, format),
        Commands::Set {
            key,
            name,
            server_type,
            command,
            url,
        } => {
            let update = ServerUpdate {
                key: name,
                server_type,
                command,
                url,
                ..ServerUpdate::default()
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to change. Pass --name, --type, --command or --url");
            }
            let found = editor.update_server(&key, update)?;
            finish(editor, found, &key, format, "Server updated")
        }
        Commands::Duplicate { key } => {
            let found = editor.duplicate_server(&key)?.is_some();
            finish(editor, found, &key, format, "Server duplicated")
        }
        Commands::Remove { key } => {
            let found = editor.remove_server(&key)?;
            finish(editor, found, &key, format, "Server removed")
        }
        Commands::Clear { yes } => run_clear(editor, yes, format),
        Commands::Arg(args) => run_arg(editor, args, format),
        Commands::Env(args) => run_env(editor, args, format),
        Commands::Load { file } => {
            let loaded = editor.load_json_file(&file)?;
            print_notice(editor.notice(), format)?;
            Ok(loaded)
        }
        Commands::Save { dir } => {
            editor.save_json_file(&dir)?;
            print_notice(editor.notice(), format)?;
            Ok(true)
        }
        Commands::Copy => {
            let copied = editor.copy_json(&mut StdoutClipboard)?;
            print_notice(editor.notice(), format)?;
            Ok(copied)
        }
        Commands::Share => {
            let copied = editor.copy_share_url(&mut StdoutClipboard)?;
            print_notice(editor.notice(), format)?;
            Ok(copied)
        }
        Commands::Open { url } => {
            let Some(loaded) = editor.load_startup_url(&url)? else {
                anyhow::bail!("URL carries no \"config\" parameter: {}", url);
            };
            print_notice(editor.notice(), format)?;
            Ok(loaded)
        }
        Commands::Validate { file } => run_validate(&file, format),
    }
}

fn run_add(editor: &mut Editor<FileStorage>, args: AddArgs, format: OutputFormat) -> Result<bool> {
    if let Some(source) = &args.json {
        let text = if source == "-" {
            io::read_to_string(io::stdin()).context("Failed to read JSON from stdin")?
        } else {
            std::fs::read_to_string(source)
                .with_context(|| format!("Failed to read JSON file: {}", source))?
        };

        let check = editor.add_from_json(&text)?;
        if check.status == AddStatus::Warning && !matches!(format, OutputFormat::Quiet) {
            eprintln!("  ⚠ {}", check.message);
        }
        print_notice(editor.notice(), format)?;
        return Ok(check.status.can_add());
    }

    let prefilled = PrefilledServer {
        key: args.name,
        server_type: args.server_type,
        command: args.command,
        url: args.url,
        args: args.args.as_deref().map(split_args),
        env: if args.env.is_empty() {
            None
        } else {
            Some(
                args.env
                    .iter()
                    .map(|pair| parse_env_pair(pair))
                    .collect::<Result<_>>()?,
            )
        },
        yes: args.yes,
    };

    let update = if args.interactive {
        let default_key = next_server_key(editor.store().servers());
        let result = AddServerFlow::new(default_key, prefilled).collect()?;
        if !result.confirmed {
            println!("Cancelled.");
            return Ok(true);
        }
        result.update
    } else {
        prefilled_update(prefilled)
    };

    let key = editor.add_server()?;
    if !update.is_empty() {
        editor.update_server(&key, update)?;
    }
    print_notice(editor.notice(), format)?;
    Ok(true)
}

/// Build an update from flags alone; without --type a URL selects sse.
fn prefilled_update(prefilled: PrefilledServer) -> ServerUpdate {
    let server_type = prefilled
        .server_type
        .or_else(|| prefilled.url.as_ref().map(|_| ServerType::Sse));
    ServerUpdate {
        key: prefilled.key,
        server_type,
        command: prefilled.command,
        args: prefilled.args,
        url: prefilled.url,
        env: prefilled.env,
    }
}

fn run_clear(editor: &mut Editor<FileStorage>, yes: bool, format: OutputFormat) -> Result<bool> {
    if editor.store().is_empty() {
        if !matches!(format, OutputFormat::Quiet) {
            println!("No servers to clear.");
        }
        return Ok(true);
    }

    let confirmed = yes
        || dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
            .with_prompt("Are you sure you want to clear all servers? This cannot be undone.")
            .default(false)
            .interact()?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(true);
    }

    editor.clear_all(true)?;
    print_notice(editor.notice(), format)?;
    Ok(true)
}

fn run_arg(editor: &mut Editor<FileStorage>, args: ArgArgs, format: OutputFormat) -> Result<bool> {
    let (key, found) = match args.command {
        ArgSubcommand::Add { key } => {
            let found = editor.add_arg(&key)?;
            (key, found)
        }
        ArgSubcommand::Set { key, index, value } => {
            let found = editor.update_arg(&key, index, &value)?;
            (key, found)
        }
        ArgSubcommand::Remove { key, index } => {
            let found = editor.remove_arg(&key, index)?;
            (key, found)
        }
    };
    if !found {
        anyhow::bail!(
            "No such argument: server '{}' is missing, is not a stdio server, or the index is out of range",
            key
        );
    }
    finish(editor, true, &key, format, "Arguments updated")
}

fn run_env(editor: &mut Editor<FileStorage>, args: EnvArgs, format: OutputFormat) -> Result<bool> {
    let (key, found) = match args.command {
        EnvSubcommand::Add { key } => {
            let added = editor.add_env(&key)?;
            if let Some(name) = &added
                && matches!(format, OutputFormat::Table)
            {
                println!("Added {}", name);
            }
            (key, added.is_some())
        }
        EnvSubcommand::Set {
            key,
            name,
            value,
            rename,
        } => {
            let new_name = rename.as_deref().unwrap_or(&name);
            let found = editor.update_env(&key, &name, new_name, &value)?;
            (key, found)
        }
        EnvSubcommand::Remove { key, name } => {
            let found = editor.remove_env(&key, &name)?;
            if !found && editor.store().get(&key).is_some() {
                anyhow::bail!("Server '{}' has no variable '{}'", key, name);
            }
            (key, found)
        }
    };
    finish(editor, found, &key, format, "Environment updated")
}

fn run_validate(file: &std::path::Path, format: OutputFormat) -> Result<bool> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read config file: {}", file.display()))?;

    let result = check_config_text(&content);

    match format {
        OutputFormat::Table => {
            if result.valid {
                println!("✓ {} is valid", file.display());
            } else {
                println!("✗ {} is invalid:", file.display());
                for error in &result.errors {
                    println!("  - {}", error);
                }
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": file.display().to_string(),
                "valid": result.valid,
                "errors": result.errors,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {
            for error in &result.errors {
                println!("{}", error);
            }
        }
    }

    Ok(result.valid)
}

/// Run the same parse `load` and `add --json` use, so a file reported valid
/// here is one those commands accept.
fn check_config_text(content: &str) -> ValidationResult {
    let errors = match parse_mcp_json(content) {
        Ok(_) => Vec::new(),
        Err(ParseError::Schema { errors }) => errors,
        Err(err @ ParseError::Syntax { .. }) => vec![err.to_string()],
    };
    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// Report the outcome of a silent or keyed mutation.
fn finish(
    editor: &mut Editor<FileStorage>,
    found: bool,
    key: &str,
    format: OutputFormat,
    done: &str,
) -> Result<bool> {
    if !found {
        editor.post(Notice::error(format!("Server '{}' not found", key)));
    } else if editor.notice().is_none() {
        editor.post(Notice::success(done));
    }
    print_notice(editor.notice(), format)?;
    Ok(found)
}

// =============================================================================
// Output
// =============================================================================

fn print_notice(notice: Option<&Notice>, format: OutputFormat) -> Result<()> {
    let Some(notice) = notice else {
        return Ok(());
    };

    match format {
        OutputFormat::Table => match notice.level {
            NoticeLevel::Success => eprintln!("✓ {}", notice),
            NoticeLevel::Warning => eprintln!("  ⚠ {}", notice),
            NoticeLevel::Error => eprintln!("✗ {}", notice),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "level": level_name(notice.level),
                "message": notice.message,
            });
            eprintln!("{}", serde_json::to_string(&output)?);
        }
        OutputFormat::Quiet => {
            if notice.is_error() {
                eprintln!("{}", notice);
            }
        }
    }
    Ok(())
}

fn print_servers(servers: &[ServerEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_server_table(servers),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(servers)?),
        OutputFormat::Quiet => {
            for server in servers {
                println!("{}", server.key);
            }
        }
    }
    Ok(())
}

fn print_server_table(servers: &[ServerEntry]) {
    if servers.is_empty() {
        println!("No servers configured.");
        println!("Add one with: mcped add -i");
        return;
    }

    println!("MCP Servers ({}):", servers.len());
    println!("  {:<20} {:<6} {:<5} {:<4} Target", "Name", "Type", "Args", "Env");
    println!("  {}", "-".repeat(70));

    for server in servers {
        let args = server
            .args()
            .map(|args| args.len().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<20} {:<6} {:<5} {:<4} {}",
            truncate(&server.key, 20),
            server.server_type(),
            args,
            server.env.len(),
            server.summary()
        );
    }
}

fn level_name(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "success",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn parse_server_type(s: &str) -> Result<ServerType, String> {
    ServerType::try_from(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("filesystem", 20), "filesystem");
        assert_eq!(truncate("a-very-long-server-name", 10), "a-very-lo…");
    }

    #[test]
    fn test_url_flag_selects_sse() {
        let update = prefilled_update(PrefilledServer {
            url: Some("https://mcp.example.com/sse".to_string()),
            ..Default::default()
        });
        assert_eq!(update.server_type, Some(ServerType::Sse));
        assert!(prefilled_update(PrefilledServer::default()).is_empty());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from(["mcped", "env", "set", "fs", "KEY_1", "v", "--rename", "ROOT"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Env(EnvArgs {
                command: EnvSubcommand::Set { rename: Some(_), .. }
            })
        ));

        let cli = Cli::try_parse_from(["mcped", "--format", "json", "set", "fs", "--type", "sse"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Set {
                server_type: Some(ServerType::Sse),
                ..
            }
        ));
    }

    #[test]
    fn test_type_flag_wins_over_inference() {
        let update = prefilled_update(PrefilledServer {
            server_type: Some(ServerType::Sse),
            ..Default::default()
        });
        assert_eq!(update.server_type, Some(ServerType::Sse));
        assert!(update.url.is_none());

        let cli = Cli::try_parse_from(["mcped", "add", "--name", "remote", "--type", "sse"]).unwrap();
        let Commands::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.server_type, Some(ServerType::Sse));
    }

    #[test]
    fn test_check_agrees_with_load() {
        let content = r#"{"mcpServers": {"api": {"command": "node", "env": {"PORT": 8080}}}}"#;
        let result = check_config_text(content);
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Server \"api\": \"env.PORT\" must be a string"]);

        let result = check_config_text(r#"{"mcpServers": {"api": {"command": "node"}}}"#);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_check_reports_syntax_errors() {
        let result = check_config_text("{\"mcpServers\": ");
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["mcped", "set", "fs", "--type", "http"]).is_err());
    }
}
