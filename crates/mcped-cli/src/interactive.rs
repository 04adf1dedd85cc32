//! Interactive flow for the add command.
//!
//! Collects a server definition when `add -i` is passed.
//! Uses dialoguer for terminal UI prompts.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use mcped_core::mcp::ServerUpdate;
use mcped_core::types::{EnvMap, ServerType};

/// Pre-filled values that skip prompts.
#[derive(Debug, Clone, Default)]
pub struct PrefilledServer {
    pub key: Option<String>,
    pub server_type: Option<ServerType>,
    pub command: Option<String>,
    pub url: Option<String>,
    pub args: Option<Vec<String>>,
    pub env: Option<EnvMap>,
    /// Skip the final confirmation
    pub yes: bool,
}

#[derive(Debug, Clone)]
pub struct InteractiveResult {
    /// Every field of the new entry, key included
    pub update: ServerUpdate,
    pub confirmed: bool,
}

/// Prompts for a complete server entry.
pub struct AddServerFlow<W: Write = io::Stdout> {
    /// Key suggested when none is prefilled
    default_key: String,
    prefilled: PrefilledServer,
    writer: W,
    theme: ColorfulTheme,
}

impl AddServerFlow<io::Stdout> {
    pub fn new(default_key: impl Into<String>, prefilled: PrefilledServer) -> Self {
        Self {
            default_key: default_key.into(),
            prefilled,
            writer: io::stdout(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl<W: Write> AddServerFlow<W> {
    #[cfg(test)]
    pub fn with_writer(
        default_key: impl Into<String>,
        prefilled: PrefilledServer,
        writer: W,
    ) -> Self {
        Self {
            default_key: default_key.into(),
            prefilled,
            writer,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the flow.
    ///
    /// Flow:
    /// 1. Server name
    /// 2. Server type (stdio or sse)
    /// 3. Command and arguments, or URL
    /// 4. Environment variables
    /// 5. Summary and confirm
    pub fn collect(&mut self) -> Result<InteractiveResult> {
        self.print_header()?;

        let key = self.prompt_key()?;
        let server_type = self.prompt_type()?;

        let mut update = ServerUpdate::new()
            .with_key(key)
            .with_type(server_type);

        match server_type {
            ServerType::Stdio => {
                let command = self.prompt_command()?;
                let args = self.prompt_args()?;
                update = update.with_command(command).with_args(args);
            }
            ServerType::Sse => {
                update = update.with_url(self.prompt_url()?);
            }
        }

        update = update.with_env(self.prompt_env()?);

        let confirmed = self.show_summary_and_confirm(&update)?;
        Ok(InteractiveResult { update, confirmed })
    }

    fn print_header(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Add MCP Server").bold().cyan())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn prompt_key(&self) -> Result<String> {
        if let Some(key) = &self.prefilled.key {
            return Ok(key.clone());
        }

        let key: String = Input::with_theme(&self.theme)
            .with_prompt("Server name")
            .default(self.default_key.clone())
            .interact_text()?;
        Ok(key)
    }

    fn prompt_type(&self) -> Result<ServerType> {
        if let Some(server_type) = self.prefilled.server_type {
            return Ok(server_type);
        }
        // A prefilled url implies sse, a prefilled command implies stdio.
        if self.prefilled.url.is_some() {
            return Ok(ServerType::Sse);
        }
        if self.prefilled.command.is_some() {
            return Ok(ServerType::Stdio);
        }

        let options = vec![
            "stdio  - Local process started by the client",
            "sse    - Remote server reached over HTTP",
        ];
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Server type")
            .items(&options)
            .default(0)
            .interact()?;

        Ok(match selection {
            0 => ServerType::Stdio,
            _ => ServerType::Sse,
        })
    }

    fn prompt_command(&self) -> Result<String> {
        if let Some(command) = &self.prefilled.command {
            return Ok(command.clone());
        }

        let command: String = Input::with_theme(&self.theme)
            .with_prompt("Command")
            .interact_text()?;
        Ok(command)
    }

    fn prompt_args(&self) -> Result<Vec<String>> {
        if let Some(args) = &self.prefilled.args {
            return Ok(args.clone());
        }

        let line: String = Input::with_theme(&self.theme)
            .with_prompt("Arguments (space separated, empty for none)")
            .allow_empty(true)
            .interact_text()?;
        Ok(split_args(&line))
    }

    fn prompt_url(&self) -> Result<String> {
        if let Some(url) = &self.prefilled.url {
            return Ok(url.clone());
        }

        let url: String = Input::with_theme(&self.theme)
            .with_prompt("URL")
            .interact_text()?;
        Ok(url)
    }

    fn prompt_env(&self) -> Result<EnvMap> {
        if let Some(env) = &self.prefilled.env {
            return Ok(env.clone());
        }

        let mut env = EnvMap::new();
        loop {
            let pair: String = Input::with_theme(&self.theme)
                .with_prompt("Environment variable KEY=VALUE (empty to finish)")
                .allow_empty(true)
                .interact_text()?;
            if pair.trim().is_empty() {
                break;
            }
            match parse_env_pair(&pair) {
                Ok((name, value)) => {
                    env.insert(name, value);
                }
                Err(err) => eprintln!("  {} {}", style("⚠").yellow(), err),
            }
        }
        Ok(env)
    }

    fn show_summary_and_confirm(&mut self, update: &ServerUpdate) -> Result<bool> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", style("  Summary").bold())?;
        writeln!(self.writer, "  ───────────────────────────")?;

        if let Some(key) = &update.key {
            writeln!(self.writer, "  Name:     {}", style(key).green())?;
        }
        if let Some(server_type) = update.server_type {
            writeln!(self.writer, "  Type:     {}", style(server_type).green())?;
        }
        if let Some(command) = &update.command {
            writeln!(self.writer, "  Command:  {}", style(command).green())?;
        }
        if let Some(args) = &update.args
            && !args.is_empty()
        {
            writeln!(self.writer, "  Args:     {}", style(args.join(" ")).green())?;
        }
        if let Some(url) = &update.url {
            writeln!(self.writer, "  URL:      {}", style(url).green())?;
        }
        if let Some(env) = &update.env
            && !env.is_empty()
        {
            let names: Vec<&str> = env.keys().map(String::as_str).collect();
            writeln!(self.writer, "  Env:      {}", style(names.join(", ")).green())?;
        }

        writeln!(self.writer)?;

        if self.prefilled.yes {
            return Ok(true);
        }

        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt("Add this server?")
            .default(true)
            .interact()?;
        Ok(confirmed)
    }
}

/// Split an argument line on whitespace.
pub fn split_args(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Parse `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    let Some((name, value)) = pair.split_once('=') else {
        anyhow::bail!("Expected KEY=VALUE, got '{}'", pair);
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Environment variable name cannot be empty: '{}'", pair);
    }
    Ok((name.to_string(), value.to_string()))
}
