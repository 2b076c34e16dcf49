//! Setup command implementation
//!
//! Registers this server in the editor's user `mcp.json` and writes a `.env`
//! backup of the credentials into the workspace.

use crate::config::{ENV_API_KEY, ENV_PARENT_PAGE_ID, ENV_WORKSPACE_ROOT};
use crate::error::{Error, Result};
use crossterm::event::{self, Event, KeyCode};
use crossterm::{cursor, execute, terminal};
use serde_json::{json, Map, Value};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Key of this server inside `mcpServers`
pub const SERVER_KEY: &str = "notion";

#[derive(Debug, Clone)]
pub struct SetupOptions {
    pub api_key: Option<String>,
    pub parent_page_id: Option<String>,
    pub workspace_root: PathBuf,
    /// `mcp.json` to update; defaults to the editor's user config
    pub target: Option<PathBuf>,
    pub non_interactive: bool,
    pub print_only: bool,
}

/// Values written by the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSettings {
    pub api_key: String,
    pub parent_page_id: String,
    pub workspace_root: String,
}

/// Run the setup wizard
pub fn cmd_setup(options: SetupOptions) -> Result<()> {
    let interactive = resolve_interactive(io::stdin().is_terminal(), options.non_interactive)?;

    let settings = if interactive {
        match run_setup_wizard(&options)? {
            Some(settings) => settings,
            None => {
                println!("Setup cancelled.");
                return Ok(());
            }
        }
    } else {
        settings_from_options(&options)?
    };

    if !api_key_looks_valid(&settings.api_key) {
        warn!("API key should start with 'secret_' or 'ntn_'");
    }

    let command = std::env::current_exe()?;
    let entry = server_entry(&command, &settings);

    let target = options.target.clone().or_else(default_mcp_config_path);
    match target {
        Some(path) if !options.print_only => {
            write_mcp_config(&path, entry)?;
            println!("✓ Configuration saved to: {}", path.display());
        }
        _ => {
            if !options.print_only {
                println!("⚠ Could not determine the MCP config path for this platform");
            }
            println!("Add this to your mcp.json:");
            let snippet = json!({ "mcpServers": { SERVER_KEY: entry } });
            println!("{}", serde_json::to_string_pretty(&snippet)?);
        }
    }

    if !options.print_only {
        let env_path = write_env_file(Path::new(&settings.workspace_root), &settings)?;
        println!("✓ Environment backup saved to: {}", env_path.display());
        println!("  Keep this file out of version control.");
    }

    println!("\nNext steps:");
    println!("  1. Restart your editor so it picks up the MCP server");
    println!("  2. Ask your agent to scan the workspace or check Notion status");
    println!("  3. Ask it to sync files to Notion");

    Ok(())
}

fn resolve_interactive(is_tty: bool, non_interactive: bool) -> Result<bool> {
    if !is_tty && !non_interactive {
        return Err(Error::Config(
            "stdin is not a TTY. Use --non-interactive with NOTION_API_KEY and NOTION_PARENT_PAGE_ID set.".to_string(),
        ));
    }
    Ok(is_tty && !non_interactive)
}

fn settings_from_options(options: &SetupOptions) -> Result<SetupSettings> {
    let api_key = options
        .api_key
        .clone()
        .ok_or_else(|| Error::Config(format!("{} is required", ENV_API_KEY)))?;
    let parent_page_id = options
        .parent_page_id
        .clone()
        .ok_or_else(|| Error::Config(format!("{} is required", ENV_PARENT_PAGE_ID)))?;

    Ok(SetupSettings {
        api_key,
        parent_page_id,
        workspace_root: options.workspace_root.display().to_string(),
    })
}

fn run_setup_wizard(options: &SetupOptions) -> Result<Option<SetupSettings>> {
    println!("\nNOTION MCP INTEGRATION SETUP\n");

    println!("Step 1: Notion internal integration secret");
    println!("Get this from: https://www.notion.so/my-integrations");
    let api_key = prompt_string(
        "NOTION_API_KEY",
        options.api_key.as_deref().unwrap_or(""),
        |v| {
            if v.is_empty() {
                Err("The API key is required.".to_string())
            } else {
                Ok(())
            }
        },
    )?;
    if !api_key_looks_valid(&api_key) {
        println!("⚠ API key should start with 'secret_' or 'ntn_'");
    }

    println!("\nStep 2: Parent page");
    println!("Copy the id from the page URL: https://notion.so/<workspace>/<title>-<PAGE_ID>");
    let parent_page_id = prompt_string(
        "NOTION_PARENT_PAGE_ID",
        options.parent_page_id.as_deref().unwrap_or(""),
        |v| {
            if v.is_empty() {
                Err("The parent page id is required.".to_string())
            } else {
                Ok(())
            }
        },
    )?;

    println!("\nStep 3: Workspace root");
    let default_root = options.workspace_root.display().to_string();
    let workspace_root = prompt_string("WORKSPACE_ROOT", &default_root, |v| {
        if Path::new(v).is_dir() {
            Ok(())
        } else {
            Err(format!("{} is not a directory.", v))
        }
    })?;

    let settings = SetupSettings {
        api_key,
        parent_page_id,
        workspace_root,
    };

    println!("\nCONFIGURATION SUMMARY");
    println!("API key: {}", redact(&settings.api_key));
    println!("Parent page: {}", redact(&settings.parent_page_id));
    println!("Workspace: {}", settings.workspace_root);

    if prompt_confirm("Proceed with setup?", true)? {
        Ok(Some(settings))
    } else {
        Ok(None)
    }
}

fn api_key_looks_valid(key: &str) -> bool {
    key.starts_with("secret_") || key.starts_with("ntn_")
}

fn redact(value: &str) -> String {
    format!("{}...", value.chars().take(8).collect::<String>())
}

/// Editor user configuration, e.g. `~/.config/Code/User/mcp.json` on Linux
pub fn default_mcp_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Code").join("User").join("mcp.json"))
}

/// The `mcpServers` entry that launches this binary
pub fn server_entry(command: &Path, settings: &SetupSettings) -> Value {
    json!({
        "command": command.display().to_string(),
        "args": ["serve"],
        "env": {
            ENV_API_KEY: settings.api_key,
            ENV_PARENT_PAGE_ID: settings.parent_page_id,
            ENV_WORKSPACE_ROOT: settings.workspace_root,
        }
    })
}

/// Insert `entry` under `mcpServers.notion`, keeping every other key
pub fn merge_server_entry(existing: Value, entry: Value) -> Value {
    let mut root = match existing {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let servers = root
        .entry("mcpServers")
        .or_insert_with(|| Value::Object(Map::new()));
    if !servers.is_object() {
        *servers = Value::Object(Map::new());
    }
    if let Value::Object(servers) = servers {
        servers.insert(SERVER_KEY.to_string(), entry);
    }

    Value::Object(root)
}

/// Merge the entry into the `mcp.json` at `path`, creating it if needed
pub fn write_mcp_config(path: &Path, entry: Value) -> Result<()> {
    let existing = if path.exists() {
        match std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|content| serde_json::from_str::<Value>(&content).map_err(Error::from))
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not read existing config {}: {}", path.display(), e);
                Value::Null
            }
        }
    } else {
        Value::Null
    };

    let merged = merge_server_entry(existing, entry);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&merged)?)?;
    info!("Wrote MCP config to {}", path.display());
    Ok(())
}

pub fn render_env_file(settings: &SetupSettings) -> String {
    format!(
        "# Notion MCP Integration\n{}={}\n{}={}\n{}={}\n",
        ENV_API_KEY,
        settings.api_key,
        ENV_PARENT_PAGE_ID,
        settings.parent_page_id,
        ENV_WORKSPACE_ROOT,
        settings.workspace_root
    )
}

/// Write `<workspace_root>/.env`
pub fn write_env_file(workspace_root: &Path, settings: &SetupSettings) -> Result<PathBuf> {
    let path = workspace_root.join(".env");
    std::fs::write(&path, render_env_file(settings))?;
    info!("Wrote environment backup to {}", path.display());
    Ok(path)
}

fn prompt_confirm(label: &str, default: bool) -> Result<bool> {
    let options = ["Yes", "No"];
    let default_index = if default { 0 } else { 1 };
    Ok(prompt_select(label, &options, default_index)? == 0)
}

fn prompt_select(label: &str, options: &[&str], default_index: usize) -> Result<usize> {
    let mut stdout = io::stdout();
    let mut selected = default_index.min(options.len().saturating_sub(1));
    let _raw_mode = RawModeGuard::new()?;

    loop {
        execute!(
            stdout,
            terminal::Clear(terminal::ClearType::FromCursorDown),
            cursor::MoveToColumn(0)
        )?;
        write!(stdout, "{}\r\n", label)?;
        for (idx, option) in options.iter().enumerate() {
            let marker = if idx == selected { ">" } else { " " };
            write!(stdout, "{} {}\r\n", marker, option)?;
        }
        stdout.flush()?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Up if selected > 0 => selected -= 1,
                KeyCode::Down if selected + 1 < options.len() => selected += 1,
                KeyCode::Enter => return Ok(selected),
                KeyCode::Esc => return Ok(options.len().saturating_sub(1)),
                _ => {}
            }
        }

        execute!(stdout, cursor::MoveUp(options.len() as u16 + 1))?;
    }
}

fn prompt_string<F>(label: &str, default: &str, validate: F) -> Result<String>
where
    F: Fn(&str) -> std::result::Result<(), String>,
{
    loop {
        if default.is_empty() {
            print!("{}: ", label);
        } else {
            print!("{} [{}]: ", label, default);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(Error::Other("Setup cancelled".to_string()));
        }
        let value = input.trim();
        let value = if value.is_empty() { default } else { value };

        if let Err(message) = validate(value) {
            println!("{}", message);
            continue;
        }
        return Ok(value.to_string());
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> SetupSettings {
        SetupSettings {
            api_key: "secret_abc".to_string(),
            parent_page_id: "page-123".to_string(),
            workspace_root: "/srv/ws".to_string(),
        }
    }

    #[test]
    fn test_resolve_interactive_requires_tty() {
        assert!(resolve_interactive(false, false).is_err());
        assert!(!resolve_interactive(false, true).unwrap());
        assert!(resolve_interactive(true, false).unwrap());
    }

    #[test]
    fn test_non_interactive_requires_credentials() {
        let mut options = SetupOptions {
            api_key: Some("secret_abc".to_string()),
            parent_page_id: None,
            workspace_root: PathBuf::from("/srv/ws"),
            target: None,
            non_interactive: true,
            print_only: true,
        };
        assert!(settings_from_options(&options).is_err());

        options.parent_page_id = Some("page-123".to_string());
        assert_eq!(settings_from_options(&options).unwrap(), settings());
    }

    #[test]
    fn test_api_key_prefixes() {
        assert!(api_key_looks_valid("secret_abc"));
        assert!(api_key_looks_valid("ntn_abc"));
        assert!(!api_key_looks_valid("abc"));
    }

    #[test]
    fn test_server_entry_shape() {
        let entry = server_entry(Path::new("/usr/local/bin/notion-mcp"), &settings());
        assert_eq!(
            entry,
            json!({
                "command": "/usr/local/bin/notion-mcp",
                "args": ["serve"],
                "env": {
                    "NOTION_API_KEY": "secret_abc",
                    "NOTION_PARENT_PAGE_ID": "page-123",
                    "WORKSPACE_ROOT": "/srv/ws"
                }
            })
        );
    }

    #[test]
    fn test_merge_keeps_other_servers() {
        let existing = json!({
            "mcpServers": {
                "github": {"command": "gh-mcp"},
                "notion": {"command": "old"}
            },
            "inputs": []
        });

        let merged = merge_server_entry(existing, json!({"command": "new"}));

        assert_eq!(merged["mcpServers"]["github"], json!({"command": "gh-mcp"}));
        assert_eq!(merged["mcpServers"]["notion"], json!({"command": "new"}));
        assert_eq!(merged["inputs"], json!([]));
    }

    #[test]
    fn test_merge_replaces_invalid_shapes() {
        let merged = merge_server_entry(json!([1, 2]), json!({"command": "new"}));
        assert_eq!(merged, json!({"mcpServers": {"notion": {"command": "new"}}}));

        let merged = merge_server_entry(json!({"mcpServers": "oops"}), json!({"command": "new"}));
        assert_eq!(merged, json!({"mcpServers": {"notion": {"command": "new"}}}));
    }

    #[test]
    fn test_write_mcp_config_creates_and_merges() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Code").join("User").join("mcp.json");

        write_mcp_config(&path, json!({"command": "first"})).unwrap();
        let mut value: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["mcpServers"]["other"] = json!({"command": "other"});
        std::fs::write(&path, value.to_string()).unwrap();

        write_mcp_config(&path, json!({"command": "second"})).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mcpServers"]["notion"], json!({"command": "second"}));
        assert_eq!(value["mcpServers"]["other"], json!({"command": "other"}));
    }

    #[test]
    fn test_write_mcp_config_replaces_unreadable_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mcp.json");
        std::fs::write(&path, "{ not json").unwrap();

        write_mcp_config(&path, json!({"command": "new"})).unwrap();
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, json!({"mcpServers": {"notion": {"command": "new"}}}));
    }

    #[test]
    fn test_env_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_env_file(tmp.path(), &settings()).unwrap();

        assert_eq!(path, tmp.path().join(".env"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "# Notion MCP Integration\nNOTION_API_KEY=secret_abc\nNOTION_PARENT_PAGE_ID=page-123\nWORKSPACE_ROOT=/srv/ws\n"
        );
    }
}
