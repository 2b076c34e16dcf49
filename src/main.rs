//! notion-mcp CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use notion_mcp::{
    commands::{
        cmd_scan, cmd_setup, cmd_status, cmd_sync_with_progress, print_scan_report, print_status,
        SetupOptions, SyncResponse,
    },
    config::{Config, ENV_API_KEY, ENV_PARENT_PAGE_ID, ENV_WORKSPACE_ROOT},
    error::{Error, Result},
    mcp::McpServer,
    notion::NotionClient,
    progress::{sync_progress_bar, LogWriterFactory},
    scan::Scanner,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "notion-mcp")]
#[command(version, about = "MCP server that publishes workspace files to Notion", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Workspace to scan (defaults to the current directory)
    #[arg(long, global = true, env = ENV_WORKSPACE_ROOT)]
    workspace_root: Option<PathBuf>,

    /// Notion integration secret
    #[arg(long, global = true, env = ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// Notion page that receives published pages
    #[arg(long, global = true, env = ENV_PARENT_PAGE_ID)]
    parent_page_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio (default)
    Serve,

    /// List the files that would be published
    Scan,

    /// Publish workspace files to Notion
    Sync {
        /// Publish only this file (relative to the workspace root)
        #[arg(long)]
        file: Option<String>,
    },

    /// Show Notion integration status
    Status,

    /// Register this server in the editor's mcp.json
    Setup {
        /// Take values from flags and environment instead of prompting
        #[arg(long)]
        non_interactive: bool,

        /// Print the server entry instead of writing files
        #[arg(long)]
        print_only: bool,

        /// mcp.json to update
        #[arg(long)]
        target: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output and the protocol stream
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory::default()))
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Serve);

    if let Commands::Completions { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "notion-mcp", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Setup {
        non_interactive,
        print_only,
        target,
    } = command
    {
        let workspace_root = match cli.workspace_root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        return cmd_setup(SetupOptions {
            api_key: cli.api_key,
            parent_page_id: cli.parent_page_id,
            workspace_root,
            target,
            non_interactive,
            print_only,
        });
    }

    let mut config = Config::load(cli.config.as_deref())?
        .with_credentials(cli.api_key, cli.parent_page_id);
    if let Some(root) = cli.workspace_root {
        config = config.with_workspace_root(root)?;
    }
    config.validate()?;

    match command {
        Commands::Serve => {
            let server = McpServer::new(config)?;
            server
                .run()
                .await
                .map_err(|e| Error::McpProtocol(e.to_string()))?;
        }

        Commands::Scan => {
            let scanner = Scanner::new(&config)?;
            let report = cmd_scan(&scanner);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_scan_report(&report);
            }
        }

        Commands::Sync { file } => {
            let scanner = Scanner::new(&config)?;
            let client = NotionClient::new(&config)?;

            let mut bar = None;
            let response = cmd_sync_with_progress(
                &config,
                &scanner,
                &client,
                file.as_deref(),
                |entry, total| {
                    let bar = bar.get_or_insert_with(|| sync_progress_bar(total as u64));
                    bar.set_message(entry.file.clone());
                    bar.inc(1);
                },
            )
            .await;
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_sync_response(&response);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Setup { .. } | Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn print_sync_response(response: &SyncResponse) {
    match response {
        SyncResponse::Failed(failure) => {
            println!("✗ {}", failure.error);
        }
        SyncResponse::Page(result) if result.success => match &result.page_url {
            Some(url) => println!("✓ Page created: {}", url),
            None => println!("✓ Page created"),
        },
        SyncResponse::Page(result) => println!(
            "✗ {}",
            result
                .error
                .as_deref()
                .or(result.message.as_deref())
                .unwrap_or("Sync failed")
        ),
        SyncResponse::Batch(batch) => {
            for entry in &batch.results {
                match &entry.result.error {
                    Some(error) if !entry.result.success => {
                        println!("  ✗ {}: {}", entry.file, error)
                    }
                    _ if !entry.result.success => println!("  ✗ {}", entry.file),
                    _ => println!("  ✓ {}", entry.file),
                }
            }
            println!(
                "\n✓ Synced {} files ({} failed)",
                batch.synced,
                response.failures()
            );
        }
    }
}
