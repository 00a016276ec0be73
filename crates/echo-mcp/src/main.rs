//! echo-mcp entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use echo_mcp::config::ServerConfig;
use echo_mcp::protocol::ProtocolHandler;
use echo_mcp::tools::ToolRegistry;
use echo_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "echo-mcp",
    about = "Minimal MCP server over Content-Length framed stdio",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default).
    Serve {
        /// Fail if a complete frame does not arrive within this many milliseconds.
        /// Also reads ECHO_MCP_READ_TIMEOUT_MS.
        #[arg(long)]
        read_timeout_ms: Option<u64>,

        /// Largest accepted Content-Length in bytes.
        /// Also reads ECHO_MCP_MAX_CONTENT_LENGTH.
        #[arg(long)]
        max_content_length: Option<usize>,
    },

    /// Print server capabilities as JSON.
    Info,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   echo-mcp completions bash > ~/.local/share/bash-completion/completions/echo-mcp
    ///   echo-mcp completions zsh > ~/.zfunc/_echo-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch an interactive in-process client.
    Repl,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        read_timeout_ms: None,
        max_content_length: None,
    }) {
        Commands::Serve {
            read_timeout_ms,
            max_content_length,
        } => {
            let config = ServerConfig::resolve(read_timeout_ms, max_content_length);
            tracing::info!(
                "echo-mcp v{} serving on stdio ({:?})",
                env!("CARGO_PKG_VERSION"),
                config
            );
            let handler = ProtocolHandler::new(ToolRegistry::builtin());
            let mut transport = StdioTransport::stdio(handler, &config);
            transport.run().await?;
        }

        Commands::Info => {
            let capabilities = echo_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::builtin().list_tools();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "echo-mcp", &mut std::io::stdout());
        }

        Commands::Repl => {
            echo_mcp::repl::run()?;
        }
    }

    Ok(())
}
