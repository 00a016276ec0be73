//! Interactive REPL for the echo MCP server.
//!
//! Launch with `echo-mcp repl`. Commands are turned into JSON-RPC requests and
//! fed to an in-process `ProtocolHandler`, so the session rules (initialize
//! first, method table, tool errors) behave exactly as they do over stdio.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{json, Value};

use crate::protocol::ProtocolHandler;
use crate::tools::ToolRegistry;
use crate::types::{Envelope, JsonRpcRequest, RequestId};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/init", "Send initialize"),
    ("/ping", "Send ping"),
    ("/tools", "Send tools/list"),
    ("/call", "Call a tool: /call <name> [json-arguments]"),
    ("/raw", "Send a raw JSON-RPC payload"),
    ("/shutdown", "Send shutdown"),
    ("/status", "Show session state"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct EchoHelper {
    tool_names: Vec<String>,
}

impl Completer for EchoHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Tool name completion for /call.
        if let Some(args) = input.strip_prefix("/call ") {
            if !args.contains(' ') {
                let prefix_start = input.len() - args.len();
                let matches: Vec<Pair> = self
                    .tool_names
                    .iter()
                    .filter(|name| name.starts_with(args))
                    .map(|name| Pair {
                        display: name.clone(),
                        replacement: format!("{name} "),
                    })
                    .collect();
                return Ok((prefix_start, matches));
            }
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for EchoHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for EchoHelper {}
impl Validator for EchoHelper {}
impl Helper for EchoHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// An in-process client session: a handler plus a request id counter.
pub struct ReplSession {
    handler: ProtocolHandler,
    next_id: i64,
}

impl ReplSession {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler,
            next_id: 1,
        }
    }

    pub fn handler(&self) -> &ProtocolHandler {
        &self.handler
    }

    /// Send a request with the next id and return the response envelope.
    pub fn request(&mut self, method: &str, params: Option<Value>) -> Option<Value> {
        let id = RequestId::from(self.next_id);
        self.next_id += 1;
        let request = JsonRpcRequest::new(id, method, params);
        self.handler.handle_envelope(Envelope {
            jsonrpc: Some(request.jsonrpc),
            id: Some(request.id),
            method: Some(request.method),
            params: request.params,
            ..Envelope::default()
        })
    }

    /// Send text exactly as typed. Notifications and dropped messages yield `None`.
    pub fn raw(&mut self, text: &str) -> Option<Value> {
        self.handler.handle_payload(text.as_bytes())
    }
}

/// Split `/call` arguments into a tool name and its JSON arguments object.
pub fn parse_call_args(args: &str) -> Result<(String, Option<Value>), String> {
    let args = args.trim();
    let (name, rest) = match args.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (args, ""),
    };

    if name.is_empty() {
        return Err("Usage: /call <name> [json-arguments]".to_string());
    }
    if rest.is_empty() {
        return Ok((name.to_string(), None));
    }

    let arguments: Value =
        serde_json::from_str(rest).map_err(|e| format!("Arguments must be JSON: {e}"))?;
    if !arguments.is_object() {
        return Err("Arguments must be a JSON object".to_string());
    }
    Ok((name.to_string(), Some(arguments)))
}

/// Run the interactive REPL.
pub fn run() -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mecho-mcp v{}\x1b[0m \x1b[90m\u{2014} in-process MCP client\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Start with \x1b[36m/init\x1b[0m, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let tools = ToolRegistry::builtin();
    let tool_names = tools.list_tools().into_iter().map(|t| t.name).collect();

    let mut rl: Editor<EchoHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(EchoHelper { tool_names }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".echo_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut session = ReplSession::new(ProtocolHandler::new(tools));
    let prompt = " \x1b[36mmcp>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "status" => cmd_status(&session),
                    "init" => print_response(session.request(
                        "initialize",
                        Some(json!({
                            "protocolVersion": crate::types::MCP_VERSION,
                            "capabilities": {},
                            "clientInfo": { "name": "echo-mcp-repl", "version": env!("CARGO_PKG_VERSION") }
                        })),
                    )),
                    "ping" => print_response(session.request("ping", None)),
                    "tools" => print_response(session.request("tools/list", None)),
                    "shutdown" => print_response(session.request("shutdown", None)),
                    "call" => match parse_call_args(args) {
                        Ok((name, arguments)) => print_response(session.request(
                            "tools/call",
                            Some(json!({ "name": name, "arguments": arguments })),
                        )),
                        Err(e) => eprintln!("  {e}"),
                    },
                    "raw" => {
                        if args.is_empty() {
                            eprintln!("  Usage: /raw <json>");
                        } else {
                            print_response(session.raw(args));
                        }
                    }
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn print_response(response: Option<Value>) {
    match response {
        Some(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_else(|e| e.to_string());
            println!("{text}");
        }
        None => eprintln!("  \x1b[90m(no response)\x1b[0m"),
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Example: /call echo {{\"text\":\"hello\"}}");
    eprintln!();
}

fn cmd_status(session: &ReplSession) {
    let handler = session.handler();
    eprintln!();
    eprintln!("  Session: {:?}", handler.session().state());
    if let Some(client) = handler.session().client() {
        eprintln!("  Client:  {} v{}", client.name, client.version);
    }
    eprintln!("  Tools:   {}", handler.tools().len());
    eprintln!();
}
