//! conftree CLI Client
//!
//! Command-line interface for inspecting and editing a remote configuration tree.
//! Without a subcommand it opens an interactive shell on one connection.

use std::cell::RefCell;

use clap::{Parser, Subcommand};
use conftree::protocol::Request;
use conftree::shell::{self, CandidateCycle, Command};
use conftree::{discover_from, set_value_text, Client, Config, ConfigNode, Response, ValueType, WriteOutcome};
use dialoguer::{BasicHistory, Completion, Input};
use tracing_subscriber::{fmt, EnvFilter};

/// conftree CLI
#[derive(Parser, Debug)]
#[command(name = "conftree-cli")]
#[command(about = "CLI for a conftree configuration server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = conftree::config::DEFAULT_PORT)]
    port: u16,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Command to run; omit it for the interactive shell
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether a node exists
    NodeExists {
        /// Node path, e.g. /sensor/
        node: String,
    },

    /// Check whether an attribute of a given type exists
    AttrExists {
        node: String,
        key: String,
        #[arg(value_parser = parse_type)]
        r#type: ValueType,
    },

    /// Get the current value of an attribute
    Get {
        node: String,
        key: String,
        #[arg(value_parser = parse_type)]
        r#type: ValueType,
    },

    /// Set the value of an existing attribute
    Put {
        node: String,
        key: String,
        #[arg(value_parser = parse_type)]
        r#type: ValueType,
        value: String,
    },

    /// List child nodes
    Children { node: String },

    /// List attribute keys
    Attributes { node: String },

    /// List the types available for a key
    Types { node: String, key: String },

    /// Print the whole tree below a node
    Dump {
        #[arg(default_value = "/")]
        node: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::NodeExists { node } => Command::Query(Request::node_exists(&node)),
            Commands::AttrExists { node, key, r#type } => {
                Command::Query(Request::attr_exists(&node, &key, r#type))
            }
            Commands::Get { node, key, r#type } => Command::Query(Request::get(&node, &key, r#type)),
            Commands::Put { node, key, r#type, value } => Command::Put {
                node_path: node,
                key,
                value_type: r#type,
                value,
            },
            Commands::Children { node } => Command::Query(Request::get_children(&node)),
            Commands::Attributes { node } => Command::Query(Request::get_attributes(&node)),
            Commands::Types { node, key } => Command::Query(Request::get_types(&node, &key)),
            Commands::Dump { node, json } => Command::Dump { node_path: node, json },
        }
    }
}

fn parse_type(name: &str) -> Result<ValueType, String> {
    match ValueType::from_name(name) {
        ValueType::Unknown => Err(format!(
            "unknown type '{}' (expected bool, byte, short, int, long, float, double or string)",
            name
        )),
        value_type => Ok(value_type),
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let config = Config::builder()
        .server(&args.host, args.port)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut client = match Client::connect_with(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Some(command) => {
            let outcome = run(&mut client, command.into());
            client.disconnect();
            outcome
        }
        None => interactive(client, &config.server_addr),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Execute one command; `Ok(false)` means the server refused it
fn run(client: &mut Client, command: Command) -> conftree::Result<bool> {
    match command {
        Command::Query(request) => print_response(&client.execute(&request)?),
        Command::Put { node_path, key, value_type, value } => {
            match set_value_text(client, &node_path, &key, value_type, &value)? {
                WriteOutcome::Applied => {
                    println!("ok");
                    Ok(true)
                }
                WriteOutcome::Rejected(message) => {
                    eprintln!("Rejected: {}", message);
                    Ok(false)
                }
            }
        }
        Command::Dump { node_path, json } => {
            let tree = discover_from(client, &node_path)?;
            if json {
                let text = serde_json::to_string_pretty(&tree)
                    .map_err(|e| conftree::ConfTreeError::Serialization(e.to_string()))?;
                println!("{}", text);
            } else {
                print_tree(&tree);
            }
            Ok(true)
        }
        Command::Quit => Ok(true),
    }
}

// =============================================================================
// Interactive Shell
// =============================================================================

/// Tab completion backed by the shell's own connection
struct ShellCompletion<'a> {
    client: &'a RefCell<Client>,
    cycle: RefCell<CandidateCycle>,
}

impl Completion for ShellCompletion<'_> {
    fn get(&self, input: &str) -> Option<String> {
        self.cycle.borrow_mut().next(input, || {
            shell::complete(&mut *self.client.borrow_mut(), input).unwrap_or_else(|e| {
                tracing::debug!("Completion for '{}' failed: {}", input, e);
                Vec::new()
            })
        })
    }
}

/// Read commands until `exit`, end of input or a lost connection
fn interactive(client: Client, server_addr: &str) -> conftree::Result<bool> {
    let prompt = format!("conftree @ {}", server_addr);
    let client = RefCell::new(client);
    let completion = ShellCompletion {
        client: &client,
        cycle: RefCell::new(CandidateCycle::new()),
    };
    let mut history = BasicHistory::new().max_entries(256).no_duplicates(true);

    let outcome = loop {
        let line = match Input::<String>::new()
            .with_prompt(prompt.as_str())
            .allow_empty(true)
            .completion_with(&completion)
            .history_with(&mut history)
            .interact_text()
        {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!("Prompt closed: {}", e);
                break Ok(true);
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let command = match shell::parse_line(&line) {
            Ok(Command::Quit) => break Ok(true),
            Ok(command) => command,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        match run(&mut client.borrow_mut(), command) {
            Ok(_) => {}
            Err(e) if e.is_connection_error() => break Err(e),
            Err(e) => eprintln!("Error: {}", e),
        }
    };

    drop(completion);
    client.into_inner().disconnect();
    outcome
}

fn print_response(response: &Response) -> conftree::Result<bool> {
    if response.is_error() {
        eprintln!("Error from server: {}", response.message);
        return Ok(false);
    }

    if response.is_listing() {
        for name in response.names() {
            println!("{}", name);
        }
    } else {
        println!("{}", response.message);
    }
    Ok(true)
}

fn print_tree(root: &ConfigNode) {
    let base_depth = root.path.matches('/').count();

    for node in root.iter() {
        let depth = node.path.matches('/').count() - base_depth;
        let indent = "  ".repeat(depth);
        let label = if node.name.is_empty() { node.path.as_str() } else { node.name.as_str() };

        println!("{}{}/", indent, label.trim_end_matches('/'));
        for attr in &node.attributes {
            println!("{}  {} ({}) = {}", indent, attr.key, attr.value_type, attr.value);
        }
    }
}
