//! Interactive Shell
//!
//! Line parsing and tab completion behind the CLI's interactive mode.
//!
//! ## Line Format
//! ```text
//! node_exists NODE
//! attr_exists NODE KEY TYPE
//! get         NODE KEY TYPE
//! put         NODE KEY TYPE VALUE
//! children    NODE
//! attributes  NODE
//! types       NODE KEY
//! dump        [NODE] [--json]
//! exit | quit
//! ```
//!
//! Completion works on whole lines: every candidate is the input line with
//! its last, partial word replaced, so a line editor can swap it in as is.

use crate::client::Client;
use crate::error::{ConfTreeError, Result};
use crate::protocol::{path_components, Request, ValueType};
use crate::transport::DuplexStream;

/// Actions offered by completion, in the order they are listed
pub const ACTIONS: [&str; 10] = [
    "node_exists",
    "attr_exists",
    "get",
    "put",
    "children",
    "attributes",
    "types",
    "dump",
    "exit",
    "quit",
];

/// Most words a line can hold (`put NODE KEY TYPE VALUE`)
const MAX_WORDS: usize = 5;

/// A parsed shell line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Send the request and print the answer
    Query(Request),

    /// Check the value against its type, then write it
    Put {
        node_path: String,
        key: String,
        value_type: ValueType,
        value: String,
    },

    /// Discover and print the subtree below a node
    Dump { node_path: String, json: bool },

    /// Leave the shell
    Quit,
}

fn usage(message: &str) -> ConfTreeError {
    ConfTreeError::Config(message.to_string())
}

fn node_param<'a>(params: &[&'a str], max: usize) -> Result<&'a str> {
    if params.len() > max {
        return Err(usage("too many parameters for command"));
    }
    params.first().copied().ok_or_else(|| usage("missing node parameter"))
}

fn key_param<'a>(params: &[&'a str]) -> Result<&'a str> {
    params.get(1).copied().ok_or_else(|| usage("missing key parameter"))
}

fn type_param(params: &[&str]) -> Result<ValueType> {
    let name = params.get(2).copied().ok_or_else(|| usage("missing type parameter"))?;
    match ValueType::from_name(name) {
        ValueType::Unknown => Err(usage("invalid type parameter")),
        value_type => Ok(value_type),
    }
}

/// Parse one line typed at the prompt
///
/// Dashed action names (`node-exists`) are accepted as well.
pub fn parse_line(line: &str) -> Result<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() > MAX_WORDS {
        return Err(usage("command is made up of too many parts"));
    }

    let Some((&action, params)) = words.split_first() else {
        return Err(usage("empty command"));
    };

    let command = match action.replace('-', "_").as_str() {
        "node_exists" => Command::Query(Request::node_exists(node_param(params, 1)?)),
        "attr_exists" => Command::Query(Request::attr_exists(
            node_param(params, 3)?,
            key_param(params)?,
            type_param(params)?,
        )),
        "get" => Command::Query(Request::get(
            node_param(params, 3)?,
            key_param(params)?,
            type_param(params)?,
        )),
        "put" => Command::Put {
            node_path: node_param(params, 4)?.to_string(),
            key: key_param(params)?.to_string(),
            value_type: type_param(params)?,
            value: params
                .get(3)
                .map(|value| value.to_string())
                .ok_or_else(|| usage("missing value parameter"))?,
        },
        "children" => Command::Query(Request::get_children(node_param(params, 1)?)),
        "attributes" => Command::Query(Request::get_attributes(node_param(params, 1)?)),
        "types" => Command::Query(Request::get_types(node_param(params, 2)?, key_param(params)?)),
        "dump" => parse_dump(params)?,
        "exit" | "quit" if params.is_empty() => Command::Quit,
        "exit" | "quit" => return Err(usage("too many parameters for command")),
        _ => return Err(usage("unknown command")),
    };

    Ok(command)
}

fn parse_dump(params: &[&str]) -> Result<Command> {
    let mut node_path = None;
    let mut json = false;

    for &param in params {
        match param {
            "--json" if !json => json = true,
            _ if node_path.is_none() && !param.starts_with("--") => {
                node_path = Some(param.to_string())
            }
            _ => return Err(usage("too many parameters for command")),
        }
    }

    Ok(Command::Dump {
        node_path: node_path.unwrap_or_else(|| "/".to_string()),
        json,
    })
}

// =============================================================================
// Completion
// =============================================================================

/// Candidate lines for the partially typed `line`
///
/// Node, key, type and value positions ask the server, one request per
/// call. Remote errors and unusable listings give no candidates; only
/// failures of the connection itself are returned as errors.
pub fn complete<S: DuplexStream>(client: &mut Client<S>, line: &str) -> Result<Vec<String>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() > MAX_WORDS {
        return Ok(Vec::new());
    }

    // Words confirmed by a following space
    let finished = line.ends_with(char::is_whitespace);
    let depth = if finished { words.len() } else { words.len().saturating_sub(1) };
    let partial = if finished { "" } else { words.last().copied().unwrap_or_default() };
    let prefix = &line[..line.len() - partial.len()];

    if depth == 0 {
        return Ok(ACTIONS
            .iter()
            .filter(|action| action.starts_with(partial))
            .map(|action| format!("{}{} ", prefix, action))
            .collect());
    }

    let max_depth = match words[0].replace('-', "_").as_str() {
        "node_exists" | "children" | "attributes" | "dump" => 1,
        "types" => 2,
        "attr_exists" | "get" => 3,
        "put" => 4,
        _ => return Ok(Vec::new()),
    };
    if depth > max_depth {
        return Ok(Vec::new());
    }

    match depth {
        1 => complete_node(client, prefix, partial),
        2 => complete_key(client, prefix, words[1], partial),
        3 => complete_type(client, prefix, words[1], words[2], partial),
        _ => complete_value(client, prefix, words[1], words[2], words[3], partial),
    }
}

fn starts_with_ignore_case(name: &str, stem: &str) -> bool {
    name.get(..stem.len()).is_some_and(|head| head.eq_ignore_ascii_case(stem))
}

fn complete_node<S: DuplexStream>(
    client: &mut Client<S>,
    prefix: &str,
    partial: &str,
) -> Result<Vec<String>> {
    if partial.is_empty() {
        return Ok(vec![format!("{}/", prefix)]);
    }

    // Children of the last complete node in the partial path
    let Some(split) = partial.rfind('/') else {
        return Ok(Vec::new());
    };
    let (parent, stem) = partial.split_at(split + 1);
    if path_components(parent).is_none() {
        return Ok(Vec::new());
    }

    Ok(client
        .children(parent)?
        .into_iter()
        .filter(|name| starts_with_ignore_case(name, stem))
        .map(|name| format!("{}{}{}/", prefix, parent, name))
        .collect())
}

fn complete_key<S: DuplexStream>(
    client: &mut Client<S>,
    prefix: &str,
    node_path: &str,
    partial: &str,
) -> Result<Vec<String>> {
    Ok(client
        .attributes(node_path)?
        .into_iter()
        .filter(|key| starts_with_ignore_case(key, partial))
        .map(|key| format!("{}{} ", prefix, key))
        .collect())
}

fn complete_type<S: DuplexStream>(
    client: &mut Client<S>,
    prefix: &str,
    node_path: &str,
    key: &str,
    partial: &str,
) -> Result<Vec<String>> {
    Ok(client
        .types(node_path, key)?
        .into_iter()
        .filter(|name| starts_with_ignore_case(name, partial))
        .map(|name| format!("{}{} ", prefix, name))
        .collect())
}

fn complete_value<S: DuplexStream>(
    client: &mut Client<S>,
    prefix: &str,
    node_path: &str,
    key: &str,
    type_name: &str,
    partial: &str,
) -> Result<Vec<String>> {
    let value_type = ValueType::from_name(type_name);
    if value_type == ValueType::Unknown {
        return Ok(Vec::new());
    }

    if !partial.is_empty() {
        if value_type != ValueType::Bool {
            return Ok(Vec::new());
        }
        return Ok(["true", "false"]
            .iter()
            .filter(|word| word.starts_with(partial))
            .map(|word| format!("{}{}", prefix, word))
            .collect());
    }

    let Some(current) = client.get(node_path, key, value_type)? else {
        return Ok(Vec::new());
    };

    let mut candidates = vec![format!("{}{}", prefix, current)];
    if value_type == ValueType::Bool {
        let inverse = if current == "true" { "false" } else { "true" };
        candidates.push(format!("{}{}", prefix, inverse));
    }
    Ok(candidates)
}

/// Steps through candidates on repeated Tab presses
///
/// While the input still equals the last candidate handed out, the next
/// one is returned; any other input asks `refresh` for a new list. A
/// single candidate never cycles, so a completed node path can be
/// completed further.
#[derive(Debug, Default)]
pub struct CandidateCycle {
    candidates: Vec<String>,
    index: usize,
}

impl CandidateCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate to show for `input`
    pub fn next(&mut self, input: &str, refresh: impl FnOnce() -> Vec<String>) -> Option<String> {
        let cycling = self.candidates.len() > 1
            && self.candidates.get(self.index).is_some_and(|shown| shown == input);

        if cycling {
            self.index = (self.index + 1) % self.candidates.len();
        } else {
            self.candidates = refresh();
            self.index = 0;
        }
        self.candidates.get(self.index).cloned()
    }
}
