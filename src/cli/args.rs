//! Command-line argument parsing.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Ask one question; streamed unless `stream` is false
    Ask {
        query: String,
        conversation_id: Option<i64>,
        stream: bool,
    },
    /// Interactive chat, one conversation across questions
    Chat { conversation_id: Option<i64> },
    /// List documents
    Docs,
    Chunks { document_id: i64 },
    Delete { document_id: i64 },
    IngestText { title: String, text: String },
    IngestUrl { title: String, url: String },
    /// Show an ingestion job; `wait` polls until it finishes
    Job { document_id: i64, wait: bool },
    Health,
    Version,
    Help,
    /// Arguments that could not be parsed, with the reason
    Invalid(String),
}

impl CliCommand {
    /// Whether the command watches for Ctrl+C. Other commands keep the
    /// default SIGINT behavior and exit straight away.
    pub fn is_interruptible(&self) -> bool {
        matches!(
            self,
            CliCommand::Ask { stream: true, .. }
                | CliCommand::Chat { .. }
                | CliCommand::Job { wait: true, .. }
        )
    }
}

fn parse_id(value: Option<String>, what: &str) -> Result<i64, String> {
    let value = value.ok_or_else(|| format!("missing {}", what))?;
    value
        .parse()
        .map_err(|_| format!("{} must be an integer, got {:?}", what, value))
}

fn required(value: Option<String>, what: &str) -> Result<String, String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("missing {}", what))
}

/// Parse command-line arguments. The first item is the program name.
///
/// ```
/// use brain_client::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["brain".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    match parse(args.skip(1)) {
        Ok(command) => command,
        Err(reason) => CliCommand::Invalid(reason),
    }
}

fn parse<I>(mut args: I) -> Result<CliCommand, String>
where
    I: Iterator<Item = String>,
{
    let Some(command) = args.next() else {
        return Ok(CliCommand::Help);
    };

    match command.as_str() {
        "--version" | "-V" => Ok(CliCommand::Version),
        "--help" | "-h" | "help" => Ok(CliCommand::Help),
        "health" => Ok(CliCommand::Health),
        "docs" => Ok(CliCommand::Docs),
        "chunks" => Ok(CliCommand::Chunks {
            document_id: parse_id(args.next(), "document id")?,
        }),
        "delete" => Ok(CliCommand::Delete {
            document_id: parse_id(args.next(), "document id")?,
        }),
        "job" => {
            let document_id = parse_id(args.next(), "document id")?;
            let wait = match args.next().as_deref() {
                None => false,
                Some("--wait") => true,
                Some(other) => return Err(format!("unexpected argument {:?}", other)),
            };
            Ok(CliCommand::Job { document_id, wait })
        }
        "ingest-text" => Ok(CliCommand::IngestText {
            title: required(args.next(), "title")?,
            text: required(args.next(), "text")?,
        }),
        "ingest-url" => Ok(CliCommand::IngestUrl {
            title: required(args.next(), "title")?,
            url: required(args.next(), "url")?,
        }),
        "chat" => {
            let parsed = parse_conversation_flags(&mut args)?;
            if !parsed.stream {
                return Err("unexpected argument \"--no-stream\"".to_string());
            }
            if let Some(extra) = parsed.words.first() {
                return Err(format!("unexpected argument {:?}", extra));
            }
            Ok(CliCommand::Chat {
                conversation_id: parsed.conversation_id,
            })
        }
        "ask" => {
            let parsed = parse_conversation_flags(&mut args)?;
            Ok(CliCommand::Ask {
                query: required(Some(parsed.words.join(" ")), "question")?,
                conversation_id: parsed.conversation_id,
                stream: parsed.stream,
            })
        }
        other => Err(format!("unknown command {:?}", other)),
    }
}

struct ConversationArgs {
    conversation_id: Option<i64>,
    stream: bool,
    words: Vec<String>,
}

/// Consume `--conversation <id>` and `--no-stream`; everything else is a
/// positional word.
fn parse_conversation_flags<I>(args: &mut I) -> Result<ConversationArgs, String>
where
    I: Iterator<Item = String>,
{
    let mut parsed = ConversationArgs {
        conversation_id: None,
        stream: true,
        words: Vec::new(),
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--conversation" | "-c" => {
                parsed.conversation_id = Some(parse_id(args.next(), "conversation id")?);
            }
            "--no-stream" => parsed.stream = false,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {:?}", flag)),
            _ => parsed.words.push(arg),
        }
    }
    Ok(parsed)
}
