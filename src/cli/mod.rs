//! CLI for the second-brain client.
//!
//! - Argument parsing
//! - Version display
//! - Ctrl+C to cancel a streaming answer
//! - Rendering of answers, documents and jobs
//!
//! ```ignore
//! use brain_client::cli::{parse_args, run_cli_command, Interrupt};
//!
//! let command = parse_args(std::env::args());
//! run_cli_command(command, &client, &Interrupt::install()).await?;
//! ```

pub mod args;
pub mod interrupt;
pub mod output;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use interrupt::Interrupt;
pub use version::{handle_version_command, VERSION};

use std::io::{self, Write};
use std::time::Duration;

use color_eyre::eyre::bail;
use color_eyre::{Report, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::answer::ChatTranscript;
use crate::client::BrainClient;
use crate::error::StreamError;
use crate::models::{ChatRequest, IngestTextRequest, IngestUrlRequest};
use output::{format_chunks, format_citations, format_documents, format_job, PrintingHandler};

const JOB_POLL_INTERVAL: Duration = Duration::from_millis(1500);

pub const USAGE: &str = "\
Usage: brain <command> [args]

Commands:
  ask <question> [--conversation <id>] [--no-stream]
  chat [--conversation <id>]        interactive chat, Ctrl+C stops an answer
  docs                              list documents
  chunks <document-id>              show a document's chunks
  delete <document-id>
  ingest-text <title> <text>
  ingest-url <title> <url>
  job <document-id> [--wait]        ingestion progress
  health

Environment:
  BRAIN_API_BASE      backend URL (default http://localhost:8000)
  BRAIN_TIMEOUT_SECS  timeout for non-streaming requests (default 30)
  RUST_LOG            log filter, e.g. brain_client=debug";

/// Ask one question, printing the answer as it streams. Returns the
/// transcript, with the conversation id to continue from.
pub async fn ask_streaming(
    client: &BrainClient,
    transcript: ChatTranscript,
    query: &str,
    interrupt: &Interrupt,
) -> Result<ChatTranscript> {
    let request = ChatRequest::new(query).with_conversation(transcript.conversation_id());
    let mut handler = PrintingHandler::new(transcript, io::stdout());
    handler.transcript_mut().begin();

    let token = interrupt.fresh();
    let outcome = client.chat_stream(&request, &mut handler, Some(&token)).await;
    let (transcript, _) = handler.into_parts();

    match outcome {
        Ok(summary) => {
            debug!(tokens = summary.tokens, "Answer complete");
            if !transcript.citations().is_empty() {
                println!("\n{}", format_citations(transcript.citations()));
            }
            Ok(transcript)
        }
        Err(StreamError::Cancelled) => {
            println!("[stopped]");
            Ok(transcript)
        }
        Err(err) => {
            let message = err.user_message();
            Err(Report::new(err).wrap_err(message))
        }
    }
}

async fn ask_buffered(client: &BrainClient, query: &str, conversation_id: Option<i64>) -> Result<()> {
    let request = ChatRequest::new(query).with_conversation(conversation_id);
    let response = client.chat(&request).await?;
    println!("{}", response.answer.trim());
    if !response.citations.is_empty() {
        println!("\n{}", format_citations(&response.citations));
    }
    println!("\n(conversation {})", response.conversation_id);
    Ok(())
}

async fn chat_loop(
    client: &BrainClient,
    conversation_id: Option<i64>,
    interrupt: &Interrupt,
) -> Result<()> {
    let mut transcript = match conversation_id {
        Some(id) => ChatTranscript::in_conversation(id),
        None => ChatTranscript::new(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Ask anything. Empty line or Ctrl+D quits, Ctrl+C stops an answer.");
    loop {
        print!("> ");
        io::stdout().flush()?;

        let token = interrupt.fresh();
        let line = tokio::select! {
            _ = token.cancelled() => None,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        transcript = ask_streaming(client, transcript, query, interrupt).await?;
        if let Some(id) = transcript.conversation_id() {
            debug!(conversation_id = id, "Continuing conversation");
        }
    }

    println!();
    Ok(())
}

async fn watch_job(client: &BrainClient, document_id: i64, wait: bool, interrupt: &Interrupt) -> Result<()> {
    let token = interrupt.fresh();
    loop {
        let job = client.job_status(document_id).await?;
        println!("{}", format_job(&job));
        if !wait || job.is_finished() {
            return Ok(());
        }
        tokio::select! {
            _ = token.cancelled() => return Ok(()),
            _ = tokio::time::sleep(JOB_POLL_INTERVAL) => {}
        }
    }
}

/// Execute a parsed command.
///
/// `Version` prints and exits the process.
pub async fn run_cli_command(command: CliCommand, client: &BrainClient, interrupt: &Interrupt) -> Result<()> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => println!("{}", USAGE),
        CliCommand::Invalid(reason) => bail!("{}\n\n{}", reason, USAGE),
        CliCommand::Health => {
            let health = client.health().await?;
            println!("{} ({})", health.status, client.base_url());
        }
        CliCommand::Ask {
            query,
            conversation_id,
            stream: true,
        } => {
            let transcript = match conversation_id {
                Some(id) => ChatTranscript::in_conversation(id),
                None => ChatTranscript::new(),
            };
            let transcript = ask_streaming(client, transcript, &query, interrupt).await?;
            if let Some(id) = transcript.conversation_id() {
                println!("\n(conversation {})", id);
            }
        }
        CliCommand::Ask {
            query,
            conversation_id,
            stream: false,
        } => ask_buffered(client, &query, conversation_id).await?,
        CliCommand::Chat { conversation_id } => chat_loop(client, conversation_id, interrupt).await?,
        CliCommand::Docs => println!("{}", format_documents(&client.list_documents().await?)),
        CliCommand::Chunks { document_id } => {
            println!("{}", format_chunks(&client.document_chunks(document_id).await?))
        }
        CliCommand::Delete { document_id } => {
            let deleted = client.delete_document(document_id).await?;
            if deleted.deleted {
                println!("Deleted document {}", deleted.document_id);
            } else {
                println!("Document {} was not deleted", deleted.document_id);
            }
        }
        CliCommand::IngestText { title, text } => {
            let doc = client.ingest_text(&IngestTextRequest::new(title, text)).await?;
            println!("Queued document {} ({})", doc.id, doc.status);
        }
        CliCommand::IngestUrl { title, url } => {
            let doc = client.ingest_url(&IngestUrlRequest::new(title, url)).await?;
            println!("Queued document {} ({})", doc.id, doc.status);
        }
        CliCommand::Job { document_id, wait } => watch_job(client, document_id, wait, interrupt).await?,
    }
    Ok(())
}
