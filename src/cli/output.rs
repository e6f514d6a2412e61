//! Terminal rendering of answers, documents and jobs.

use std::io::Write;

use crate::answer::ChatTranscript;
use crate::models::{Citation, ChunkOut, DocumentRow, IngestJob, MetaPayload};
use crate::sse::StreamHandler;

const SNIPPET_CHARS: usize = 80;

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
        format!("{}…", cut.trim_end())
    }
}

pub fn format_citations(citations: &[Citation]) -> String {
    citations
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let score = c
                .score
                .map(|s| format!(", score {:.2}", s))
                .unwrap_or_default();
            format!(
                "[{}] {} (chunk {}{})\n    {}",
                i + 1,
                c.label(),
                c.chunk_index,
                score,
                snippet(&c.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_documents(documents: &[DocumentRow]) -> String {
    if documents.is_empty() {
        return "No documents.".to_string();
    }
    documents
        .iter()
        .map(|d| {
            let mut line = format!(
                "{:>5}  {:<10}  {:<6}  {}",
                d.id,
                d.status,
                d.source_type,
                d.display_title()
            );
            if let Some(error) = d.error.as_deref().filter(|e| !e.is_empty()) {
                line.push_str(&format!("  ({})", error));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_chunks(chunks: &[ChunkOut]) -> String {
    if chunks.is_empty() {
        return "No chunks.".to_string();
    }
    chunks
        .iter()
        .map(|c| format!("#{:<4} {}", c.chunk_index, snippet(&c.text)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_job(job: &IngestJob) -> String {
    let mut line = job.status.clone();
    if let Some(stage) = job.stage.as_deref() {
        line.push_str(&format!(" ({})", stage));
    }
    if let Some(error) = job.error.as_deref() {
        line.push_str(&format!(": {}", error));
    }
    line
}

/// Prints the answer as it streams while keeping the transcript current.
pub struct PrintingHandler<W: Write> {
    transcript: ChatTranscript,
    out: W,
}

impl<W: Write> PrintingHandler<W> {
    pub fn new(transcript: ChatTranscript, out: W) -> Self {
        Self { transcript, out }
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut ChatTranscript {
        &mut self.transcript
    }

    pub fn into_parts(self) -> (ChatTranscript, W) {
        (self.transcript, self.out)
    }
}

impl<W: Write> StreamHandler for PrintingHandler<W> {
    fn on_meta(&mut self, meta: MetaPayload) {
        self.transcript.on_meta(meta);
    }

    fn on_token(&mut self, token: &str) {
        let before = self.transcript.assembler().raw().len();
        self.transcript.on_token(token);
        let raw = self.transcript.assembler().raw();
        let added = &raw[before..];
        let added = if before == 0 { added.trim_start() } else { added };
        // Terminal output is best effort; a closed pipe must not abort decoding.
        let _ = self.out.write_all(added.as_bytes());
        let _ = self.out.flush();
    }

    fn on_done(&mut self) {
        self.transcript.on_done();
        let _ = writeln!(self.out);
    }
}
