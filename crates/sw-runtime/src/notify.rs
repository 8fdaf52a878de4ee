//! Delivery of rendered text blocks.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MAX_CHARS: usize = 2000;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, text: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Discord
// ---------------------------------------------------------------------------

/// Posts to a Discord webhook. The URL is never logged or printed.
#[derive(Clone)]
pub struct DiscordWebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl std::fmt::Debug for DiscordWebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordWebhookNotifier")
            .field("url", &"<REDACTED>")
            .finish()
    }
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
}

impl DiscordWebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordWebhookNotifier {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let chunks = chunk_message(text, DISCORD_MAX_CHARS);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            self.http
                .post(&self.url)
                .json(&WebhookBody { content: chunk })
                .send()
                .await
                .with_context(|| format!("discord webhook post failed (chunk {}/{total})", i + 1))?
                .error_for_status()
                // reqwest includes the URL in status errors; drop it.
                .map_err(|e| {
                    anyhow::anyhow!(
                        "discord webhook rejected chunk {}/{total}: status={:?}",
                        i + 1,
                        e.status().map(|s| s.as_u16())
                    )
                })?;
        }
        Ok(())
    }
}

/// Split `text` into pieces of at most `limit` characters, breaking on line
/// boundaries. A single line longer than `limit` is cut mid-line. Blank
/// pieces are dropped.
pub fn chunk_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    // Chunk being filled, with its length in chars.
    let mut open: Option<(String, usize)> = None;

    for line in text.trim_end_matches('\n').split('\n') {
        let line_len = line.chars().count();

        if let Some((buf, len)) = open.as_mut() {
            if *len + 1 + line_len <= limit {
                buf.push('\n');
                buf.push_str(line);
                *len += 1 + line_len;
                continue;
            }
        }
        if let Some((buf, _)) = open.take() {
            chunks.push(buf);
        }

        if line_len <= limit {
            open = Some((line.to_string(), line_len));
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut pieces = chars.chunks(limit).peekable();
        while let Some(piece) = pieces.next() {
            let s: String = piece.iter().collect();
            if pieces.peek().is_some() {
                chunks.push(s);
            } else {
                open = Some((s, piece.len()));
            }
        }
    }

    if let Some((buf, _)) = open {
        chunks.push(buf);
    }
    chunks.retain(|c| !c.trim().is_empty());
    chunks
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Emits through `tracing`; used when no webhook is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<()> {
        info!(target: "sw_runtime::notify", "{text}");
        Ok(())
    }
}
