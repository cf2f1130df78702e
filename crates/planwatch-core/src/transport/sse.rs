//! Server-sent events transport.
//!
//! The stream is read chunk by chunk from a long-lived HTTP response and fed
//! through [`SseDecoder`], which buffers partial lines and assembles
//! `event:`/`data:` fields into frames on each blank line.

use std::collections::VecDeque;

use log::{debug, warn};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use url::Url;

use crate::{
    error::Result,
    protocol::{Frame, Inbound},
};

/// Event name used when a frame carries no `event:` field.
const DEFAULT_EVENT_NAME: &str = "message";

pub struct SseConnection {
    response: Option<reqwest::Response>,
    decoder: SseDecoder,
    pending: VecDeque<Inbound>,
}

impl SseConnection {
    pub async fn open(http: &reqwest::Client, url: &Url) -> Result<Self> {
        let response = http
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?
            .error_for_status()?;
        Ok(Self {
            response: Some(response),
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
        })
    }

    pub async fn next(&mut self) -> Option<Result<Inbound>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            let response = self.response.as_mut()?;
            match response.chunk().await {
                Ok(Some(chunk)) => self.pending.extend(self.decoder.feed(&chunk)),
                Ok(None) => {
                    self.response = None;
                    return None;
                }
                Err(e) => {
                    self.response = None;
                    return Some(Err(e.into()));
                }
            }
        }
    }

    /// Drops the response, which closes the underlying HTTP connection.
    pub fn close(&mut self) {
        self.response = None;
        self.pending.clear();
    }
}

/// Incremental parser for the `text/event-stream` format.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Consumes a chunk and returns every item completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Inbound> {
        self.buffer.extend_from_slice(chunk);

        let mut items = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match String::from_utf8(line) {
                Ok(line) => items.extend(self.process_line(&line)),
                Err(_) => warn!("Skipping non-UTF-8 line in event stream"),
            }
        }
        items
    }

    fn process_line(&mut self, line: &str) -> Option<Inbound> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return Some(Inbound::Keepalive);
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" | "retry" => {}
            other => debug!("Ignoring event stream field '{other}'"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<Inbound> {
        let name = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(Inbound::Frame(Frame::Event {
            name: name.unwrap_or_else(|| DEFAULT_EVENT_NAME.to_string()),
            data,
        }))
    }
}
