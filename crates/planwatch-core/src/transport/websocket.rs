//! WebSocket transport using tokio-tungstenite.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::{
    error::Result,
    protocol::{Frame, Inbound},
};

/// Upper bound on sending our close frame to an unresponsive peer.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketConnection {
    pub async fn open(url: &Url) -> Result<Self> {
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(Self { stream })
    }

    pub async fn next(&mut self) -> Option<Result<Inbound>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e.into())),
            };
            match message {
                Message::Text(text) => {
                    return Some(Ok(Inbound::Frame(Frame::Text(text.as_str().to_owned()))))
                }
                Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(Inbound::Frame(Frame::Text(text)))),
                    Err(_) => debug!("Ignoring non-UTF-8 binary frame"),
                },
                // Pings are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) => return Some(Ok(Inbound::Keepalive)),
                Message::Close(frame) => {
                    debug!("Received close frame: {frame:?}");
                    return None;
                }
                Message::Frame(_) => {}
            }
        }
    }

    pub async fn close(&mut self) {
        match tokio::time::timeout(CLOSE_TIMEOUT, self.stream.close(None)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Error while closing WebSocket: {e}"),
            Err(_) => debug!("Timed out closing WebSocket"),
        }
    }
}
