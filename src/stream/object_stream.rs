//! Pull-based text channels. The writer half never blocks; the reader half
//! suspends until a chunk arrives or the channel is ended.

use crate::errors::StreamError;
use tokio::sync::mpsc;

/// One delivery on a channel: a text chunk or an in-band error.
pub type StreamItem = Result<String, StreamError>;

/// Creates a connected writer and reader.
pub fn object_stream() -> (ObjectWriter, ObjectReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ObjectWriter { tx: Some(tx) }, ObjectReader { rx })
}

/// Producer half. Buffering is unbounded.
#[derive(Debug)]
pub struct ObjectWriter {
    tx: Option<mpsc::UnboundedSender<StreamItem>>,
}

impl ObjectWriter {
    /// Queues a chunk. Silently dropped once the channel has ended or the
    /// reader is gone.
    pub fn push(&self, chunk: impl Into<String>) {
        self.send(Ok(chunk.into()));
    }

    pub fn push_error(&self, err: StreamError) {
        self.send(Err(err));
    }

    fn send(&self, item: StreamItem) {
        if let Some(tx) = &self.tx {
            if tx.send(item).is_err() {
                tracing::trace!("channel reader dropped; discarding chunk");
            }
        }
    }

    /// Ends the channel. A reader drains what is buffered and then sees the
    /// end. Calling this again does nothing.
    pub fn end(&mut self) {
        self.tx = None;
    }

    pub fn is_ended(&self) -> bool {
        self.tx.is_none()
    }
}

/// Consumer half.
#[derive(Debug)]
pub struct ObjectReader {
    rx: mpsc::UnboundedReceiver<StreamItem>,
}

impl ObjectReader {
    /// The next item, or `None` once the channel has ended and is drained.
    pub async fn read(&mut self) -> Option<StreamItem> {
        self.rx.recv().await
    }

    /// The next buffered item without waiting.
    pub fn try_read(&mut self) -> Option<StreamItem> {
        self.rx.try_recv().ok()
    }

    /// Everything until the channel ends. Never returns for a channel that
    /// stays open.
    pub async fn read_all(mut self) -> Vec<StreamItem> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }

    /// Every buffered chunk joined by newlines, stopping at the first error.
    pub fn drain_text(&mut self) -> Result<String, StreamError> {
        let mut chunks = Vec::new();
        while let Some(item) = self.try_read() {
            chunks.push(item?);
        }
        Ok(chunks.join("\n"))
    }
}
