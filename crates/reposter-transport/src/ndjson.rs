//! Newline-delimited JSON transport.
//!
//! Inbound: one [`InboundEvent`] per line. Outbound: one [`Outbound`] per
//! line. An external bot adapter process sits on the other end of the pipes.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use reposter_core::{Identity, InboundEvent, Reaction, ReposterError, ReposterResult};

use crate::{EventSink, EventSource, Outbound, Responder};

/// Longest accepted inbound line (1 MiB)
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Parse one inbound line
pub fn parse_event_line(line: &str) -> ReposterResult<InboundEvent> {
    if line.len() > MAX_LINE_BYTES {
        return Err(ReposterError::TransportError(format!(
            "line exceeds {MAX_LINE_BYTES} bytes"
        )));
    }
    serde_json::from_str(line.trim()).map_err(|e| ReposterError::TransportError(e.to_string()))
}

/// Event source reading JSON lines
pub struct NdjsonSource<R> {
    reader: R,
    /// Bytes of the line being read; survives a cancelled read
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin + Send> NdjsonSource<R> {
    pub fn new(reader: R) -> Self {
        NdjsonSource {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    fn decode(&self, raw: &[u8]) -> Option<InboundEvent> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(line = self.line_no, error = %e, "skipping line that is not UTF-8");
                return None;
            }
        };
        if line.trim().is_empty() {
            return None;
        }
        match parse_event_line(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(line = self.line_no, error = %e, "skipping malformed event");
                None
            }
        }
    }
}

impl NdjsonSource<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        NdjsonSource::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> EventSource for NdjsonSource<R> {
    /// Skips blank, malformed and non-UTF-8 lines; ends on EOF or an I/O
    /// failure
    async fn next_event(&mut self) -> Option<InboundEvent> {
        loop {
            match self.reader.read_until(b'\n', &mut self.buf).await {
                Ok(0) if self.buf.is_empty() => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(line = self.line_no + 1, error = %e, "inbound stream read failed");
                    return None;
                }
            }
            self.line_no += 1;
            let raw = std::mem::take(&mut self.buf);
            if let Some(event) = self.decode(&raw) {
                return Some(event);
            }
        }
    }
}

/// Sink and responder writing JSON lines
pub struct NdjsonSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        NdjsonSink {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    async fn emit(&self, action: &Outbound) -> ReposterResult<()> {
        let mut line =
            serde_json::to_vec(action).map_err(|e| ReposterError::TransportError(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| ReposterError::TransportError(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| ReposterError::TransportError(e.to_string()))
    }
}

impl NdjsonSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        NdjsonSink::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> EventSink for NdjsonSink<W> {
    async fn deliver(&self, sink: Identity, event: &InboundEvent) -> ReposterResult<()> {
        self.emit(&Outbound::forward(sink, event))
            .await
            .map_err(|e| ReposterError::DeliveryFailed {
                sink,
                reason: e.to_string(),
            })
    }
}

impl<W: AsyncWrite + Unpin + Send> Responder for NdjsonSink<W> {
    async fn reply(&self, to: &InboundEvent, text: &str) -> ReposterResult<()> {
        self.emit(&Outbound::reply(to, text)).await
    }

    async fn react(&self, to: &InboundEvent, reaction: Reaction) -> ReposterResult<()> {
        self.emit(&Outbound::react(to, reaction)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reposter_core::{ChatKind, Payload};

    #[tokio::test]
    async fn test_source_skips_malformed_lines() {
        let input = concat!(
            "{\"origin\":-100,\"chat\":\"channel\",\"body\":{\"type\":\"single\",\"items\":{\"message_id\":1,\"text\":\"a\"}}}\n",
            "\n",
            "not json\n",
            "{\"origin\":7,\"actor\":7,\"chat\":\"private\",\"body\":{\"type\":\"single\",\"items\":{\"message_id\":2,\"text\":\"/ls\"}}}\n",
        );
        let mut source = NdjsonSource::new(input.as_bytes());

        let first = source.next_event().await.unwrap();
        assert_eq!(first.origin, Identity(-100));
        assert_eq!(first.chat, ChatKind::Channel);

        let second = source.next_event().await.unwrap();
        assert_eq!(second.command_text(), Some("/ls"));

        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_source_survives_non_utf8_line() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(
            b"{\"origin\":-100,\"chat\":\"channel\",\"body\":{\"type\":\"single\",\"items\":{\"message_id\":3,\"text\":\"b\"}}}\n",
        );
        let mut source = NdjsonSource::new(&input[..]);

        let event = source.next_event().await.unwrap();
        assert_eq!(event.origin, Identity(-100));
        assert_eq!(event.message_id(), Some(3));
        assert_eq!(source.line_no, 2);
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_source_reads_last_line_without_newline() {
        let input = "{\"origin\":5,\"body\":{\"type\":\"single\",\"items\":{\"message_id\":1}}}";
        let mut source = NdjsonSource::new(input.as_bytes());

        assert_eq!(source.next_event().await.unwrap().origin, Identity(5));
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn test_sink_writes_one_line_per_action() {
        let sink = NdjsonSink::new(Vec::new());
        let post = InboundEvent::channel_post(Identity(-100), Payload::text(1, "x"));
        sink.deliver(Identity(200), &post).await.unwrap();
        sink.react(&post, Reaction::Dislike).await.unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Outbound = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.chat(), Identity(200));
        assert!(lines[1].contains("\"reaction\":\"dislike\""));
    }

    #[test]
    fn test_oversized_line_rejected() {
        let line = " ".repeat(MAX_LINE_BYTES + 1);
        assert!(parse_event_line(&line).is_err());
    }

    fn arb_event() -> impl Strategy<Value = InboundEvent> {
        let payload = (any::<i64>(), proptest::option::of(".*"))
            .prop_map(|(message_id, text)| Payload {
                message_id,
                text,
                data: Default::default(),
            });
        let chat = prop_oneof![
            Just(ChatKind::Private),
            Just(ChatKind::Group),
            Just(ChatKind::Channel),
        ];
        (
            any::<i64>(),
            proptest::option::of(any::<i64>()),
            chat,
            proptest::collection::vec(payload, 1..4),
        )
            .prop_map(|(origin, actor, chat, mut items)| {
                let actor = actor.map(Identity);
                if items.len() == 1 {
                    InboundEvent::single(Identity(origin), actor, chat, items.remove(0))
                } else {
                    InboundEvent::album(Identity(origin), actor, chat, items)
                }
            })
    }

    proptest! {
        #[test]
        fn prop_serialized_event_parses_back(event in arb_event()) {
            let line = serde_json::to_string(&event).unwrap();
            prop_assert!(!line.contains('\n'));
            prop_assert_eq!(parse_event_line(&line).unwrap(), event);
        }

        #[test]
        fn prop_arbitrary_line_never_panics(line in ".{0,256}") {
            let _ = parse_event_line(&line);
        }
    }
}
