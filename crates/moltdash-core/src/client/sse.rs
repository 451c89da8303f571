use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;

use crate::client::{DashboardError, DashboardErrorKind, DashboardResult};

/// SSE parser that turns the activity byte stream into raw `data` payloads.
///
/// Comment lines (`: heartbeat`) are consumed by the underlying event
/// parser; events whose data is blank are skipped here. Payloads are not
/// decoded, so a malformed one surfaces later as a dropped event rather
/// than a broken stream.
pub struct ActivitySseParser<S> {
    inner: EventStream<S>,
}

impl<S> ActivitySseParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for ActivitySseParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = DashboardResult<String>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if event.data.trim().is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(Ok(event.data)));
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(DashboardError::new(
                        DashboardErrorKind::Transport,
                        format!("SSE stream error: {e}"),
                    ))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    const SSE_ACTIVITY: &str = "data: {\"type\":\"connected\",\"message\":\"Connected to activity stream\"}\n\n\
: heartbeat\n\n\
data: {\"type\":\"thought_chunk\",\"details\":{\"chunk\":\"Hm\",\"accumulated\":\"Hm\"},\"timestamp\":1.0}\n\n\
: heartbeat\n\n\
data: {\"type\":\"thought\",\"details\":{\"content\":\"Hm\"},\"timestamp\":2.0}\n\n";

    fn mock_byte_stream(
        data: &'static str,
        chunk_size: usize,
    ) -> impl Stream<Item = std::result::Result<bytes::Bytes, std::io::Error>> + Unpin {
        let chunks: Vec<_> = data
            .as_bytes()
            .chunks(chunk_size)
            .map(|c| Ok(bytes::Bytes::copy_from_slice(c)))
            .collect();
        futures_util::stream::iter(chunks)
    }

    async fn collect(data: &'static str, chunk_size: usize) -> Vec<String> {
        let mut parser = ActivitySseParser::new(mock_byte_stream(data, chunk_size));
        let mut payloads = Vec::new();
        while let Some(result) = parser.next().await {
            payloads.push(result.expect("Expected valid payload"));
        }
        payloads
    }

    #[tokio::test]
    async fn test_extracts_data_payloads_and_skips_heartbeats() {
        let payloads = collect(SSE_ACTIVITY, 50).await;

        assert_eq!(payloads.len(), 3);
        assert!(payloads[0].contains("\"connected\""));
        assert!(payloads[1].contains("\"thought_chunk\""));
        assert!(payloads[2].contains("\"thought\""));
    }

    #[tokio::test]
    async fn test_payloads_survive_tiny_chunks() {
        let payloads = collect(SSE_ACTIVITY, 3).await;
        assert_eq!(payloads, collect(SSE_ACTIVITY, 4096).await);
    }

    #[tokio::test]
    async fn test_blank_data_is_skipped() {
        let payloads = collect("data: \n\ndata: {\"type\":\"search\"}\n\n", 16).await;
        assert_eq!(payloads, vec!["{\"type\":\"search\"}".to_string()]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_passed_through() {
        let payloads = collect("data: {not json\n\n", 64).await;
        assert_eq!(payloads, vec!["{not json".to_string()]);
    }
}
