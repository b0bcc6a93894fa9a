//! Fixed-size chunking over a response body stream.
//!
//! Network chunks arrive in whatever sizes the transport delivers; the
//! preview needs exactly the first `PREVIEW_CHUNK_SIZE` bytes and the copy
//! loop reads `STREAM_CHUNK_SIZE` bytes at a time.

use futures_util::{Stream, StreamExt};

/// Re-chunks a byte stream into chunks of a caller-chosen maximum size.
#[derive(Debug)]
pub struct ChunkedBody<S> {
    stream: S,
    pending: Vec<u8>,
    exhausted: bool,
}

impl<S, B, E> ChunkedBody<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    /// Wraps a body stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pending: Vec::new(),
            exhausted: false,
        }
    }

    /// Returns the next chunk of at most `max` bytes, or `None` at end of body.
    ///
    /// A chunk shorter than `max` is only returned at the end of the body.
    ///
    /// # Errors
    ///
    /// Propagates the first stream error.
    pub async fn next_chunk(&mut self, max: usize) -> Result<Option<Vec<u8>>, E> {
        while self.pending.len() < max && !self.exhausted {
            match self.stream.next().await {
                Some(chunk) => self.pending.extend_from_slice(chunk?.as_ref()),
                None => self.exhausted = true,
            }
        }

        if self.pending.is_empty() {
            return Ok(None);
        }

        let take = self.pending.len().min(max);
        let rest = self.pending.split_off(take);
        Ok(Some(std::mem::replace(&mut self.pending, rest)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;

    use futures_util::stream;

    use super::*;

    type TestStream = stream::Iter<std::vec::IntoIter<Result<Vec<u8>, io::Error>>>;

    fn body(chunks: Vec<Result<Vec<u8>, io::Error>>) -> ChunkedBody<TestStream> {
        ChunkedBody::new(stream::iter(chunks))
    }

    #[tokio::test]
    async fn test_next_chunk_merges_small_network_chunks() {
        let mut body = body(vec![Ok(vec![1; 300]), Ok(vec![2; 300]), Ok(vec![3; 600])]);

        let first = body.next_chunk(1024).await.unwrap().unwrap();
        assert_eq!(first.len(), 1024);
        assert_eq!(first[299], 1);
        assert_eq!(first[300], 2);

        let rest = body.next_chunk(8192).await.unwrap().unwrap();
        assert_eq!(rest.len(), 176);
        assert!(body.next_chunk(8192).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_chunk_splits_large_network_chunk() {
        let mut body = body(vec![Ok(vec![7; 20_000])]);

        let mut sizes = Vec::new();
        while let Some(chunk) = body.next_chunk(8192).await.unwrap() {
            sizes.push(chunk.len());
        }
        assert_eq!(sizes, [8192, 8192, 3616]);
    }

    #[tokio::test]
    async fn test_next_chunk_empty_body_returns_none() {
        let mut body = body(vec![]);
        assert!(body.next_chunk(1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_next_chunk_propagates_stream_error() {
        let mut body = body(vec![
            Ok(vec![0; 10]),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let err = body.next_chunk(1024).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
