//! Response body handling: reading, copying and the drain-before-release
//! step that lets the connection pool reuse the socket.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Upper bound on how much of an unread body is slurped before release.
pub const MAX_BODY_SLURP: u64 = 2 << 10;

pub(crate) async fn read_to_end(resp: &mut reqwest::Response) -> Result<Vec<u8>, reqwest::Error> {
    let mut data = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub(crate) enum CopyError {
    Read(reqwest::Error),
    Write(std::io::Error),
}

/// Stream the remaining body into `sink` without buffering it.
pub(crate) async fn copy_to(
    resp: &mut reqwest::Response,
    sink: &mut (dyn AsyncWrite + Unpin + Send),
) -> Result<u64, CopyError> {
    let mut written = 0u64;
    while let Some(chunk) = resp.chunk().await.map_err(CopyError::Read)? {
        sink.write_all(&chunk).await.map_err(CopyError::Write)?;
        written += chunk.len() as u64;
    }
    sink.flush().await.map_err(CopyError::Write)?;
    Ok(written)
}

/// Release a response after reading a bounded amount of whatever is left.
///
/// A body of unknown or small length is read up to [`MAX_BODY_SLURP`] bytes
/// so a short tail does not keep the connection out of the pool. Larger
/// bodies are dropped unread and the connection is closed. Read errors are
/// ignored: the pool will not reuse a broken connection either way.
pub(crate) async fn drain(mut resp: reqwest::Response) {
    let cheap = resp
        .content_length()
        .map_or(true, |len| len <= MAX_BODY_SLURP);
    if cheap {
        let mut slurped = 0u64;
        while slurped < MAX_BODY_SLURP {
            match resp.chunk().await {
                Ok(Some(chunk)) => slurped += chunk.len() as u64,
                _ => break,
            }
        }
        trace!(slurped, "drained response body");
    }
    drop(resp);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_response(body: Vec<u8>) -> reqwest::Response {
        reqwest::Response::from(http::Response::builder().status(200).body(body).unwrap())
    }

    #[tokio::test]
    async fn read_to_end_collects_everything() {
        let mut resp = transport_response(b"{\"stops\":[]}".to_vec());
        assert_eq!(read_to_end(&mut resp).await.unwrap(), b"{\"stops\":[]}");
        assert_eq!(read_to_end(&mut resp).await.unwrap(), b"");
    }

    #[tokio::test]
    async fn copy_to_writes_raw_bytes() {
        let mut resp = transport_response(b"not json at all".to_vec());
        let mut sink = Vec::new();
        let written = match copy_to(&mut resp, &mut sink).await {
            Ok(n) => n,
            Err(_) => panic!("copy failed"),
        };
        assert_eq!(written, 15);
        assert_eq!(sink, b"not json at all");
    }

    #[tokio::test]
    async fn drain_handles_small_and_large_bodies() {
        drain(transport_response(vec![b'x'; 10])).await;
        drain(transport_response(vec![b'x'; 64 * 1024])).await;
        drain(transport_response(Vec::new())).await;
    }
}
