//! Stdio host: bridges newline-delimited JSON on stdin/stdout to the ports.
//!
//! Each non-empty stdin line is written to the request port as-is (the
//! dispatcher decides whether it is valid). Every message reaching the
//! response port is printed as one stdout line. On EOF or Ctrl-C the
//! dispatcher finishes what is queued and remaining replies are flushed.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;

use portcall_core::error::{PortcallError, Result};

use crate::app_state::AppState;
use crate::transport::Port;

/// Serve the process's stdin/stdout until EOF or Ctrl-C.
pub async fn run(app: &AppState) -> Result<()> {
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    serve(
        app,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        interrupt,
    )
    .await
}

/// Bridge `input` lines to the request port and the response port to
/// `output`, until `input` reaches EOF or `interrupt` resolves.
pub async fn serve<R, W, I>(app: &AppState, input: R, mut output: W, interrupt: I) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let requests = app.request_port();
    let responses = app.response_port();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let dispatcher = app.dispatcher();
    let worker = tokio::spawn(async move {
        dispatcher
            .serve_until(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let mut lines = input.lines();

    loop {
        let changed = responses.next_change();
        flush(&responses, &mut output).await?;

        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|e| PortcallError::Internal(format!("stdin read failed: {e}")))?;
                let Some(line) = line else { break; };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(evicted) = requests.write(line) {
                    tracing::warn!(port = requests.id(), evicted = %evicted, "request port full; oldest request evicted");
                }
            }
            _ = changed => {}
            _ = &mut interrupt => {
                tracing::info!("interrupt received");
                break;
            }
        }
    }

    let _ = stop_tx.send(());
    worker
        .await
        .map_err(|e| PortcallError::Internal(format!("dispatcher task failed: {e}")))?;
    flush(&responses, &mut output).await
}

/// Write every queued response as its own line.
async fn flush<W>(responses: &Port, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut wrote = false;
    while let Some(msg) = responses.read() {
        out.write_all(msg.as_bytes()).await.map_err(stdout_err)?;
        out.write_all(b"\n").await.map_err(stdout_err)?;
        wrote = true;
    }
    if wrote {
        out.flush().await.map_err(stdout_err)?;
    }
    Ok(())
}

fn stdout_err(e: std::io::Error) -> PortcallError {
    PortcallError::Internal(format!("stdout write failed: {e}"))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::ServerConfig;

    fn lines_of(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn serve_forwards_lines_and_prints_replies_until_eof() {
        let app = AppState::new(ServerConfig::default()).unwrap();
        let input: &[u8] = concat!(
            r#"{"endpoint":"echo","from":"a","callback":1,"data":{"n":1}}"#,
            "\n",
            "\n",
            "   \n",
            "not json\n",
            r#"{"endpoint":"echo","from":"","callback":2}"#,
            "\n",
            r#"{"endpoint":"missing","from":"b","callback":3}"#,
            "\n",
        )
        .as_bytes();
        let mut out: Vec<u8> = Vec::new();

        serve(&app, input, &mut out, std::future::pending()).await.unwrap();

        assert_eq!(
            lines_of(out),
            vec![
                json!({"to":"a","status":{"code":200,"status":"Ok"},"data":{"n":1},"callback":1}),
                json!({"to":"b","status":{"code":404,"status":"Resource Not Found"},"data":{},"callback":3}),
            ]
        );
        assert!(app.request_port().is_empty());
        assert!(app.response_port().is_empty());
        assert_eq!(app.metrics().parse_failures.total(), 1);
    }

    #[tokio::test]
    async fn serve_stops_on_interrupt_and_drains_queue() {
        let app = AppState::new(ServerConfig::default()).unwrap();
        app.request_port()
            .write(r#"{"endpoint":"echo","from":"a","callback":"queued"}"#);

        // Input that never reaches EOF.
        let (_keep_open, reader) = tokio::io::duplex(64);
        let mut out: Vec<u8> = Vec::new();

        serve(&app, BufReader::new(reader), &mut out, async {}).await.unwrap();

        let replies = lines_of(out);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["callback"], "queued");
    }

    #[tokio::test]
    async fn flush_writes_one_line_per_response() {
        let port = Port::new(1002, 8);
        port.write(r#"{"to":"a"}"#);
        port.write(r#"{"to":"b"}"#);

        let mut buf: Vec<u8> = Vec::new();
        flush(&port, &mut buf).await.unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "{\"to\":\"a\"}\n{\"to\":\"b\"}\n");
        assert!(port.is_empty());
    }
}
