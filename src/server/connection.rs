// Connection handling module
// Accepts TCP connections and serves HTTP/1.1 on them

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::http;
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// Returns `false` if the connection was rejected.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) -> bool {
    // Increment first, then check the limit, so concurrent accepts cannot both slip through
    let prev_count = state.active_connections.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            state.active_connections.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return false;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state));
    true
}

/// Serve one connection on its own task.
///
/// Idle keep-alive connections are closed after `keep_alive_timeout` seconds
/// without a new request head. Each request gets `request_timeout` seconds to
/// produce its response; sending it is not bounded.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;
        let request_timeout = Duration::from_secs(performance.request_timeout);
        let idle_timeout = if performance.keep_alive_timeout > 0 {
            performance.keep_alive_timeout
        } else {
            performance.request_timeout
        };

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive_timeout > 0)
            .header_read_timeout(Duration::from_secs(idle_timeout));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move {
                    let pending = handler::handle_request(req, state, peer_addr);
                    match tokio::time::timeout(request_timeout, pending).await {
                        Ok(result) => result,
                        Err(_) => {
                            logger::log_warning(&format!(
                                "Request from {peer_addr} timed out after {} seconds",
                                request_timeout.as_secs()
                            ));
                            Ok(http::build_500_response())
                        }
                    }
                }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        state.active_connections.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn state(root: &std::path::Path, max_connections: Option<u64>, keep_alive: u64) -> Arc<AppState> {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load_from(dir.path().join("none").to_str().unwrap()).unwrap();
        config.assets.root = root.to_string_lossy().into_owned();
        config.logging.access_log = false;
        config.performance.max_connections = max_connections;
        config.performance.keep_alive_timeout = keep_alive;
        Arc::new(AppState::new(&config))
    }

    /// Connected client and the server side of the same socket
    async fn socket_pair() -> (TcpStream, TcpStream, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, peer_addr) = listener.accept().await.unwrap();
        (client, server, peer_addr)
    }

    async fn wait_for_count(state: &AppState, expected: usize) {
        for _ in 0..200 {
            if state.active_connections.load(Ordering::SeqCst) == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "active connections stuck at {}",
            state.active_connections.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_rejects_at_connection_limit() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), Some(2), 75);
        state.active_connections.store(2, Ordering::SeqCst);

        let (mut client, server, peer_addr) = socket_pair().await;
        assert!(!accept_connection(server, peer_addr, &state));
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 2);

        // The rejected socket is closed straight away
        let mut buf = [0u8; 1];
        assert_eq!(client.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_counter_released_when_connection_ends() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), Some(1), 75);

        let (client, server, peer_addr) = socket_pair().await;
        assert!(accept_connection(server, peer_addr, &state));
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 1);

        let (_other_client, other_server, other_peer) = socket_pair().await;
        assert!(!accept_connection(other_server, other_peer, &state));

        drop(client);
        wait_for_count(&state, 0).await;
    }

    #[tokio::test]
    async fn test_idle_keep_alive_connection_is_closed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), b"void 0;").unwrap();
        let state = state(dir.path(), None, 1);

        let (mut client, server, peer_addr) = socket_pair().await;
        assert!(accept_connection(server, peer_addr, &state));

        client
            .write_all(b"GET /app.js HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        // The response arrives, then the idle connection is closed by the server
        let mut raw = Vec::new();
        tokio::time::timeout(Duration::from_secs(10), client.read_to_end(&mut raw))
            .await
            .expect("idle connection was not closed")
            .unwrap();
        let raw = String::from_utf8_lossy(&raw);
        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "{raw}");
        assert!(raw.ends_with("void 0;"));

        wait_for_count(&state, 0).await;
    }
}
