//! Test utilities for the OSRM client.
//!
//! This module provides [`StubOsrmServer`], a minimal HTTP server on a
//! loopback port that answers each incoming request with the next canned
//! reply. It lets tests drive [`crate::OsrmClient`] end to end without a
//! running OSRM service.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// A canned HTTP reply.
#[derive(Debug, Clone)]
pub struct StubReply {
    status: u16,
    body: String,
    delay: Duration,
}

impl StubReply {
    /// `200 OK` with a JSON `body`.
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    /// An arbitrary status with a JSON `body`.
    #[must_use]
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Loopback HTTP server replaying [`StubReply`] values in order.
///
/// Each reply answers exactly one connection and closes it. The server
/// thread exits once every reply has been served.
///
/// # Example
///
/// ```
/// use stopwise_core::{Coordinate, CostQueryClient};
/// use stopwise_osrm::OsrmClient;
/// use stopwise_osrm::routing::test_support::{StubOsrmServer, StubReply};
///
/// let server = StubOsrmServer::serve(vec![StubReply::ok(
///     r#"{"code":"Ok","routes":[{"distance":1200.0,"duration":95.0}]}"#,
/// )])?;
/// let client = OsrmClient::new(server.base_url())?;
/// let stops = [Coordinate::new(51.5, -0.1)?, Coordinate::new(51.6, -0.2)?];
///
/// assert_eq!(client.route(&stops)?.distance_m, 1200.0);
/// assert_eq!(server.requests().len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct StubOsrmServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubOsrmServer {
    /// Bind a loopback port and start answering with `replies`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub fn serve(replies: Vec<StubReply>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for reply in replies {
                let Ok((stream, _)) = listener.accept() else {
                    break;
                };
                // A failed exchange just drops that connection.
                let _ = answer(stream, &reply, &recorded);
            }
        });
        Ok(Self { base_url, requests })
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request targets (path and query) received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }
}

/// A base URL on which nothing is listening.
///
/// # Errors
///
/// Returns an error if no loopback port can be reserved.
pub fn unreachable_base_url() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// Read the request head, record its target, then write `reply`.
fn answer(
    stream: TcpStream,
    reply: &StubReply,
    recorded: &Mutex<Vec<String>>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut header = String::new();
    while reader.read_line(&mut header)? > 0 && !header.trim_end().is_empty() {
        header.clear();
    }
    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_owned();
    if let Ok(mut log) = recorded.lock() {
        log.push(target);
    }

    thread::sleep(reply.delay);
    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    )?;
    stream.flush()
}
