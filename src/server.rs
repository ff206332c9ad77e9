use crate::config::ServerConfig;
use crate::http::parse::HttpParser;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::router::Router;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the accept loop checks the shutdown flag when idle.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Per-connection socket read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Set by the termination-signal handler; the accept loop stops once true.
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn install_signal_handlers() {
    let handler = request_shutdown as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handler as libc::sighandler_t);
    }
}

/// HTTP server dispatching each accepted connection onto its own thread, so
/// a handler may block (the simulated upload delay) without stalling other
/// requests.
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
}

impl Server {
    /// Bind the listener and build the routing table from configuration.
    pub fn bind(config: &ServerConfig, program: String) -> io::Result<Self> {
        let router = Arc::new(Router::new(config, program)?);
        let listener = TcpListener::bind(config.bind_address())?;
        listener.set_nonblocking(true)?;

        Ok(Server { listener, router })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until a TERM or INT signal is received, then stop
    /// accepting and let in-flight requests finish.
    pub fn run(&self) -> io::Result<()> {
        install_signal_handlers();
        log::info!("Serving on http://{}/", self.local_addr()?);

        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        while !SHUTDOWN.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    let router = self.router.clone();
                    workers.push(thread::spawn(move || {
                        if let Err(e) = handle_connection(stream, &router) {
                            log::debug!("connection from {}: {}", addr, e);
                        }
                    }));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    workers.retain(|handle| !handle.is_finished());
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => return Err(e),
            }
        }

        log::info!("Shutting down");
        for handle in workers {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// Read one request off the connection, route it, write the response and
/// close.
fn handle_connection(stream: TcpStream, router: &Router) -> io::Result<()> {
    let mut stream = stream;
    // Sockets accepted from a non-blocking listener inherit its mode.
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let request = match read_request(&mut stream) {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            let mut response = HttpResponse::bad_request();
            response.set_header("Connection", "close");
            stream.write_all(&response.to_bytes())?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut response = router.route(&request);
    response.set_header("Connection", "close");
    log::info!("{} -> {}", request.request_line(), response.status_code);

    stream.write_all(&response.to_bytes())?;
    stream.flush()
}

/// Feed socket data into the parser until a full request is available.
/// Returns None if the client closes before sending a complete request.
fn read_request(stream: &mut TcpStream) -> io::Result<Option<HttpRequest>> {
    let mut parser = HttpParser::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        if let Some(request) = parser.parse(&buf[..n])? {
            return Ok(Some(request));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_router(root: &TempDir) -> Arc<Router> {
        let config = ServerConfig {
            server_root: root.path().to_path_buf(),
            ..ServerConfig::default()
        };
        Arc::new(Router::new(&config, "oddjob".to_string()).unwrap())
    }

    fn exchange(router: Arc<Router>, raw_request: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(raw_request).unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).unwrap();
            String::from_utf8(response).unwrap()
        });

        let (stream, _) = listener.accept().unwrap();
        handle_connection(stream, &router).unwrap();
        client.join().unwrap()
    }

    #[test]
    fn test_connection_serves_info_page() {
        let temp_dir = TempDir::new().unwrap();
        let response = exchange(
            test_router(&temp_dir),
            b"GET /oj_info HTTP/1.1\r\nHost: localhost\r\n\r\n",
        );

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Connection: close"));
        assert!(response.contains("<title>OJ Info</title>"));
    }

    #[test]
    fn test_connection_serves_static_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("hi.txt"), "hello").unwrap();

        let response = exchange(
            test_router(&temp_dir),
            b"GET /hi.txt HTTP/1.1\r\nHost: localhost\r\n\r\n",
        );

        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("hello"));
    }

    #[test]
    fn test_connection_rejects_garbage_with_400() {
        let temp_dir = TempDir::new().unwrap();
        let response = exchange(test_router(&temp_dir), b"garbage that is not http\r\n\r\n");

        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_bind_loopback_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            server_root: temp_dir.path().to_path_buf(),
            port: 0,
            ..ServerConfig::default()
        };

        let server = Server::bind(&config, "oddjob".to_string()).unwrap();
        assert!(server.local_addr().unwrap().ip().is_loopback());
    }
}
