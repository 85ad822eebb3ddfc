use may::coroutine::JoinHandle;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::service::AppService;

/// Typed wrapper around `may_minihttp`'s server.
pub struct HttpServer(pub AppService);

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listening address until a TCP connect succeeds (about 250ms at most).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept coroutine and wait for it to finish.
    pub fn stop(self) {
        // SAFETY: cancelling is only unsafe for coroutines holding resources that must be
        // released by normal unwinding; the accept loop holds only its listener.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            warn!(addr = %self.addr, "Server coroutine ended with a panic");
        }
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the server coroutine exits.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

impl HttpServer {
    /// Bind `addr` and serve on `may` coroutines.
    ///
    /// The coroutine stack size comes from the dispatcher's [`AppConfig`](crate::AppConfig)
    /// and is applied process-wide before the accept loop spawns.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let stack_size = self.0.dispatcher().config().stack_size;
        may::config().set_stack_size(stack_size);
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        info!(addr = %addr, stack_size, "Server listening");
        Ok(ServerHandle { addr, handle })
    }
}
