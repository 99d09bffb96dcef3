use std::{
    io,
    net::{SocketAddr, TcpListener, ToSocketAddrs},
    sync::Arc,
    time::Duration,
};

use threadpool::ThreadPool;

use crate::{connection::Connection, serve, Handler};

/// Accepts connections and serves each one on a worker from a bounded pool.
pub struct Server<'a> {
    thread_pool: ThreadPool,
    read_timeout: Option<Duration>,
    local_addr: Option<SocketAddr>,
    incoming: Box<dyn Iterator<Item = Connection> + 'a>,
}

impl<'a> Server<'a> {
    /// Serves connections until the incoming iterator is exhausted, which for
    /// a bound server means forever.
    pub fn serve<H: Handler>(self, handler: H) -> io::Result<()> {
        let handler = Arc::new(handler);

        for conn in self.incoming {
            if let Err(err) = conn.set_read_timeout(self.read_timeout) {
                tracing::debug!(%err, "failed to set read timeout");
            }

            let handler = Arc::clone(&handler);
            self.thread_pool.execute(move || {
                let peer = conn.peer_addr();
                if let Err(err) = serve(conn, handler.as_ref()) {
                    tracing::debug!(?peer, %err, "connection error");
                }
            });
        }

        self.thread_pool.join();

        Ok(())
    }

    /// Address the listener is bound to, when the server owns one.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn builder() -> ServerBuilder {
        Default::default()
    }

    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Server<'static>> {
        Self::builder().bind(addr)
    }
}

pub struct ServerBuilder {
    max_threads: usize,
    read_timeout: Option<Duration>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            max_threads: 512,
            read_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl ServerBuilder {
    pub fn max_threads(self, max_threads: usize) -> Self {
        Self {
            max_threads,
            ..self
        }
    }

    /// How long a worker waits on an idle keep-alive connection before
    /// closing it. `None` waits indefinitely.
    pub fn read_timeout(self, read_timeout: Option<Duration>) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    pub fn from_connections<'a, T: IntoIterator<Item = Connection> + 'a>(
        self,
        conns: T,
    ) -> Server<'a> {
        Server {
            thread_pool: ThreadPool::new(self.max_threads.max(1)),
            read_timeout: self.read_timeout,
            local_addr: None,
            incoming: Box::new(conns.into_iter()),
        }
    }

    pub fn bind<A: ToSocketAddrs>(self, addr: A) -> io::Result<Server<'static>> {
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr().ok();

        let mut server = self.from_connections(TcpAcceptor { listener });
        server.local_addr = local_addr;
        Ok(server)
    }
}

struct TcpAcceptor {
    listener: TcpListener,
}

impl Iterator for TcpAcceptor {
    type Item = Connection;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.listener.accept() {
                Ok(conn) => return Some(conn.into()),
                // Transient accept failures (e.g. EMFILE) must not stop the server
                Err(err) => tracing::debug!(%err, "failed to accept connection"),
            }
        }
    }
}
