//! Plain TCP forwarder: accepted connections are piped to one upstream.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use relay_config::{ServerConfig, TimeoutPolicy};

use super::{LISTENER_TARGET, ListenerError};
use crate::runner::Listener;

const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a server's listen address.
#[derive(Debug)]
pub(crate) struct TcpForwarder {
    server: ServerConfig,
    timeouts: TimeoutPolicy,
    listener: TcpListener,
}

impl TcpForwarder {
    pub(crate) fn bind(server: ServerConfig, timeouts: TimeoutPolicy) -> Result<Self, ListenerError> {
        let addr = resolve(&server.listen_address())?;
        let listener = TcpListener::bind(addr).map_err(|source| ListenerError::bind(addr, source))?;
        Ok(Self {
            server,
            timeouts,
            listener,
        })
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }
}

impl Listener for TcpForwarder {
    fn serve(self: Box<Self>) -> Result<(), ListenerError> {
        info!(
            target: LISTENER_TARGET,
            server = %self.server.label(),
            listen = %self.server.listen_address(),
            upstream = %self.server.upstream,
            grace_timeout_secs = self.server.grace_timeout.as_secs(),
            "forwarder listening"
        );
        let mut last_error = None::<io::ErrorKind>;
        for incoming in self.listener.incoming() {
            match incoming {
                Ok(client) => {
                    last_error = None;
                    let upstream = self.server.upstream.clone();
                    let timeouts = self.timeouts;
                    thread::spawn(move || forward(client, &upstream, timeouts));
                }
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!(
                            target: LISTENER_TARGET,
                            server = %self.server.label(),
                            error = %error,
                            "accept error"
                        );
                    }
                    last_error = Some(kind);
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        Ok(())
    }
}

fn resolve(address: &str) -> Result<SocketAddr, ListenerError> {
    address
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            address: address.to_owned(),
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            address: address.to_owned(),
        })
}

fn forward(client: TcpStream, upstream: &str, timeouts: TimeoutPolicy) {
    let peer = client.peer_addr().ok();
    if let Err(error) = pipe(client, upstream, timeouts) {
        debug!(
            target: LISTENER_TARGET,
            peer = ?peer,
            upstream,
            error = %error,
            "connection closed with error"
        );
    }
}

fn pipe(client: TcpStream, upstream: &str, timeouts: TimeoutPolicy) -> io::Result<()> {
    client.set_read_timeout(Some(timeouts.read))?;
    client.set_write_timeout(Some(timeouts.write))?;

    let addr = upstream
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "upstream did not resolve"))?;
    let server = TcpStream::connect_timeout(&addr, timeouts.read)?;
    // Once connected, a quiet client may be waiting on a slow upstream.
    client.set_read_timeout(Some(timeouts.idle))?;
    server.set_read_timeout(Some(timeouts.idle))?;
    server.set_write_timeout(Some(timeouts.write))?;

    let mut client_reader = client.try_clone()?;
    let mut server_writer = server.try_clone()?;
    let upload = thread::spawn(move || {
        let copied = io::copy(&mut client_reader, &mut server_writer);
        let _ = server_writer.shutdown(Shutdown::Write);
        copied
    });

    let (mut server_reader, mut client_writer) = (server, client);
    let downloaded = io::copy(&mut server_reader, &mut client_writer);
    let _ = client_writer.shutdown(Shutdown::Write);

    let uploaded = upload
        .join()
        .map_err(|_| io::Error::other("upload thread panicked"))?;
    uploaded?;
    downloaded?;
    Ok(())
}
