//! Backend side: serve a [`KvStore`] to a host.
//!
//! [`DispatchServer::dispatch`] maps one [`Request`] to one store call and
//! one [`Response`]. [`serve`] is what a backend binary's `main` calls: it
//! checks the cookie, binds a loopback port, prints the announcement line
//! on stdout and accepts connections, one thread each.
//!
//! A connection starts with `Hello`. The cookie and protocol version are
//! checked again there and the connection is bound to the requested
//! service; every later message is a storage request.

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use nosql_core::{Error, KvStore, Result};
use nosql_wire::{
    decode_transaction, encode_frame, encode_transaction, read_message, send_frame,
    write_message, CmpAndSwapResponse, GetResponse, HelloRequest, HelloResponse, ListResponse,
    Request, Response, UpdateFailedResponse, UpdateResponse, WireError,
};
use tracing::{debug, error, info, warn};

use crate::handshake::{HandshakeConfig, HandshakeLine, SERVICE_NAME};

/// Backend serving options.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Values the host must present
    pub handshake: HandshakeConfig,
    /// Services advertised in the `Hello` answer
    pub services: Vec<String>,
    /// Address to listen on
    pub bind_addr: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        ServeConfig {
            handshake: HandshakeConfig::default(),
            services: vec![SERVICE_NAME.to_string()],
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

/// Maps requests to calls on the wrapped store.
#[derive(Debug)]
pub struct DispatchServer<S> {
    store: S,
}

impl<S: KvStore> DispatchServer<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        DispatchServer { store }
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one request against the store.
    pub fn dispatch(&self, request: Request) -> Response {
        let method = request.method();
        match self.call(request) {
            Ok(response) => response,
            Err(e) => {
                debug!(method, error = %e, "request failed");
                Response::Error(WireError::from(e))
            }
        }
    }

    fn call(&self, request: Request) -> Result<Response> {
        match request {
            Request::Hello(_) => Err(Error::Protocol(
                "Hello is only valid as the first message of a connection".to_string(),
            )),
            Request::Get(r) => Ok(Response::Get(GetResponse {
                value: self.store.get(&r.bucket, &r.key)?,
            })),
            Request::Set(r) => {
                self.store.set(&r.bucket, &r.key, &r.value)?;
                Ok(Response::Empty)
            }
            Request::Del(r) => {
                self.store.del(&r.bucket, &r.key)?;
                Ok(Response::Empty)
            }
            Request::CmpAndSwap(r) => {
                let (value, swapped) =
                    self.store
                        .cmp_and_swap(&r.bucket, &r.key, &r.old_value, &r.new_value)?;
                Ok(Response::CmpAndSwap(CmpAndSwapResponse { value, swapped }))
            }
            Request::List(r) => Ok(Response::List(ListResponse {
                entries: self.store.list(&r.bucket)?,
            })),
            Request::Update(r) => {
                // Decode everything before executing anything.
                let mut tx = decode_transaction(r.tx)?;
                match self.store.update(&mut tx) {
                    Ok(()) => Ok(Response::Update(UpdateResponse {
                        tx: encode_transaction(&tx),
                    })),
                    Err(e) => {
                        debug!(error = %e, "transaction stopped");
                        Ok(Response::UpdateFailed(UpdateFailedResponse {
                            error: WireError::from(e),
                            tx: encode_transaction(&tx),
                        }))
                    }
                }
            }
            Request::CreateTable(r) => {
                self.store.create_table(&r.bucket)?;
                Ok(Response::Empty)
            }
            Request::DeleteTable(r) => {
                self.store.delete_table(&r.bucket)?;
                Ok(Response::Empty)
            }
        }
    }
}

/// Serve `store` as a launched backend. Returns only on failure.
///
/// Fails with [`Error::Config`] when the cookie is missing from the
/// environment; the caller should print it and exit with status 1.
pub fn serve<S: KvStore + 'static>(store: S, config: ServeConfig) -> Result<()> {
    config.handshake.check_environment()?;

    let listener = TcpListener::bind(&config.bind_addr)?;
    let line = HandshakeLine::new(config.handshake.protocol_version, listener.local_addr()?);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", line)?;
    out.flush()?;
    drop(out);

    info!(address = %line.address, services = ?config.services, "backend listening");
    serve_listener(listener, store, config)
}

/// Accept connections on `listener` until accepting fails.
pub fn serve_listener<S: KvStore + 'static>(
    listener: TcpListener,
    store: S,
    config: ServeConfig,
) -> Result<()> {
    let server = Arc::new(DispatchServer::new(store));
    let config = Arc::new(config);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "accept failed");
                return Err(Error::Io(e));
            }
        };
        let server = Arc::clone(&server);
        let config = Arc::clone(&config);
        thread::Builder::new()
            .name("nosql-conn".to_string())
            .spawn(move || {
                let peer = stream.peer_addr().ok();
                debug!(?peer, "connection opened");
                match handle_connection(&server, &config, stream) {
                    Ok(()) => debug!(?peer, "connection closed"),
                    Err(e) => warn!(?peer, error = %e, "connection ended with error"),
                }
            })?;
    }
    Ok(())
}

fn handle_connection<S: KvStore>(
    server: &DispatchServer<S>,
    config: &ServeConfig,
    stream: TcpStream,
) -> Result<()> {
    stream.set_nodelay(true)?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    let hello = match read_message::<_, Request>(&mut reader)? {
        Some(Request::Hello(hello)) => hello,
        Some(other) => {
            let err = Error::Protocol(format!(
                "expected Hello, got {} before the handshake",
                other.method()
            ));
            write_message(&mut writer, &Response::Error(WireError::from(&err)))?;
            return Err(err);
        }
        None => return Ok(()),
    };

    if let Err(err) = check_hello(config, &hello) {
        write_message(&mut writer, &Response::Error(WireError::from(&err)))?;
        return Err(err);
    }
    write_message(
        &mut writer,
        &Response::Hello(HelloResponse {
            protocol_version: config.handshake.protocol_version,
            services: config.services.clone(),
        }),
    )?;
    debug!(service = %hello.service, "handshake complete");

    while let Some(request) = read_message::<_, Request>(&mut reader)? {
        let response = server.dispatch(request);
        send_response(&mut writer, &response)?;
    }
    Ok(())
}

/// Send `response`, or an error in its place if it does not fit in a frame.
fn send_response<W: Write>(w: &mut W, response: &Response) -> Result<()> {
    let payload = match encode_frame(response) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(response = response.name(), error = %err, "response not sendable");
            encode_frame(&Response::Error(WireError::from(&err)))?
        }
    };
    send_frame(w, &payload)
}

fn check_hello(config: &ServeConfig, hello: &HelloRequest) -> Result<()> {
    let expected = &config.handshake;
    if hello.magic_cookie_key != expected.magic_cookie_key
        || hello.magic_cookie_value != expected.magic_cookie_value
    {
        return Err(Error::Launch("magic cookie mismatch".to_string()));
    }
    if hello.protocol_version != expected.protocol_version {
        return Err(Error::Launch(format!(
            "incompatible protocol version: backend {}, host {}",
            expected.protocol_version, hello.protocol_version
        )));
    }
    if !config.services.iter().any(|s| *s == hello.service) {
        return Err(Error::Launch(format!(
            "service not found: {} (available: {})",
            hello.service,
            config.services.join(", ")
        )));
    }
    Ok(())
}
