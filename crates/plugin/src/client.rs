//! Host side: a [`KvStore`] whose calls run in a backend process.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpStream};

use bytes::Bytes;
use nosql_core::{Entry, Error, KvStore, Result, Transaction};
use nosql_wire::{
    encode_frame, encode_transaction, merge_results, read_message, send_frame, CmpAndSwapRequest,
    CreateTableRequest, DelRequest, DeleteTableRequest, GetRequest, HelloRequest, ListRequest,
    Request, Response, SetRequest, UpdateRequest,
};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::LaunchConfig;

struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    /// Set after a failure once bytes were on the wire; the stream may
    /// hold half a frame.
    broken: bool,
}

impl Connection {
    fn round_trip(&mut self, request: &Request) -> Result<Response> {
        if self.broken {
            return Err(Error::Transport(
                "connection unusable after an earlier transport failure".to_string(),
            ));
        }
        // Encoding failures leave the stream untouched.
        let payload = encode_frame(request)?;
        let result = send_frame(&mut self.writer, &payload).and_then(|()| {
            read_message::<_, Response>(&mut self.reader)?
                .ok_or_else(|| Error::Transport("backend closed the connection".to_string()))
        });
        if result.is_err() {
            self.broken = true;
        }
        result
    }
}

/// Store backed by a remote dispatch server.
///
/// Each call is one request and one response. Calls from several threads
/// are serialized on the connection.
pub struct RemoteStore {
    conn: Mutex<Connection>,
    control: TcpStream,
    peer: SocketAddr,
    services: Vec<String>,
}

impl RemoteStore {
    /// Connect to `addr` and perform the `Hello` exchange.
    ///
    /// Any failure here is reported as [`Error::Launch`].
    pub fn connect(addr: SocketAddr, config: &LaunchConfig) -> Result<Self> {
        Self::establish(addr, config).map_err(|e| match e {
            Error::Launch(_) => e,
            other => Error::Launch(format!("handshake with {} failed: {}", addr, other)),
        })
    }

    fn establish(addr: SocketAddr, config: &LaunchConfig) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, config.start_timeout)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(config.start_timeout))?;
        stream.set_write_timeout(Some(config.start_timeout))?;

        let mut conn = Connection {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream.try_clone()?),
            broken: false,
        };
        let hello = Request::Hello(HelloRequest {
            magic_cookie_key: config.handshake.magic_cookie_key.clone(),
            magic_cookie_value: config.handshake.magic_cookie_value.clone(),
            protocol_version: config.handshake.protocol_version,
            service: config.service.clone(),
        });
        let services = match conn.round_trip(&hello)? {
            Response::Hello(answer) => {
                if answer.protocol_version != config.handshake.protocol_version {
                    return Err(Error::Launch(format!(
                        "incompatible protocol version: backend {}, host {}",
                        answer.protocol_version, config.handshake.protocol_version
                    )));
                }
                if !answer.services.contains(&config.service) {
                    return Err(Error::Launch(format!(
                        "service not found: {}",
                        config.service
                    )));
                }
                answer.services
            }
            Response::Error(e) => return Err(e.into_error()),
            other => {
                return Err(Error::Protocol(format!(
                    "expected Hello response, got {}",
                    other.name()
                )))
            }
        };

        stream.set_read_timeout(config.call_timeout)?;
        stream.set_write_timeout(config.call_timeout)?;
        debug!(peer = %addr, service = %config.service, "connected to backend");

        Ok(RemoteStore {
            conn: Mutex::new(conn),
            control: stream,
            peer: addr,
            services,
        })
    }

    /// Address of the backend.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Services the backend advertised.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Close the channel; later calls fail with a transport error.
    pub fn shutdown(&self) {
        let _ = self.control.shutdown(Shutdown::Both);
    }

    pub(crate) fn control_handle(&self) -> Result<TcpStream> {
        Ok(self.control.try_clone()?)
    }

    fn call(&self, request: Request) -> Result<Response> {
        let method = request.method();
        trace!(method, "remote call");
        let response = self.conn.lock().round_trip(&request)?;
        match response {
            Response::Error(e) => Err(e.into_error()),
            other => Ok(other),
        }
    }
}

fn unexpected(method: &str, response: &Response) -> Error {
    Error::Protocol(format!(
        "unexpected {} response to {}",
        response.name(),
        method
    ))
}

fn expect_empty(method: &str, response: Response) -> Result<()> {
    match response {
        Response::Empty => Ok(()),
        other => Err(unexpected(method, &other)),
    }
}

impl KvStore for RemoteStore {
    fn get(&self, bucket: &[u8], key: &[u8]) -> Result<Bytes> {
        match self.call(Request::Get(GetRequest {
            bucket: Bytes::copy_from_slice(bucket),
            key: Bytes::copy_from_slice(key),
        }))? {
            Response::Get(r) => Ok(r.value),
            other => Err(unexpected("Get", &other)),
        }
    }

    fn set(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> Result<()> {
        let response = self.call(Request::Set(SetRequest {
            bucket: Bytes::copy_from_slice(bucket),
            key: Bytes::copy_from_slice(key),
            value: Bytes::copy_from_slice(value),
        }))?;
        expect_empty("Set", response)
    }

    fn cmp_and_swap(
        &self,
        bucket: &[u8],
        key: &[u8],
        old_value: &[u8],
        new_value: &[u8],
    ) -> Result<(Bytes, bool)> {
        match self.call(Request::CmpAndSwap(CmpAndSwapRequest {
            bucket: Bytes::copy_from_slice(bucket),
            key: Bytes::copy_from_slice(key),
            old_value: Bytes::copy_from_slice(old_value),
            new_value: Bytes::copy_from_slice(new_value),
        }))? {
            Response::CmpAndSwap(r) => Ok((r.value, r.swapped)),
            other => Err(unexpected("CmpAndSwap", &other)),
        }
    }

    fn del(&self, bucket: &[u8], key: &[u8]) -> Result<()> {
        let response = self.call(Request::Del(DelRequest {
            bucket: Bytes::copy_from_slice(bucket),
            key: Bytes::copy_from_slice(key),
        }))?;
        expect_empty("Del", response)
    }

    fn list(&self, bucket: &[u8]) -> Result<Vec<Entry>> {
        match self.call(Request::List(ListRequest {
            bucket: Bytes::copy_from_slice(bucket),
        }))? {
            Response::List(r) => Ok(r.entries),
            other => Err(unexpected("List", &other)),
        }
    }

    fn update(&self, tx: &mut Transaction) -> Result<()> {
        match self.call(Request::Update(UpdateRequest {
            tx: encode_transaction(tx),
        }))? {
            Response::Update(r) => merge_results(tx, r.tx),
            Response::UpdateFailed(r) => {
                merge_results(tx, r.tx)?;
                Err(r.error.into_error())
            }
            other => Err(unexpected("Update", &other)),
        }
    }

    fn create_table(&self, bucket: &[u8]) -> Result<()> {
        let response = self.call(Request::CreateTable(CreateTableRequest {
            bucket: Bytes::copy_from_slice(bucket),
        }))?;
        expect_empty("CreateTable", response)
    }

    fn delete_table(&self, bucket: &[u8]) -> Result<()> {
        let response = self.call(Request::DeleteTable(DeleteTableRequest {
            bucket: Bytes::copy_from_slice(bucket),
        }))?;
        expect_empty("DeleteTable", response)
    }
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("peer", &self.peer)
            .field("services", &self.services)
            .finish()
    }
}
