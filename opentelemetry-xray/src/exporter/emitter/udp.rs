//! # X-Ray daemon UDP client
use super::SegmentEmitter;
use crate::exporter::env;
use crate::exporter::model::document::Document;
use crate::exporter::Error;
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Mutex;

/// Address the X-Ray daemon listens on by default.
pub const DEFAULT_DAEMON_ADDRESS: &str = "127.0.0.1:2000";

/// Precedes every document sent to the daemon.
const HEADER: &str = r#"{"format":"json","version":1}"#;

const EMITTER_NAME: &str = "udp";
const CONFIG_NAME: &str = "daemon address";

/// Sends each document to the X-Ray daemon as its own datagram.
///
/// The daemon address is either `host:port`, or a pair of protocol-prefixed
/// addresses such as `udp:127.0.0.1:2000 tcp:127.0.0.1:2000`, in which case
/// the `udp` one is used. IPv6 hosts are written in brackets, `[::1]:2000`.
#[derive(Debug)]
pub struct UdpDaemonEmitter {
    host: String,
    port: u16,
    socket: Mutex<Option<UdpSocket>>,
}

impl UdpDaemonEmitter {
    /// Emitter for the daemon at `AWS_XRAY_DAEMON_ADDRESS`, or
    /// [`DEFAULT_DAEMON_ADDRESS`] if unset.
    pub fn from_env() -> Result<Self, Error> {
        let address = env::get_daemon_address();
        Self::with_address(address.as_deref().unwrap_or(DEFAULT_DAEMON_ADDRESS))
    }

    /// Emitter for the daemon at `address`.
    ///
    /// Fails if the address is malformed or no socket can be opened.
    pub fn with_address(address: &str) -> Result<Self, Error> {
        let (host, port) = parse_daemon_address(address)?;
        let addrs = (host.as_str(), port).to_socket_addrs()?.collect::<Vec<_>>();
        let socket = UdpSocket::bind(address_family(&addrs))?;
        socket.connect(addrs.as_slice())?;
        Ok(UdpDaemonEmitter {
            host,
            port,
            socket: Mutex::new(Some(socket)),
        })
    }

    /// Host and port documents are sent to.
    pub fn daemon_address(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

#[async_trait]
impl SegmentEmitter for UdpDaemonEmitter {
    async fn emit(&self, documents: &[Document]) -> Result<(), Error> {
        let guard = self
            .socket
            .lock()
            .map_err(|_| Error::Other("daemon socket lock poisoned".into()))?;
        let socket = guard.as_ref().ok_or(Error::AlreadyShutdown)?;
        for document in documents {
            let datagram = format!("{HEADER}\n{}", serde_json::to_string(document)?);
            socket.send(datagram.as_bytes())?;
        }
        Ok(())
    }

    fn shutdown(&self) {
        if let Ok(mut socket) = self.socket.lock() {
            socket.take();
        }
    }
}

/// Wildcard address of the first resolved address's family.
fn address_family(addrs: &[SocketAddr]) -> SocketAddr {
    match addrs.first() {
        Some(SocketAddr::V4(_)) | None => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        Some(SocketAddr::V6(_)) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

fn invalid(reason: &str) -> Error {
    Error::ConfigError {
        emitter_name: EMITTER_NAME,
        config_name: CONFIG_NAME,
        reason: format!("Invalid Daemon Address. {reason}"),
    }
}

fn parse_daemon_address(address: &str) -> Result<(String, u16), Error> {
    if !address.contains(':') {
        return Err(invalid("You must specify an IP and port."));
    }

    let tokens: Vec<&str> = address.split_whitespace().collect();
    match tokens.as_slice() {
        [host_port] => parse_host_port(host_port),
        [first, second] => {
            let udp = [first, second]
                .into_iter()
                .find_map(|token| token.strip_prefix("udp:"))
                .ok_or_else(|| invalid("You must specify a udp address."))?;
            parse_host_port(udp)
        }
        _ => Err(invalid(
            "Expected 'host:port' or 'udp:host:port tcp:host:port'.",
        )),
    }
}

fn parse_host_port(address: &str) -> Result<(String, u16), Error> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("You must specify an IP and port."))?;
    let host = host
        .strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(invalid("You must specify an IP."));
    }
    let port = port
        .parse()
        .map_err(|_| invalid("You must specify a valid port."))?;
    Ok((host.to_string(), port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::env::ENV_DAEMON_ADDRESS;
    use std::time::Duration;

    fn address_test_data() -> Vec<(&'static str, Result<(&'static str, u16), &'static str>)> {
        vec![
            ("127.0.0.1:2000", Ok(("127.0.0.1", 2000))),
            ("xray-daemon:2100", Ok(("xray-daemon", 2100))),
            (
                "udp:10.0.0.1:3000 tcp:10.0.0.2:4000",
                Ok(("10.0.0.1", 3000)),
            ),
            (
                "tcp:10.0.0.2:4000 udp:10.0.0.1:3000",
                Ok(("10.0.0.1", 3000)),
            ),
            (
                "127.0.0.1",
                Err("Invalid Daemon Address. You must specify an IP and port."),
            ),
            ("[::1]:2000", Ok(("::1", 2000))),
            ("udp:[fd00::1]:3000 tcp:[fd00::1]:4000", Ok(("fd00::1", 3000))),
            (":2000", Err("Invalid Daemon Address. You must specify an IP.")),
            ("[]:2000", Err("Invalid Daemon Address. You must specify an IP.")),
            (
                "127.0.0.1:http",
                Err("Invalid Daemon Address. You must specify a valid port."),
            ),
            (
                "127.0.0.1:70000",
                Err("Invalid Daemon Address. You must specify a valid port."),
            ),
            (
                "tcp:10.0.0.2:4000 tcp:10.0.0.1:3000",
                Err("Invalid Daemon Address. You must specify a udp address."),
            ),
            (
                "udp:a:1 tcp:b:2 udp:c:3",
                Err("Invalid Daemon Address. Expected 'host:port' or 'udp:host:port tcp:host:port'."),
            ),
        ]
    }

    #[test]
    fn test_parse_daemon_address() {
        for (address, expected) in address_test_data() {
            let parsed = parse_daemon_address(address);
            match expected {
                Ok((host, port)) => {
                    assert_eq!(parsed.unwrap(), (host.to_string(), port), "{address}")
                }
                Err(reason) => match parsed {
                    Err(Error::ConfigError {
                        reason: actual,
                        emitter_name,
                        ..
                    }) => {
                        assert_eq!(actual, reason, "{address}");
                        assert_eq!(emitter_name, "udp");
                    }
                    other => panic!("{address}: expected config error, got {other:?}"),
                },
            }
        }
    }

    #[test]
    fn test_from_env() {
        temp_env::with_var(ENV_DAEMON_ADDRESS, Some("udp:127.0.0.1:2999 tcp:127.0.0.1:2000"), || {
            let emitter = UdpDaemonEmitter::from_env().unwrap();
            assert_eq!(emitter.daemon_address(), ("127.0.0.1", 2999));
        });
        temp_env::with_var_unset(ENV_DAEMON_ADDRESS, || {
            let emitter = UdpDaemonEmitter::from_env().unwrap();
            assert_eq!(emitter.daemon_address(), ("127.0.0.1", 2000));
        });
        temp_env::with_var(ENV_DAEMON_ADDRESS, Some("localhost"), || {
            assert!(matches!(
                UdpDaemonEmitter::from_env(),
                Err(Error::ConfigError { .. })
            ));
        });
    }

    fn document(id: &str) -> Document {
        Document::builder()
            .id(id.to_string())
            .name("work".to_string())
            .start_time(1_700_000_000.5)
            .build()
    }

    #[tokio::test]
    async fn test_one_datagram_per_document() {
        let daemon = UdpSocket::bind("127.0.0.1:0").unwrap();
        daemon
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let address = daemon.local_addr().unwrap().to_string();

        let emitter = UdpDaemonEmitter::with_address(&address).unwrap();
        emitter
            .emit(&[document("0000000000000001"), document("0000000000000002")])
            .await
            .unwrap();

        let mut buffer = [0u8; 1024];
        for id in ["0000000000000001", "0000000000000002"] {
            let len = daemon.recv(&mut buffer).unwrap();
            let datagram = std::str::from_utf8(&buffer[..len]).unwrap();
            let (header, body) = datagram.split_once('\n').unwrap();
            assert_eq!(header, r#"{"format":"json","version":1}"#);
            assert_eq!(
                serde_json::from_str::<serde_json::Value>(body).unwrap(),
                serde_json::json!({ "id": id, "name": "work", "start_time": 1_700_000_000.5 })
            );
        }
    }

    #[tokio::test]
    async fn test_ipv6_daemon() {
        // Hosts without IPv6 support cannot run this test.
        let Ok(daemon) = UdpSocket::bind("[::1]:0") else {
            return;
        };
        daemon
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let port = daemon.local_addr().unwrap().port();

        let emitter = UdpDaemonEmitter::with_address(&format!("[::1]:{port}")).unwrap();
        assert_eq!(emitter.daemon_address(), ("::1", port));
        emitter.emit(&[document("0000000000000001")]).await.unwrap();

        let mut buffer = [0u8; 1024];
        let len = daemon.recv(&mut buffer).unwrap();
        assert!(std::str::from_utf8(&buffer[..len])
            .unwrap()
            .contains(r#""id":"0000000000000001""#));
    }

    #[test]
    fn test_address_family() {
        let v4: SocketAddr = "127.0.0.1:2000".parse().unwrap();
        let v6: SocketAddr = "[::1]:2000".parse().unwrap();
        assert_eq!(address_family(&[v4]), "0.0.0.0:0".parse().unwrap());
        assert_eq!(address_family(&[v6, v4]), "[::]:0".parse().unwrap());
        assert_eq!(address_family(&[]), "0.0.0.0:0".parse().unwrap());
    }

    #[tokio::test]
    async fn test_emit_after_shutdown_fails() {
        let emitter = UdpDaemonEmitter::with_address(DEFAULT_DAEMON_ADDRESS).unwrap();
        emitter.shutdown();
        emitter.shutdown();
        assert!(matches!(
            emitter.emit(&[document("0000000000000001")]).await,
            Err(Error::AlreadyShutdown)
        ));
    }
}
