//! Network and address parsing
//!
//! Addresses are parsed once into the connection target the pool dials and
//! the host/port labels segments carry.

use redis::{
    ConnectionAddr, ConnectionInfo, ErrorKind, IntoConnectionInfo, RedisConnectionInfo,
    RedisError, RedisResult,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Transport used to reach Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Tcp,
    Unix,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Tcp => "tcp",
            Network::Unix => "unix",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" | "tcp4" | "tcp6" => Ok(Network::Tcp),
            "unix" => Ok(Network::Unix),
            other => Err(NetworkParseError(other.to_string())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported network: {0} (expected tcp, tcp4, tcp6 or unix)")]
pub struct NetworkParseError(pub String);

/// Host and port (or socket path) labels for segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub host: String,
    pub port_path_or_id: String,
}

/// Parsed address: the connection target to dial plus the labels derived from it
#[derive(Debug, Clone)]
pub struct ParsedAddress {
    pub info: ConnectionInfo,
    pub peer: PeerAddress,
}

/// Parse `addr` for `network`.
///
/// TCP accepts a full Redis URL or a bare `host[:port]`, parsed with the
/// Redis client's own URL rules. Unix takes the socket path verbatim, so
/// relative paths and characters such as `?`, `#` or `%` are kept as is.
/// A URL whose transport disagrees with `network` is rejected.
pub fn parse_address(network: Network, addr: &str) -> RedisResult<ParsedAddress> {
    let info = match network {
        Network::Tcp if addr.contains("://") => addr.into_connection_info()?,
        Network::Tcp => format!("redis://{}", addr).into_connection_info()?,
        Network::Unix if addr.is_empty() => {
            return Err(RedisError::from((
                ErrorKind::InvalidClientConfig,
                "Missing socket path",
            )));
        }
        Network::Unix => ConnectionInfo {
            addr: ConnectionAddr::Unix(PathBuf::from(addr)),
            redis: RedisConnectionInfo::default(),
        },
    };

    let peer = match (&info.addr, network) {
        (ConnectionAddr::Tcp(host, port), Network::Tcp)
        | (ConnectionAddr::TcpTls { host, port, .. }, Network::Tcp) => PeerAddress {
            host: host.clone(),
            port_path_or_id: port.to_string(),
        },
        (ConnectionAddr::Unix(path), Network::Unix) => PeerAddress {
            host: "localhost".to_string(),
            port_path_or_id: path.display().to_string(),
        },
        (ConnectionAddr::Unix(_), Network::Tcp) => {
            return Err(RedisError::from((
                ErrorKind::InvalidClientConfig,
                "Address transport does not match network",
                format!("{} is a unix socket URL, expected tcp", addr),
            )));
        }
        _ => {
            return Err(RedisError::from((
                ErrorKind::InvalidClientConfig,
                "Unsupported connection address",
                addr.to_string(),
            )));
        }
    };

    Ok(ParsedAddress { info, peer })
}
