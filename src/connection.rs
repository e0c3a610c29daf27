//! Connection descriptors and MongoDB connection-string assembly.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::errors::BackupError;

pub const DEFAULT_SCHEME: &str = "mongodb";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_AUTH_DATABASE: &str = "admin";
const LOOPBACK: &str = "127.0.0.1";

// Same unreserved set as JavaScript's encodeURIComponent.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How the operator wants to describe the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMethod {
    Fields,
    Uri,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub auth_database: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .field("auth_database", &self.auth_database)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionDescriptor {
    Fields { scheme: String, host: String, port: u16, credentials: Option<Credentials> },
    Uri(String),
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionDescriptor({})", self.redacted())
    }
}

impl ConnectionDescriptor {
    /// Build a descriptor from structured fields using the `mongodb` scheme.
    ///
    /// # Errors
    /// Returns `InvalidConnection` for an empty host or username.
    pub fn from_fields(
        host: &str,
        port: u16,
        credentials: Option<Credentials>,
    ) -> Result<Self, BackupError> {
        Self::from_fields_with_scheme(DEFAULT_SCHEME, host, port, credentials)
    }

    pub fn from_fields_with_scheme(
        scheme: &str,
        host: &str,
        port: u16,
        credentials: Option<Credentials>,
    ) -> Result<Self, BackupError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(BackupError::InvalidConnection("host must not be empty".into()));
        }
        if let Some(c) = &credentials
            && c.username.is_empty()
        {
            return Err(BackupError::InvalidConnection("username must not be empty".into()));
        }
        Ok(Self::Fields { scheme: scheme.to_string(), host: host.to_string(), port, credentials })
    }

    /// Accept a raw connection string, normalizing `localhost` hosts to loopback.
    ///
    /// # Errors
    /// Returns `InvalidConnection` when the string has no `scheme://` prefix.
    pub fn from_uri(raw: &str) -> Result<Self, BackupError> {
        let raw = raw.trim();
        match raw.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {
                Ok(Self::Uri(normalize_localhost(raw)))
            }
            _ => Err(BackupError::InvalidConnection(
                "connection string must look like mongodb://host:port".into(),
            )),
        }
    }

    /// The connection string handed to the driver.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::Uri(uri) => uri.clone(),
            Self::Fields { scheme, host, port, credentials } => match credentials {
                None => format!("{scheme}://{host}:{port}"),
                Some(c) => format!(
                    "{scheme}://{}:{}@{host}:{port}/{db}?authSource={db}",
                    utf8_percent_encode(&c.username, USERINFO),
                    utf8_percent_encode(&c.password, USERINFO),
                    db = c.auth_database,
                ),
            },
        }
    }

    /// Connection string with the password masked, safe for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        mask_password(&self.uri())
    }
}

/// Parse a port number typed by the operator.
///
/// # Errors
/// Returns `InvalidConnection` when the text is not a port in 1..=65535.
pub fn parse_port(text: &str) -> Result<u16, BackupError> {
    match text.trim().parse::<u16>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(BackupError::InvalidConnection(format!("invalid port: {text:?}"))),
    }
}

/// Split `scheme://[userinfo@]hosts[/rest]` into (prefix through `@`, hosts, rest).
fn split_authority(uri: &str) -> Option<(&str, &str, &str)> {
    let start = uri.find("://")? + 3;
    let after = &uri[start..];
    let end = after.find(['/', '?']).map_or(uri.len(), |i| start + i);
    let authority = &uri[start..end];
    let hosts_at = authority.rfind('@').map_or(start, |i| start + i + 1);
    Some((&uri[..hosts_at], &uri[hosts_at..end], &uri[end..]))
}

fn normalize_localhost(uri: &str) -> String {
    let Some((prefix, hosts, rest)) = split_authority(uri) else { return uri.to_string() };
    let hosts = hosts
        .split(',')
        .map(|h| {
            let (name, port) = match h.rsplit_once(':') {
                Some((n, p)) => (n, Some(p)),
                None => (h, None),
            };
            let name = if name.eq_ignore_ascii_case("localhost") { LOOPBACK } else { name };
            match port {
                Some(p) => format!("{name}:{p}"),
                None => name.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{prefix}{hosts}{rest}")
}

fn mask_password(uri: &str) -> String {
    let Some((prefix, hosts, rest)) = split_authority(uri) else { return uri.to_string() };
    let start = uri.find("://").map_or(0, |i| i + 3);
    let userinfo = &prefix[start..];
    let Some(userinfo) = userinfo.strip_suffix('@') else { return uri.to_string() };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}{user}:****@{hosts}{rest}", &prefix[..start]),
        None => uri.to_string(),
    }
}
