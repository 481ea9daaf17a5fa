//! Per-session HTTP proxy settings
//!
//! Holds the proxy endpoint and the preformatted `Proxy-Authorization` line
//! that the negotiator copies verbatim into every CONNECT request.

use std::fmt;

use url::{Host, Url};

use super::auth::basic_auth_value;
use crate::error::{self, Result};

const AUTH_HEADER_PREFIX: &str = "Proxy-Authorization: ";
const CRLF: &str = "\r\n";
const LINE_BREAKS: [char; 2] = ['\r', '\n'];

/// HTTP proxy configuration owned by one client session.
///
/// An unset config (`host() == None`) cannot be used for tunneling.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    host: Option<String>,
    port: u16,
    auth_header_line: Option<String>,
}

impl ProxyConfig {
    /// Creates an unset configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration in one step; see [`ProxyConfig::configure`].
    ///
    /// # Errors
    ///
    /// Same as [`ProxyConfig::configure`].
    pub fn with<P: TryInto<u16>>(host: &str, port: P, auth_value: Option<&str>) -> Result<Self> {
        let mut config = Self::new();
        config.configure(host, port, auth_value)?;
        Ok(config)
    }

    /// Builds a configuration from an `http://[user[:password]@]host[:port]` URL.
    ///
    /// Userinfo is percent-decoded and turned into a Basic credential. A URL
    /// without a port uses the scheme default (80).
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the URL does not parse, is not `http`, or has no host.
    pub fn from_url(proxy_url: &str) -> Result<Self> {
        let url = Url::parse(proxy_url)
            .map_err(|e| error::invalid_argument(format!("invalid proxy URL: {e}")))?;

        if url.scheme() != "http" {
            return Err(error::invalid_argument(format!(
                "unsupported proxy scheme: {}",
                url.scheme()
            )));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(error::invalid_argument("proxy URL missing host")),
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let auth_value = if url.username().is_empty() {
            None
        } else {
            let username = urlencoding::decode(url.username())
                .map_err(|e| error::invalid_argument(format!("invalid proxy username: {e}")))?;
            let password = urlencoding::decode(url.password().unwrap_or(""))
                .map_err(|e| error::invalid_argument(format!("invalid proxy password: {e}")))?;
            Some(basic_auth_value(&username, &password))
        };

        Self::with(&host, port, auth_value.as_deref())
    }

    /// Validates and applies new proxy settings, replacing any previous ones.
    ///
    /// `auth_value` is the already-encoded header value, e.g. `Basic dXNlcjpwYXNz`;
    /// when present and non-empty the line `Proxy-Authorization: <value>\r\n`
    /// is stored for direct inclusion in requests.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `host` is empty, `port` is outside `1..=65535`,
    ///   or `host` or `auth_value` contains CR or LF; the previous
    ///   configuration is left untouched.
    /// - `OutOfMemory` if an owned copy cannot be allocated; the configuration
    ///   is left unset.
    pub fn configure<P: TryInto<u16>>(
        &mut self,
        host: &str,
        port: P,
        auth_value: Option<&str>,
    ) -> Result<()> {
        if host.is_empty() {
            return Err(error::invalid_argument("proxy host must not be empty"));
        }
        if host.contains(LINE_BREAKS)
            || auth_value.is_some_and(|value| value.contains(LINE_BREAKS))
        {
            return Err(error::invalid_argument(
                "proxy host and auth value must not contain CR or LF",
            ));
        }
        let port = match TryInto::<u16>::try_into(port) {
            Ok(port) if port != 0 => port,
            _ => return Err(error::invalid_argument("proxy port must be in 1..=65535")),
        };

        self.clear();

        self.host = Some(owned_copy(&[host])?);
        self.port = port;

        if let Some(value) = auth_value.filter(|value| !value.is_empty()) {
            match owned_copy(&[AUTH_HEADER_PREFIX, value, CRLF]) {
                Ok(line) => self.auth_header_line = Some(line),
                Err(e) => {
                    self.clear();
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            proxy.host = %host,
            proxy.port = port,
            auth = self.auth_header_line.is_some(),
            "Proxy configured"
        );

        Ok(())
    }

    /// Returns the configuration to the unset state, releasing owned strings.
    pub fn clear(&mut self) {
        self.host = None;
        self.port = 0;
        self.auth_header_line = None;
    }

    /// Returns true once a host has been configured.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.host.is_some()
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the proxy port, or 0 while unset.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the full `Proxy-Authorization: ...\r\n` line, if any.
    #[must_use]
    pub fn auth_header_line(&self) -> Option<&str> {
        self.auth_header_line.as_deref()
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "auth_header_line",
                &self.auth_header_line.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Concatenates `parts` into a string allocated with a fallible reservation.
fn owned_copy(parts: &[&str]) -> Result<String> {
    let len: usize = parts.iter().map(|part| part.len()).sum();
    let mut owned = String::new();
    owned.try_reserve_exact(len).map_err(error::out_of_memory)?;
    for part in parts {
        owned.push_str(part);
    }
    Ok(owned)
}
