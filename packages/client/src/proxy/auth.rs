//! Proxy credential encoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode basic authentication credentials into a `Proxy-Authorization` value.
///
/// The result (`Basic <base64(user:password)>`) is what
/// [`ProxyConfig::configure`](super::ProxyConfig::configure) expects as its
/// auth value.
#[must_use]
pub fn basic_auth_value(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_user_and_password() {
        assert_eq!(basic_auth_value("user", "pass"), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn empty_password_keeps_separator() {
        assert_eq!(basic_auth_value("user", ""), "Basic dXNlcjo=");
    }
}
