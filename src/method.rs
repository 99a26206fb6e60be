//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 methods. Any other token is kept as
//! [`Method::Other`] so the request still runs through the middleware chain;
//! the router answers it with `405 Method Not Allowed`.

use std::fmt;

/// An HTTP request method.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    /// A method token outside RFC 9110, e.g. `PURGE`.
    Other(String),
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
            Self::Other(token) => token,
        }
    }

    /// Whether this is one of the RFC 9110 methods.
    pub fn is_standard(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Maps a method token to its variant. Case-sensitive per RFC 9110 §9.1, so
/// `"get"` is [`Method::Other`].
impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s {
            "CONNECT" => Self::Connect,
            "DELETE"  => Self::Delete,
            "GET"     => Self::Get,
            "HEAD"    => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH"   => Self::Patch,
            "POST"    => Self::Post,
            "PUT"     => Self::Put,
            "TRACE"   => Self::Trace,
            other     => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
