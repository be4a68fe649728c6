//! Connection descriptors.
//!
//! A descriptor is a URL-like string naming a backend kind by its scheme
//! and passing parameters in the query:
//!
//! ```text
//! memory://
//! plugin:///?cmd=/usr/local/bin/nosql-memory-backend
//! plugin:///?cmd=/opt/backend+--verbose
//! ```
//!
//! Query values are percent-decoded and `+` stands for a space.

use std::fmt;
use std::str::FromStr;

use nosql_core::{Error, Result};

/// Query parameter holding the backend command line.
pub const CMD_PARAM: &str = "cmd";

/// A parsed connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    raw: String,
    scheme: String,
    path: String,
    params: Vec<(String, String)>,
}

impl ConnectionDescriptor {
    /// Parse `scheme:[//]path[?query]`.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let (scheme, rest) = descriptor
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("descriptor has no scheme: {:?}", descriptor)))?;
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(Error::Config(format!(
                "invalid descriptor scheme: {:?}",
                scheme
            )));
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let mut params = Vec::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.push((percent_decode(name)?, percent_decode(value)?));
        }

        Ok(ConnectionDescriptor {
            raw: descriptor.to_string(),
            scheme: scheme.to_ascii_lowercase(),
            path: percent_decode(path)?,
            params,
        })
    }

    /// Lowercased scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Decoded path component.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `cmd` parameter; a configuration error when absent or blank.
    pub fn launch_command(&self) -> Result<&str> {
        match self.param(CMD_PARAM) {
            Some(cmd) if !cmd.trim().is_empty() => Ok(cmd),
            _ => Err(Error::Config(format!(
                "descriptor {:?} is missing the `{}` parameter",
                self.raw, CMD_PARAM
            ))),
        }
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConnectionDescriptor::parse(s)
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn percent_decode(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        Error::Config(format!("invalid percent escape in {:?}", input))
                    })?;
                out.push(hex);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| Error::Config(format!("{:?} is not valid UTF-8", input)))
}
