//! `snmp://` URI parsing (RFC 4088).
//!
//! ```text
//! snmp://[<community>@]<host>[:<port>]/[<context>]/<path>
//! ```
//!
//! The path names the OIDs and, through its suffix, the operation:
//!
//! | path                  | operation |
//! |-----------------------|-----------|
//! | `1.3.6.1.2.1.1.5.0`   | GET       |
//! | `(a,b,c)`             | GET       |
//! | `a+` or `(a,b)+`      | GETNEXT   |
//! | `a.*` or `(a,b).*`    | WALK      |

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::engine::DEFAULT_PORT;
use crate::error::{Error, Result, UriErrorKind};
use crate::oid::Oid;

/// Default cap on the number of OIDs in one URI.
pub const DEFAULT_MAX_OIDS: usize = 50;

/// Community used when the URI has no userinfo.
pub const DEFAULT_COMMUNITY: &str = "public";

/// Operation selected by the URI path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Exact-match fetch of every OID.
    Get,
    /// Successor of every OID.
    GetNext,
    /// Every OID below each root.
    Walk,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Get => write!(f, "GET"),
            Operation::GetNext => write!(f, "GETNEXT"),
            Operation::Walk => write!(f, "WALK"),
        }
    }
}

/// A parsed `snmp://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnmpUri {
    /// Percent-decoded community string.
    pub community: Bytes,
    /// Host name or address; IPv6 without brackets.
    pub host: String,
    /// Agent port.
    pub port: u16,
    /// Context segment, if present. Not used by v1/v2c.
    pub context: Option<String>,
    /// Operation selected by the path suffix.
    pub operation: Operation,
    /// OIDs in path order; walk roots for [`Operation::Walk`].
    pub oids: Vec<Oid>,
}

impl SnmpUri {
    /// Parse `uri`, allowing at most `max_oids` OIDs.
    ///
    /// The OID count is checked on the raw list before any OID is parsed, so
    /// an oversized list fails with [`Error::TooManyOids`] even if some of its
    /// entries are malformed.
    ///
    /// ```
    /// use snmp_query::uri::{Operation, SnmpUri};
    ///
    /// let uri = SnmpUri::parse("snmp://public@192.0.2.1//(1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.1.2.0)", 50)?;
    /// assert_eq!(uri.operation, Operation::Get);
    /// assert_eq!(uri.oids.len(), 2);
    /// assert_eq!(uri.port, 161);
    /// # Ok::<(), snmp_query::Error>(())
    /// ```
    pub fn parse(uri: &str, max_oids: usize) -> Result<Self> {
        let bad_uri = |kind| Error::invalid_uri(uri, kind);

        let (scheme, rest) = uri.split_once("://").ok_or_else(|| bad_uri(UriErrorKind::BadScheme))?;
        if !scheme.eq_ignore_ascii_case("snmp") {
            return Err(bad_uri(UriErrorKind::BadScheme));
        }

        let (authority, rest) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };

        let (community, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (
                percent_decode(userinfo).ok_or_else(|| bad_uri(UriErrorKind::BadPercentEncoding))?,
                hostport,
            ),
            None => (Bytes::from_static(DEFAULT_COMMUNITY.as_bytes()), authority),
        };

        let (host, port) = split_host_port(hostport).map_err(bad_uri)?;

        // `<context>/<path>`; both slashes are required for a path.
        let Some((context, path)) = rest.split_once('/') else {
            return Err(Error::invalid_path(rest, UriErrorKind::MissingPath));
        };
        if path.is_empty() {
            return Err(Error::invalid_path(path, UriErrorKind::MissingPath));
        }

        let (operation, body) = split_operation(path);

        let count = count_items(body);
        if count > max_oids {
            tracing::debug!(target: "snmp_query::uri", { count, max = max_oids }, "too many OIDs in URI");
            return Err(Error::TooManyOids {
                count,
                max: max_oids,
            });
        }

        let oids = parse_oid_list(body)?;

        tracing::debug!(target: "snmp_query::uri", { snmp.host = %host, snmp.port = port, operation = %operation, snmp.oid_count = oids.len() }, "parsed URI");

        Ok(Self {
            community,
            host: host.to_string(),
            port,
            context: (!context.is_empty()).then(|| context.to_string()),
            operation,
            oids,
        })
    }
}

impl FromStr for SnmpUri {
    type Err = Error;

    /// Parse with the default OID cap.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, DEFAULT_MAX_OIDS)
    }
}

fn split_host_port(hostport: &str) -> std::result::Result<(&str, u16), UriErrorKind> {
    let (host, port) = if let Some(bracketed) = hostport.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or(UriErrorKind::UnclosedBracket)?;
        match after {
            "" => (host, None),
            _ => (
                host,
                Some(after.strip_prefix(':').ok_or(UriErrorKind::BadPort)?),
            ),
        }
    } else {
        match hostport.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (hostport, None),
        }
    };

    if host.is_empty() {
        return Err(UriErrorKind::MissingHost);
    }

    let port = match port {
        None => DEFAULT_PORT,
        Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => {
            p.parse().map_err(|_| UriErrorKind::BadPort)?
        }
        Some(_) => return Err(UriErrorKind::BadPort),
    };

    Ok((host, port))
}

/// Strip the operation suffix from a path.
fn split_operation(path: &str) -> (Operation, &str) {
    if let Some(body) = path.strip_suffix('*') {
        (Operation::Walk, body.strip_suffix('.').unwrap_or(body))
    } else if let Some(body) = path.strip_suffix('+') {
        (Operation::GetNext, body)
    } else {
        (Operation::Get, path)
    }
}

/// Number of comma-separated entries in the OID list of `body`.
///
/// Counts the same slice [`parse_oid_list`] splits, whether or not the list is
/// parenthesised.
fn count_items(body: &str) -> usize {
    let items = match body.strip_prefix('(') {
        Some(inner) => inner.split_once(')').map_or(inner, |(list, _)| list),
        None => body,
    };
    items.split(',').count()
}

fn parse_oid_list(body: &str) -> Result<Vec<Oid>> {
    let items = match body.strip_prefix('(') {
        Some(inner) => {
            let Some(close) = inner.find(')') else {
                return Err(Error::invalid_path(body, UriErrorKind::UnbalancedParens));
            };
            let trailing = &inner[close + 1..];
            if !trailing.is_empty() {
                let kind = if trailing.contains(['(', ')']) {
                    UriErrorKind::UnbalancedParens
                } else {
                    UriErrorKind::TrailingGarbage
                };
                return Err(Error::invalid_path(trailing, kind));
            }
            &inner[..close]
        }
        None if body.contains(',') && !body.contains(['(', ')']) => {
            return Err(Error::invalid_path(body, UriErrorKind::UnparenthesizedList));
        }
        None => body,
    };

    if items.contains(['(', ')']) {
        return Err(Error::invalid_path(body, UriErrorKind::UnbalancedParens));
    }

    items
        .split(',')
        .map(|item| {
            if item.is_empty() {
                return Err(Error::invalid_path(body, UriErrorKind::EmptyOid));
            }
            Oid::parse(item).map_err(|e| {
                tracing::debug!(target: "snmp_query::uri", { item, error = %e }, "bad OID in path");
                Error::invalid_path(item, UriErrorKind::BadOid)
            })
        })
        .collect()
}

fn percent_decode(s: &str) -> Option<Bytes> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(Bytes::from(out))
}
