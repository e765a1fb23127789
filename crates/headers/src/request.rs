//! Request header collection.
//!
//! Knows the ~50 request identities plus the five HTTP/2 and HTTP/3
//! pseudo-headers. Values are *not* validated on generic set — request
//! values arrive from the wire, where the parser opts into the newline
//! check instead.

use std::ops::{Deref, DerefMut};

use crate::collection::Headers;
use crate::error::HeaderError;
use crate::table::REQUEST_TABLE;
use crate::utils::typed_headers;
use crate::value::HeaderValues;

// pseudo-header slots, in REQUEST_HEADER_NAMES order
const AUTHORITY: usize = 19;
const METHOD: usize = 20;
const PATH: usize = 21;
const SCHEME: usize = 22;
const PROTOCOL: usize = 23;

/// Headers of one in-flight request.
///
/// Dereferences to [`Headers`] for ingestion, the generic dictionary
/// contract, and the pooled-reuse lifecycle.
#[derive(Debug)]
pub struct RequestHeaders {
    inner: Headers,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self { inner: Headers::with_table(&REQUEST_TABLE) }
    }

    /// Detaches the protocol pseudo-headers (`:method`, `:path`, `:scheme`,
    /// `:authority`, `:protocol`) from the collection, so the host can
    /// consume them before exposing the rest as ordinary headers. The
    /// detached slots read as absent afterwards.
    pub fn take_pseudo(&mut self) -> PseudoHeaders {
        PseudoHeaders {
            method: self.take_pseudo_slot(METHOD),
            path: self.take_pseudo_slot(PATH),
            scheme: self.take_pseudo_slot(SCHEME),
            authority: self.take_pseudo_slot(AUTHORITY),
            protocol: self.take_pseudo_slot(PROTOCOL),
        }
    }

    fn take_pseudo_slot(&mut self, slot: usize) -> Option<String> {
        debug_assert!(self.inner.table.pseudo_mask() & (1 << slot) != 0);
        let flag = 1u64 << slot;
        self.inner.previous_bits &= !flag;
        if self.inner.bits & flag == 0 {
            return None;
        }
        self.inner.bits &= !flag;
        self.inner.values[slot].take().into_first()
    }

    /// Fast existence probe for `Connection` (keep-alive decisions).
    pub fn has_connection(&self) -> bool {
        self.inner.values_ref(1).is_some()
    }

    /// Fast existence probe for `Transfer-Encoding`.
    pub fn has_transfer_encoding(&self) -> bool {
        self.inner.values_ref(6).is_some()
    }

    /// Number of `Host` values received (exactly one is legal in HTTP/1.1;
    /// the host enforces that, this just counts).
    pub fn host_count(&self) -> usize {
        self.inner.values_ref(32).map_or(0, HeaderValues::len)
    }

    typed_headers! {
        0 => "Cache-Control", cache_control, set_cache_control;
        1 => "Connection", connection, set_connection;
        2 => "Date", date, set_date;
        3 => "Keep-Alive", keep_alive, set_keep_alive;
        4 => "Pragma", pragma, set_pragma;
        5 => "Trailer", trailer, set_trailer;
        6 => "Transfer-Encoding", transfer_encoding, set_transfer_encoding;
        7 => "Upgrade", upgrade, set_upgrade;
        8 => "Via", via, set_via;
        9 => "Warning", warning, set_warning;
        10 => "Allow", allow, set_allow;
        11 => "Content-Type", content_type, set_content_type;
        12 => "Content-Encoding", content_encoding, set_content_encoding;
        13 => "Content-Language", content_language, set_content_language;
        14 => "Content-Location", content_location, set_content_location;
        15 => "Content-MD5", content_md5, set_content_md5;
        16 => "Content-Range", content_range, set_content_range;
        17 => "Expires", expires, set_expires;
        18 => "Last-Modified", last_modified, set_last_modified;
        19 => ":authority", authority, set_authority;
        20 => ":method", method, set_method;
        21 => ":path", path, set_path;
        22 => ":scheme", scheme, set_scheme;
        23 => ":protocol", protocol, set_protocol;
        24 => "Accept", accept, set_accept;
        25 => "Accept-Charset", accept_charset, set_accept_charset;
        26 => "Accept-Encoding", accept_encoding, set_accept_encoding;
        27 => "Accept-Language", accept_language, set_accept_language;
        28 => "Authorization", authorization, set_authorization;
        29 => "Cookie", cookie, set_cookie;
        30 => "Expect", expect, set_expect;
        31 => "From", from, set_from;
        32 => "Host", host, set_host;
        33 => "If-Match", if_match, set_if_match;
        34 => "If-Modified-Since", if_modified_since, set_if_modified_since;
        35 => "If-None-Match", if_none_match, set_if_none_match;
        36 => "If-Range", if_range, set_if_range;
        37 => "If-Unmodified-Since", if_unmodified_since, set_if_unmodified_since;
        38 => "Max-Forwards", max_forwards, set_max_forwards;
        39 => "Proxy-Authorization", proxy_authorization, set_proxy_authorization;
        40 => "Referer", referer, set_referer;
        41 => "Range", range, set_range;
        42 => "TE", te, set_te;
        43 => "Translate", translate, set_translate;
        44 => "User-Agent", user_agent, set_user_agent;
        45 => "DNT", dnt, set_dnt;
        46 => "Upgrade-Insecure-Requests", upgrade_insecure_requests, set_upgrade_insecure_requests;
        47 => "Request-Id", request_id, set_request_id;
        48 => "Correlation-Context", correlation_context, set_correlation_context;
        49 => "TraceParent", traceparent, set_traceparent;
        50 => "TraceState", tracestate, set_tracestate;
        51 => "Origin", origin, set_origin;
        52 => "Access-Control-Request-Method", access_control_request_method, set_access_control_request_method;
        53 => "Access-Control-Request-Headers", access_control_request_headers, set_access_control_request_headers;
    }
}

impl Default for RequestHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for RequestHeaders {
    type Target = Headers;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for RequestHeaders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

/// The protocol pseudo-headers detached from a request collection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PseudoHeaders {
    pub method: Option<String>,
    pub path: Option<String>,
    pub scheme: Option<String>,
    pub authority: Option<String>,
    pub protocol: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_agree_with_generic_lookup() {
        let mut headers = RequestHeaders::new();
        headers.append(b"hOsT", b"example.com", false).unwrap();

        assert_eq!(headers.host().unwrap().first(), Some("example.com"));
        assert_eq!(headers.get("Host").unwrap().first(), Some("example.com"));

        headers.set_user_agent("curl/8.5.0").unwrap();
        assert_eq!(headers.get("user-agent").unwrap().first(), Some("curl/8.5.0"));
        assert_eq!(headers.user_agent().unwrap().first(), Some("curl/8.5.0"));
    }

    #[test]
    fn typed_set_empty_removes() {
        let mut headers = RequestHeaders::new();
        headers.set_accept("*/*").unwrap();
        assert!(headers.contains("Accept"));

        headers.set_accept("").unwrap();
        assert!(headers.accept().is_none());
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn pseudo_headers_are_detached_as_a_unit() {
        let mut headers = RequestHeaders::new();
        headers.append(b":method", b"GET", false).unwrap();
        headers.append(b":path", b"/index.html", false).unwrap();
        headers.append(b":scheme", b"https", false).unwrap();
        headers.append(b":authority", b"example.com", false).unwrap();
        headers.append(b"Accept", b"*/*", false).unwrap();

        let pseudo = headers.take_pseudo();
        assert_eq!(pseudo.method.as_deref(), Some("GET"));
        assert_eq!(pseudo.path.as_deref(), Some("/index.html"));
        assert_eq!(pseudo.scheme.as_deref(), Some("https"));
        assert_eq!(pseudo.authority.as_deref(), Some("example.com"));
        assert_eq!(pseudo.protocol, None);

        // only the ordinary header remains visible
        assert_eq!(headers.len(), 1);
        assert!(headers.method().is_none());
        assert!(!headers.contains(":path"));
        assert!(headers.contains("Accept"));
    }

    #[test]
    fn existence_probes_and_host_count() {
        let mut headers = RequestHeaders::new();
        assert!(!headers.has_connection());
        assert_eq!(headers.host_count(), 0);

        headers.append(b"Connection", b"keep-alive", false).unwrap();
        headers.append(b"Host", b"a", false).unwrap();
        headers.append(b"Host", b"b", false).unwrap();

        assert!(headers.has_connection());
        assert!(!headers.has_transfer_encoding());
        assert_eq!(headers.host_count(), 2);
    }

    #[test]
    fn host_header_end_to_end() {
        let mut headers = RequestHeaders::new();
        headers.append(b"Host", b"example.com", false).unwrap();
        assert_eq!(headers.get("host").unwrap().iter().collect::<Vec<_>>(), ["example.com"]);

        // the engine itself always appends; single-Host policy is the host's
        headers.append(b"Host", b"example.org", false).unwrap();
        assert_eq!(
            headers.get("host").unwrap().iter().collect::<Vec<_>>(),
            ["example.com", "example.org"]
        );
    }
}
