//! Response header collection and its wire serializer.
//!
//! The response variant validates value characters eagerly on every set, can
//! be frozen with [`Headers::set_read_only`] once the response is committed,
//! and carries raw line caches for the five headers most likely to repeat
//! byte-for-byte across responses (Connection, Date, Server, Alt-Svc,
//! Transfer-Encoding). A raw cache is installed explicitly by the host and
//! invalidated by any set or remove that touches the slot, so serialization
//! can never emit stale bytes.

use std::ops::{Deref, DerefMut};

use bytes::Bytes;

use crate::collection::Headers;
use crate::encoding::HeaderSink;
use crate::error::HeaderError;
use crate::table::RESPONSE_TABLE;
use crate::utils::typed_headers;
use crate::value::HeaderValues;

// raw-cache slots, in RESPONSE_HEADER_NAMES order
const CONNECTION: usize = 1;
const DATE: usize = 2;
const TRANSFER_ENCODING: usize = 6;
const ALT_SVC: usize = 21;
const SERVER: usize = 26;

const CONTENT_LENGTH_PREFIX: &[u8] = b"\r\nContent-Length: ";

/// Headers of one outgoing response.
#[derive(Debug)]
pub struct ResponseHeaders {
    inner: Headers,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self { inner: Headers::with_table(&RESPONSE_TABLE) }
    }

    /// Writes every present header to the sink, one `\r\n`-prefixed line per
    /// value: Content-Length first (rendered digit-by-digit, no intermediate
    /// string), then known slots in bit order, then overflow entries in
    /// insertion order. The status line precedes this output and the caller
    /// terminates the header section, so no trailing blank line is written
    /// here.
    ///
    /// Raw-cached headers are emitted verbatim, skipping name lookup and
    /// value formatting entirely.
    pub fn write_to<S: HeaderSink>(&self, sink: &mut S) {
        if let Some(length) = self.inner.content_length {
            sink.put_slice(CONTENT_LENGTH_PREFIX);
            sink.put_dec(length);
        }

        let mut remaining = self.inner.bits;
        while remaining != 0 {
            let slot = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;

            if let Some(index) = self.inner.table.raw_slot(slot) {
                if let Some(raw) = &self.inner.raw[index] {
                    sink.put_slice(raw);
                    continue;
                }
            }

            let prefix = self.inner.table.prefix(slot);
            let codec = self.inner.codec_for(self.inner.table.name(slot));
            for value in &self.inner.values[slot] {
                sink.put_slice(prefix);
                match codec {
                    Some(codec) => sink.put_encoded(value, codec),
                    None => sink.put_ascii(value),
                }
            }
        }

        if let Some(overflow) = &self.inner.overflow {
            for (name, values) in overflow.entries() {
                let codec = self.inner.codec_for(name);
                for value in values {
                    sink.put_slice(b"\r\n");
                    sink.put_ascii(name);
                    sink.put_slice(b": ");
                    match codec {
                        Some(codec) => sink.put_encoded(value, codec),
                        None => sink.put_ascii(value),
                    }
                }
            }
        }
    }

    /// Installs `Connection` together with its pre-rendered line bytes.
    pub fn set_raw_connection(&mut self, value: impl Into<HeaderValues>, raw: Bytes) -> Result<(), HeaderError> {
        self.inner.set_slot_raw(CONNECTION, value.into(), raw)
    }

    /// Installs `Date` together with its pre-rendered line bytes.
    pub fn set_raw_date(&mut self, value: impl Into<HeaderValues>, raw: Bytes) -> Result<(), HeaderError> {
        self.inner.set_slot_raw(DATE, value.into(), raw)
    }

    /// Installs `Server` together with its pre-rendered line bytes.
    pub fn set_raw_server(&mut self, value: impl Into<HeaderValues>, raw: Bytes) -> Result<(), HeaderError> {
        self.inner.set_slot_raw(SERVER, value.into(), raw)
    }

    /// Installs `Alt-Svc` together with its pre-rendered line bytes.
    pub fn set_raw_alt_svc(&mut self, value: impl Into<HeaderValues>, raw: Bytes) -> Result<(), HeaderError> {
        self.inner.set_slot_raw(ALT_SVC, value.into(), raw)
    }

    /// Installs `Transfer-Encoding` together with its pre-rendered line bytes.
    pub fn set_raw_transfer_encoding(&mut self, value: impl Into<HeaderValues>, raw: Bytes) -> Result<(), HeaderError> {
        self.inner.set_slot_raw(TRANSFER_ENCODING, value.into(), raw)
    }

    /// Fast existence probe for `Connection`.
    pub fn has_connection(&self) -> bool {
        self.inner.values_ref(CONNECTION).is_some()
    }

    /// Fast existence probe for `Server`.
    pub fn has_server(&self) -> bool {
        self.inner.values_ref(SERVER).is_some()
    }

    /// Fast existence probe for `Date`.
    pub fn has_date(&self) -> bool {
        self.inner.values_ref(DATE).is_some()
    }

    /// Fast existence probe for `Transfer-Encoding`.
    pub fn has_transfer_encoding(&self) -> bool {
        self.inner.values_ref(TRANSFER_ENCODING).is_some()
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
        19 => "Accept-Ranges", accept_ranges, set_accept_ranges;
        20 => "Age", age, set_age;
        21 => "Alt-Svc", alt_svc, set_alt_svc;
        22 => "ETag", etag, set_etag;
        23 => "Location", location, set_location;
        24 => "Proxy-Authenticate", proxy_authenticate, set_proxy_authenticate;
        25 => "Retry-After", retry_after, set_retry_after;
        26 => "Server", server, set_server;
        27 => "Set-Cookie", set_cookie, set_set_cookie;
        28 => "Vary", vary, set_vary;
        29 => "WWW-Authenticate", www_authenticate, set_www_authenticate;
        30 => "Access-Control-Allow-Credentials", access_control_allow_credentials, set_access_control_allow_credentials;
        31 => "Access-Control-Allow-Headers", access_control_allow_headers, set_access_control_allow_headers;
        32 => "Access-Control-Allow-Methods", access_control_allow_methods, set_access_control_allow_methods;
        33 => "Access-Control-Allow-Origin", access_control_allow_origin, set_access_control_allow_origin;
        34 => "Access-Control-Expose-Headers", access_control_expose_headers, set_access_control_expose_headers;
        35 => "Access-Control-Max-Age", access_control_max_age, set_access_control_max_age;
    }
}

impl Default for ResponseHeaders {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ResponseHeaders {
    type Target = Headers;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ResponseHeaders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
