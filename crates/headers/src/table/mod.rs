//! Per-variant known-header slot tables.
//!
//! A [`SlotTable`] is the immutable description of one collection variant:
//! the canonical name and bit index of every known header, the
//! length-bucketed masked patterns used to recognize names without hashing,
//! the pre-rendered `\r\nName: ` serializer prefixes, and the
//! HPACK/QPACK static-index resolution arrays. The three variant tables
//! (request, response, trailers) are generated once, on first use, from their
//! canonical name lists — bit indices are simply list positions, dense and
//! stable for the lifetime of the program.
//!
//! Content-Length is deliberately *not* a slot. It is always numeric, stored
//! as an integer by the collection, so the matcher reports it as a distinct
//! outcome instead of a slot index.

mod static_tables;

use once_cell::sync::Lazy;

use crate::matcher::NamePattern;
use self::static_tables::{HPACK_LEN, HPACK_STATIC_NAMES, QPACK_LEN, QPACK_STATIC_NAMES};

/// Canonical spelling of the specialized integer header.
pub(crate) const CONTENT_LENGTH: &str = "Content-Length";

/// Bucket entry standing in for the Content-Length pattern.
const CONTENT_LENGTH_ENTRY: u16 = u16::MAX;

/// One known header identity, shared by every instance of a variant.
#[derive(Debug)]
pub struct KnownHeader {
    name: &'static str,
    prefix: Box<[u8]>,
    pattern: NamePattern,
    raw_slot: Option<usize>,
    pseudo: bool,
}

/// Outcome of resolving a name or a static-table index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NameMatch {
    /// A known slot's bit index.
    Slot(usize),
    /// The specialized Content-Length field.
    ContentLength,
    /// No known identity; the caller falls back to the overflow map.
    Unknown,
}

/// The static descriptor for one collection variant.
#[derive(Debug)]
pub struct SlotTable {
    variant: &'static str,
    slots: Box<[KnownHeader]>,
    /// Name-length buckets of candidate slot indices.
    buckets: Box<[Vec<u16>]>,
    content_length: Option<NamePattern>,
    hpack: [NameMatch; HPACK_LEN],
    qpack: [NameMatch; QPACK_LEN],
    pseudo_mask: u64,
    raw_count: usize,
    validate_on_set: bool,
}

impl SlotTable {
    fn build(
        variant: &'static str,
        names: &[&'static str],
        has_content_length: bool,
        validate_on_set: bool,
        raw_names: &[&str],
    ) -> Self {
        assert!(names.len() <= 64, "a variant is limited to 64 known slots");

        let slots: Box<[KnownHeader]> = names
            .iter()
            .map(|&name| KnownHeader {
                name,
                prefix: format!("\r\n{name}: ").into_bytes().into_boxed_slice(),
                pattern: NamePattern::new(name),
                raw_slot: raw_names.iter().position(|&raw| raw == name),
                pseudo: name.starts_with(':'),
            })
            .collect();

        let max_len = slots
            .iter()
            .map(|slot| slot.name.len())
            .chain(has_content_length.then_some(CONTENT_LENGTH.len()))
            .max()
            .unwrap_or(0);
        let mut buckets = vec![Vec::new(); max_len + 1].into_boxed_slice();
        for (index, slot) in slots.iter().enumerate() {
            buckets[slot.name.len()].push(index as u16);
        }
        if has_content_length {
            buckets[CONTENT_LENGTH.len()].push(CONTENT_LENGTH_ENTRY);
        }

        let pseudo_mask = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pseudo)
            .fold(0u64, |mask, (index, _)| mask | 1 << index);

        let mut table = Self {
            variant,
            slots,
            buckets,
            content_length: has_content_length.then(|| NamePattern::new(CONTENT_LENGTH)),
            hpack: [NameMatch::Unknown; HPACK_LEN],
            qpack: [NameMatch::Unknown; QPACK_LEN],
            pseudo_mask,
            raw_count: raw_names.len(),
            validate_on_set,
        };

        // Static-index resolution reuses the byte matcher, so aliasing
        // (several indices, one name) needs no special handling. Index 0 of
        // the HPACK array stays Unknown: RFC 7541 indexes from 1.
        let mut hpack = [NameMatch::Unknown; HPACK_LEN];
        for (index, name) in HPACK_STATIC_NAMES.iter().enumerate() {
            if !name.is_empty() {
                hpack[index] = table.match_name(name.as_bytes());
            }
        }
        table.hpack = hpack;

        let mut qpack = [NameMatch::Unknown; QPACK_LEN];
        for (index, name) in QPACK_STATIC_NAMES.iter().enumerate() {
            qpack[index] = table.match_name(name.as_bytes());
        }
        table.qpack = qpack;

        table
    }

    /// Resolves raw name bytes to a known identity, case-insensitively.
    ///
    /// Dispatches on length first, then runs the masked-word comparison
    /// against each candidate in the bucket.
    pub(crate) fn match_name(&self, name: &[u8]) -> NameMatch {
        let Some(bucket) = self.buckets.get(name.len()) else {
            return NameMatch::Unknown;
        };
        for &entry in bucket {
            if entry == CONTENT_LENGTH_ENTRY {
                if self.content_length.as_ref().is_some_and(|pattern| pattern.matches(name)) {
                    return NameMatch::ContentLength;
                }
            } else if self.slots[entry as usize].pattern.matches(name) {
                return NameMatch::Slot(entry as usize);
            }
        }
        NameMatch::Unknown
    }

    pub(crate) fn hpack_lookup(&self, index: usize) -> NameMatch {
        self.hpack.get(index).copied().unwrap_or(NameMatch::Unknown)
    }

    pub(crate) fn qpack_lookup(&self, index: usize) -> NameMatch {
        self.qpack.get(index).copied().unwrap_or(NameMatch::Unknown)
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    /// Number of known slots (excluding Content-Length).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Canonical name of a slot.
    pub fn name(&self, slot: usize) -> &'static str {
        self.slots[slot].name
    }

    /// Pre-rendered `\r\nName: ` bytes for the serializer.
    pub(crate) fn prefix(&self, slot: usize) -> &[u8] {
        &self.slots[slot].prefix
    }

    pub(crate) fn raw_slot(&self, slot: usize) -> Option<usize> {
        self.slots[slot].raw_slot
    }

    pub(crate) fn raw_count(&self) -> usize {
        self.raw_count
    }

    pub(crate) fn pseudo_mask(&self) -> u64 {
        self.pseudo_mask
    }

    pub(crate) fn validate_on_set(&self) -> bool {
        self.validate_on_set
    }

    pub(crate) fn has_content_length(&self) -> bool {
        self.content_length.is_some()
    }
}

/// Known request header identities; slot bit index = list position.
///
/// The five `:`-prefixed entries are the HTTP/2 and HTTP/3 pseudo-headers.
#[rustfmt::skip]
pub(crate) static REQUEST_HEADER_NAMES: &[&str] = &[
    "Cache-Control",
    "Connection",
    "Date",
    "Keep-Alive",
    "Pragma",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
    "Via",
    "Warning",
    "Allow",
    "Content-Type",
    "Content-Encoding",
    "Content-Language",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Expires",
    "Last-Modified",
    ":authority",
    ":method",
    ":path",
    ":scheme",
    ":protocol",
    "Accept",
    "Accept-Charset",
    "Accept-Encoding",
    "Accept-Language",
    "Authorization",
    "Cookie",
    "Expect",
    "From",
    "Host",
    "If-Match",
    "If-Modified-Since",
    "If-None-Match",
    "If-Range",
    "If-Unmodified-Since",
    "Max-Forwards",
    "Proxy-Authorization",
    "Referer",
    "Range",
    "TE",
    "Translate",
    "User-Agent",
    "DNT",
    "Upgrade-Insecure-Requests",
    "Request-Id",
    "Correlation-Context",
    "TraceParent",
    "TraceState",
    "Origin",
    "Access-Control-Request-Method",
    "Access-Control-Request-Headers",
];

/// Known response header identities; slot bit index = list position.
#[rustfmt::skip]
pub(crate) static RESPONSE_HEADER_NAMES: &[&str] = &[
    "Cache-Control",
    "Connection",
    "Date",
    "Keep-Alive",
    "Pragma",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
    "Via",
    "Warning",
    "Allow",
    "Content-Type",
    "Content-Encoding",
    "Content-Language",
    "Content-Location",
    "Content-MD5",
    "Content-Range",
    "Expires",
    "Last-Modified",
    "Accept-Ranges",
    "Age",
    "Alt-Svc",
    "ETag",
    "Location",
    "Proxy-Authenticate",
    "Retry-After",
    "Server",
    "Set-Cookie",
    "Vary",
    "WWW-Authenticate",
    "Access-Control-Allow-Credentials",
    "Access-Control-Allow-Headers",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Origin",
    "Access-Control-Expose-Headers",
    "Access-Control-Max-Age",
];

/// Known response trailer identities.
#[rustfmt::skip]
pub(crate) static TRAILER_HEADER_NAMES: &[&str] = &[
    "ETag",
    "Grpc-Message",
    "Grpc-Status",
];

/// Response headers eligible for a pre-rendered raw line cache, in raw-cache
/// slot order. These are the headers most prone to byte-identical repetition
/// across responses on one connection.
pub(crate) static RESPONSE_RAW_HEADER_NAMES: &[&str] =
    &["Connection", "Date", "Server", "Alt-Svc", "Transfer-Encoding"];

/// Request-variant table. Values are validated at ingestion time only when
/// the caller asks for the newline check.
pub static REQUEST_TABLE: Lazy<SlotTable> =
    Lazy::new(|| SlotTable::build("request", REQUEST_HEADER_NAMES, true, false, &[]));

/// Response-variant table. Generic sets validate value characters eagerly.
pub static RESPONSE_TABLE: Lazy<SlotTable> = Lazy::new(|| {
    SlotTable::build("response", RESPONSE_HEADER_NAMES, true, true, RESPONSE_RAW_HEADER_NAMES)
});

/// Trailer-variant table. No Content-Length: a trailer section carries none.
pub static TRAILER_TABLE: Lazy<SlotTable> =
    Lazy::new(|| SlotTable::build("trailers", TRAILER_HEADER_NAMES, false, true, &[]));
