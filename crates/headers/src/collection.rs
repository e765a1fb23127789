//! The header collection engine shared by all three variants.
//!
//! A [`Headers`] instance owns one presence bitmap (one bit per known slot),
//! a fixed block of multi-value text fields indexed by slot number, the
//! specialized integer Content-Length field, a lazily created overflow map
//! for unknown names, and — on the response variant — the raw line caches.
//! The bitmap is the sole source of truth for "is slot *i* populated"; a
//! clear bit means absent, whatever the field behind it holds.
//!
//! # Pooled reuse
//!
//! A collection lives as long as its connection and is parsed into once per
//! request. [`Headers::begin_reuse`] snapshots the presence bitmap into the
//! reuse bitmap and clears presence; each ingested header then either
//! *confirms* the carried value (byte-equal single value: the existing text
//! allocation is kept, nothing is decoded) or replaces it. Whatever is still
//! unconfirmed when [`Headers::finish_reuse`] runs is stale and gets dropped.
//! This is the dominant optimization for kept-alive connections replaying
//! structurally identical headers, and it is only sound because exactly one
//! connection context owns the instance at a time — nothing here locks.
//!
//! # Ingestion entry points
//!
//! Three entry points feed the same value-assignment policy: literal name
//! bytes ([`Headers::append`], HTTP/1.1), HPACK static indices
//! ([`Headers::append_hpack`], HTTP/2) and QPACK static indices
//! ([`Headers::append_qpack`], HTTP/3). An index only ever selects the slot;
//! the stored text always comes from the literal value bytes.

use std::fmt;
use std::mem;
use std::slice;
use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use crate::encoding::{EncodingSelector, ValueCodec, decode_ascii, is_forbidden_field_char};
use crate::error::HeaderError;
use crate::overflow::OverflowMap;
use crate::table::{CONTENT_LENGTH, NameMatch, SlotTable};
use crate::utils::ensure;
use crate::value::HeaderValues;

/// Populated-slot count at or below which recycling clears fields one by one
/// (with an early exit once the remaining bits hit zero) instead of resetting
/// the whole storage block. An empirical tuning constant, not a semantic
/// requirement.
const DIRECT_CLEAR_MAX: u32 = 12;

/// One header collection: request headers, response headers, or response
/// trailers, depending on the table it was built over.
pub struct Headers {
    pub(crate) table: &'static SlotTable,
    /// Presence bitmap; bit *i* set ⇔ slot *i* holds at least one value.
    pub(crate) bits: u64,
    /// Reuse bitmap: slots still carrying an unconfirmed value from the
    /// previous cycle of this pooled instance.
    pub(crate) previous_bits: u64,
    pub(crate) values: Box<[HeaderValues]>,
    pub(crate) content_length: Option<u64>,
    pub(crate) overflow: Option<Box<OverflowMap>>,
    /// Pre-rendered raw header lines (response variant only).
    pub(crate) raw: Box<[Option<Bytes>]>,
    pub(crate) read_only: bool,
    pub(crate) selector: Option<Arc<dyn EncodingSelector>>,
}

impl Headers {
    pub(crate) fn with_table(table: &'static SlotTable) -> Self {
        Self {
            table,
            bits: 0,
            previous_bits: 0,
            values: vec![HeaderValues::new(); table.len()].into_boxed_slice(),
            content_length: None,
            overflow: None,
            raw: vec![None; table.raw_count()].into_boxed_slice(),
            read_only: false,
            selector: None,
        }
    }

    /// The variant's static slot table.
    pub fn table(&self) -> &'static SlotTable {
        self.table
    }

    /// Installs a per-header text-encoding selector. Headers the selector
    /// maps to `None` keep the fast ASCII path.
    pub fn set_encoding_selector(&mut self, selector: Arc<dyn EncodingSelector>) {
        self.selector = Some(selector);
    }

    pub(crate) fn codec_for(&self, name: &str) -> Option<&dyn ValueCodec> {
        self.selector.as_deref().and_then(|selector| selector.codec_for(name))
    }

    // ---- ingestion ----------------------------------------------------

    /// Appends one header from literal name and value bytes (HTTP/1.1 path).
    ///
    /// `check_newlines` rejects embedded CR/LF in the value; request parsers
    /// enable it for untrusted input to block header-splitting.
    ///
    /// # Errors
    ///
    /// Fails on a read-only collection, on a malformed or repeated
    /// Content-Length value, or on a forbidden character when
    /// `check_newlines` is set. Failure is fatal to the ingestion call and
    /// leaves the collection unchanged for this header.
    pub fn append(&mut self, name: &[u8], value: &[u8], check_newlines: bool) -> Result<(), HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        match self.table.match_name(name) {
            NameMatch::Slot(slot) => self.append_slot(slot, value, check_newlines),
            NameMatch::ContentLength => self.append_content_length(value),
            NameMatch::Unknown => {
                let name = decode_ascii(name);
                let text = self.decode_value(&name, value, check_newlines)?;
                self.overflow_mut().append(name, text);
                Ok(())
            }
        }
    }

    /// Appends one header resolved through an HPACK static-table index
    /// (HTTP/2 path). Returns `Ok(false)` when the index does not resolve to
    /// a known identity of this variant; the caller then falls back to
    /// [`Headers::append`] with the literal name bytes.
    pub fn append_hpack(&mut self, index: usize, value: &[u8], check_newlines: bool) -> Result<bool, HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        match self.table.hpack_lookup(index) {
            NameMatch::Slot(slot) => self.append_slot(slot, value, check_newlines).map(|()| true),
            NameMatch::ContentLength => self.append_content_length(value).map(|()| true),
            NameMatch::Unknown => Ok(false),
        }
    }

    /// Appends one header resolved through a QPACK static-table index
    /// (HTTP/3 path). Same contract as [`Headers::append_hpack`].
    pub fn append_qpack(&mut self, index: usize, value: &[u8], check_newlines: bool) -> Result<bool, HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        match self.table.qpack_lookup(index) {
            NameMatch::Slot(slot) => self.append_slot(slot, value, check_newlines).map(|()| true),
            NameMatch::ContentLength => self.append_content_length(value).map(|()| true),
            NameMatch::Unknown => Ok(false),
        }
    }

    fn append_slot(&mut self, slot: usize, value: &[u8], check_newlines: bool) -> Result<(), HeaderError> {
        let flag = 1u64 << slot;
        if self.previous_bits & flag != 0 {
            // Carried from the previous cycle; this header confirms or
            // replaces it exactly once.
            self.previous_bits &= !flag;
            if let Some(existing) = self.values[slot].single() {
                if existing.as_bytes() == value && existing.is_ascii() {
                    // Byte-identical replay: keep the existing allocation.
                    self.bits |= flag;
                    return Ok(());
                }
            }
        }

        let text = self.decode_value(self.table.name(slot), value, check_newlines)?;
        if self.bits & flag == 0 {
            self.bits |= flag;
            self.values[slot] = HeaderValues::one(text);
        } else {
            // A second line with the same name: append in arrival order.
            self.values[slot].push(text);
        }
        self.invalidate_raw(slot);
        Ok(())
    }

    fn append_content_length(&mut self, value: &[u8]) -> Result<(), HeaderError> {
        ensure!(self.content_length.is_none(), HeaderError::DuplicateContentLength);
        let length = match self.codec_for(CONTENT_LENGTH) {
            Some(codec) => parse_content_length(codec.decode(value)?.as_bytes())?,
            None => parse_content_length(value)?,
        };
        self.content_length = Some(length);
        Ok(())
    }

    fn decode_value(&self, name: &str, raw: &[u8], check_newlines: bool) -> Result<String, HeaderError> {
        if check_newlines && raw.iter().any(|&b| b == b'\r' || b == b'\n') {
            return Err(HeaderError::forbidden_char(name));
        }
        match self.codec_for(name) {
            Some(codec) => codec.decode(raw),
            None => Ok(decode_ascii(raw)),
        }
    }

    fn overflow_mut(&mut self) -> &mut OverflowMap {
        self.overflow.get_or_insert_with(|| Box::new(OverflowMap::new()))
    }

    // ---- generic dictionary contract ----------------------------------

    /// Looks a header up by case-insensitive name.
    ///
    /// Known slots answer with an O(1) bit test. Content-Length, if present,
    /// is formatted to text here so the generic view stays uniform.
    pub fn get(&self, name: &str) -> Option<HeaderValues> {
        match self.table.match_name(name.as_bytes()) {
            NameMatch::Slot(slot) => self.values_ref(slot).cloned(),
            NameMatch::ContentLength => self.content_length.map(|n| HeaderValues::one(n.to_string())),
            NameMatch::Unknown => self.overflow.as_ref().and_then(|map| map.get(name)).cloned(),
        }
    }

    /// Stores values under a case-insensitive name, replacing anything
    /// present. An empty value is equivalent to removal.
    ///
    /// # Errors
    ///
    /// Fails on a read-only collection, on forbidden value characters when
    /// this variant validates eagerly (response and trailers), and on
    /// non-numeric Content-Length text.
    pub fn set(&mut self, name: &str, values: impl Into<HeaderValues>) -> Result<(), HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        let values = values.into();
        if self.table.validate_on_set() {
            validate_values(name, &values)?;
        }
        match self.table.match_name(name.as_bytes()) {
            NameMatch::Slot(slot) => {
                if values.is_unset() {
                    self.remove_slot(slot);
                } else {
                    self.install_slot(slot, values);
                }
                Ok(())
            }
            NameMatch::ContentLength => {
                ensure!(
                    values.len() == 1,
                    HeaderError::invalid_content_length("expected exactly one value")
                );
                let text = values
                    .first()
                    .ok_or_else(|| HeaderError::invalid_content_length("expected exactly one value"))?;
                self.content_length = Some(parse_content_length(text.as_bytes())?);
                Ok(())
            }
            NameMatch::Unknown => {
                if values.is_unset() {
                    if let Some(map) = &mut self.overflow {
                        map.remove(name);
                    }
                } else {
                    self.overflow_mut().set(name, values);
                }
                Ok(())
            }
        }
    }

    /// Removes a header by case-insensitive name, releasing any retained
    /// text. Returns whether something was removed.
    pub fn remove(&mut self, name: &str) -> Result<bool, HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        Ok(match self.table.match_name(name.as_bytes()) {
            NameMatch::Slot(slot) => self.remove_slot(slot),
            NameMatch::ContentLength => self.content_length.take().is_some(),
            NameMatch::Unknown => self.overflow.as_mut().is_some_and(|map| map.remove(name)),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        match self.table.match_name(name.as_bytes()) {
            NameMatch::Slot(slot) => self.bits & (1 << slot) != 0,
            NameMatch::ContentLength => self.content_length.is_some(),
            NameMatch::Unknown => self.overflow.as_ref().is_some_and(|map| map.contains(name)),
        }
    }

    /// Number of present headers: populated known slots, plus Content-Length
    /// if set, plus overflow entries.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
            + usize::from(self.content_length.is_some())
            + self.overflow.as_ref().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every present header into a freshly allocated vector, in
    /// enumeration order.
    pub fn to_vec(&self) -> Vec<(String, HeaderValues)> {
        self.iter().map(|(name, values)| (name.to_owned(), values)).collect()
    }

    // ---- typed slot access (used by the variant facades) --------------

    /// Values of a slot, or `None` while its presence bit is clear.
    pub fn values_ref(&self, slot: usize) -> Option<&HeaderValues> {
        (self.bits & (1 << slot) != 0).then(|| &self.values[slot])
    }

    /// Stores values directly into a slot, bypassing name matching.
    pub(crate) fn set_slot(&mut self, slot: usize, values: HeaderValues) -> Result<(), HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        if self.table.validate_on_set() {
            validate_values(self.table.name(slot), &values)?;
        }
        if values.is_unset() {
            self.remove_slot(slot);
        } else {
            self.install_slot(slot, values);
        }
        Ok(())
    }

    /// Stores values and a pre-rendered raw line for a raw-cache slot.
    /// The caller vouches for the raw bytes; no validation runs here.
    pub(crate) fn set_slot_raw(&mut self, slot: usize, values: HeaderValues, raw: Bytes) -> Result<(), HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        self.install_slot(slot, values);
        let raw_index = self.table.raw_slot(slot);
        debug_assert!(raw_index.is_some(), "slot has no raw cache");
        if let Some(index) = raw_index {
            self.raw[index] = Some(raw);
        }
        Ok(())
    }

    fn install_slot(&mut self, slot: usize, values: HeaderValues) {
        let flag = 1u64 << slot;
        self.bits |= flag;
        self.previous_bits &= !flag;
        self.values[slot] = values;
        self.invalidate_raw(slot);
    }

    pub(crate) fn remove_slot(&mut self, slot: usize) -> bool {
        let flag = 1u64 << slot;
        self.previous_bits &= !flag;
        self.invalidate_raw(slot);
        if self.bits & flag == 0 {
            return false;
        }
        self.bits &= !flag;
        self.values[slot] = HeaderValues::new();
        true
    }

    fn invalidate_raw(&mut self, slot: usize) {
        if let Some(index) = self.table.raw_slot(slot) {
            self.raw[index] = None;
        }
    }

    /// The Content-Length value, if present.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Sets or clears Content-Length through the typed path.
    pub fn set_content_length(&mut self, length: Option<u64>) -> Result<(), HeaderError> {
        ensure!(!self.read_only, HeaderError::ReadOnly);
        debug_assert!(self.table.has_content_length(), "variant has no content-length field");
        self.content_length = length;
        Ok(())
    }

    // ---- lifecycle ----------------------------------------------------

    /// Marks the collection read-only; every subsequent mutation fails with
    /// [`HeaderError::ReadOnly`]. Used once a response has been committed.
    pub fn set_read_only(&mut self) {
        self.read_only = true;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the collection to the all-absent state for pool recycling.
    ///
    /// Below [`DIRECT_CLEAR_MAX`] populated slots only the populated fields
    /// are cleared, one by one; above it the whole storage block is reset in
    /// one pass, since per-field dispatch stops being cheaper once enough
    /// fields are populated. Also drops read-only status: a recycled
    /// collection serves a fresh exchange.
    pub fn clear(&mut self) {
        self.previous_bits = 0;
        self.content_length = None;
        self.read_only = false;
        if let Some(map) = &mut self.overflow {
            map.clear();
        }
        for cache in &mut self.raw {
            *cache = None;
        }

        let mut remaining = mem::take(&mut self.bits);
        if remaining.count_ones() > DIRECT_CLEAR_MAX {
            trace!(variant = self.table.variant(), "bulk clearing header storage");
            for values in &mut self.values {
                *values = HeaderValues::new();
            }
            return;
        }
        while remaining != 0 {
            let slot = remaining.trailing_zeros() as usize;
            self.values[slot] = HeaderValues::new();
            remaining &= remaining - 1;
        }
    }

    /// Starts a new parse cycle on a pooled instance: the presence bitmap
    /// moves into the reuse bitmap so carried values can be confirmed
    /// cheaply, and everything non-reusable is dropped.
    ///
    /// The previous cycle must have fully completed before this runs; the
    /// reuse bits describe a committed, immutable prior state.
    pub fn begin_reuse(&mut self) {
        debug_assert!(!self.read_only);
        self.previous_bits = self.bits;
        self.bits = 0;
        self.content_length = None;
        if let Some(map) = &mut self.overflow {
            map.clear();
        }
    }

    /// Ends a parse cycle: any carried value that was neither confirmed nor
    /// replaced is stale and gets dropped.
    pub fn finish_reuse(&mut self) {
        let stale = mem::take(&mut self.previous_bits) & !self.bits;
        if stale == 0 {
            return;
        }
        trace!(
            variant = self.table.variant(),
            stale = stale.count_ones(),
            "dropping stale header values carried from previous cycle"
        );
        let mut remaining = stale;
        while remaining != 0 {
            let slot = remaining.trailing_zeros() as usize;
            self.values[slot] = HeaderValues::new();
            remaining &= remaining - 1;
        }
    }

    // ---- enumeration --------------------------------------------------

    /// Iterates over present headers: known slots in ascending bit order,
    /// then Content-Length as a trailing virtual slot, then overflow entries
    /// in insertion order.
    ///
    /// The set of slots to visit is captured when the iterator is built;
    /// each slot's values are read as it is visited. The distinction is
    /// unobservable from safe code, since the borrow prevents mutation while
    /// the iterator lives.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            headers: self,
            bits: self.bits,
            content_length_pending: true,
            overflow: self.overflow.as_ref().map(|map| map.entries().iter()),
        }
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, HeaderValues);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Headers")
            .field("variant", &self.table.variant())
            .field("len", &self.len())
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

/// Forward-only, single-pass iterator over a collection. See
/// [`Headers::iter`] for the visiting order.
#[derive(Debug)]
pub struct Iter<'a> {
    headers: &'a Headers,
    bits: u64,
    content_length_pending: bool,
    overflow: Option<slice::Iter<'a, (String, HeaderValues)>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, HeaderValues);

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits != 0 {
            let slot = self.bits.trailing_zeros() as usize;
            self.bits &= self.bits - 1;
            return Some((self.headers.table.name(slot), self.headers.values[slot].clone()));
        }
        if self.content_length_pending {
            self.content_length_pending = false;
            if let Some(length) = self.headers.content_length {
                return Some((CONTENT_LENGTH, HeaderValues::one(length.to_string())));
            }
        }
        self.overflow.as_mut()?.next().map(|(name, values)| (name.as_str(), values.clone()))
    }
}

fn validate_values(name: &str, values: &HeaderValues) -> Result<(), HeaderError> {
    for value in values {
        if value.bytes().any(is_forbidden_field_char) {
            return Err(HeaderError::forbidden_char(name));
        }
    }
    Ok(())
}

fn parse_content_length(raw: &[u8]) -> Result<u64, HeaderError> {
    ensure!(!raw.is_empty(), HeaderError::invalid_content_length("empty value"));
    let mut length: u64 = 0;
    for &b in raw {
        ensure!(
            b.is_ascii_digit(),
            HeaderError::invalid_content_length(format!("unexpected byte {:#04x}", b))
        );
        length = length
            .checked_mul(10)
            .and_then(|n| n.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| HeaderError::invalid_content_length("value overflows u64"))?;
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::REQUEST_TABLE;

    fn request() -> Headers {
        Headers::with_table(&REQUEST_TABLE)
    }

    #[test]
    fn round_trip_known_header() {
        let mut headers = request();
        headers.append(b"Host", b"example.com", false).unwrap();

        assert_eq!(headers.get("host").unwrap().first(), Some("example.com"));
        assert_eq!(headers.get("HOST").unwrap().first(), Some("example.com"));
        assert_eq!(headers.len(), 1);
        assert!(headers.contains("Host"));
    }

    #[test]
    fn repeated_lines_append_in_arrival_order() {
        let mut headers = request();
        headers.append(b"Host", b"example.com", false).unwrap();
        headers.append(b"HOST", b"example.org", false).unwrap();

        let values = headers.get("host").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), ["example.com", "example.org"]);
        // two lines, still one header
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn unknown_headers_go_to_overflow_in_order() {
        let mut headers = request();
        headers.append(b"X-Alpha", b"1", false).unwrap();
        headers.append(b"X-Beta", b"2", false).unwrap();
        headers.append(b"x-alpha", b"3", false).unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-ALPHA").unwrap().len(), 2);
        let names: Vec<_> = headers.iter().map(|(name, _)| name.to_owned()).collect();
        assert_eq!(names, ["X-Alpha", "X-Beta"]);
    }

    #[test]
    fn content_length_is_parsed_not_stored_as_text() {
        let mut headers = request();
        headers.append(b"Content-Length", b"42", false).unwrap();

        assert_eq!(headers.content_length(), Some(42));
        assert_eq!(headers.get("content-length").unwrap().first(), Some("42"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn content_length_zero_is_present_not_absent() {
        let mut headers = request();
        headers.set("Content-Length", "0").unwrap();

        assert!(headers.contains("Content-Length"));
        assert_eq!(headers.get("Content-Length").unwrap().first(), Some("0"));
        assert_eq!(headers.content_length(), Some(0));
    }

    #[test]
    fn malformed_content_length_is_fatal() {
        let mut headers = request();
        let err = headers.append(b"Content-Length", b"4x2", false).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidContentLength { .. }));

        assert!(matches!(
            headers.append(b"Content-Length", b"", false),
            Err(HeaderError::InvalidContentLength { .. })
        ));
        assert!(matches!(
            headers.append(b"Content-Length", b"99999999999999999999999", false),
            Err(HeaderError::InvalidContentLength { .. })
        ));
    }

    #[test]
    fn repeated_content_length_is_rejected() {
        let mut headers = request();
        headers.append(b"Content-Length", b"10", false).unwrap();
        assert!(matches!(
            headers.append(b"Content-Length", b"10", false),
            Err(HeaderError::DuplicateContentLength)
        ));
    }

    #[test]
    fn newline_check_is_opt_in() {
        let mut headers = request();
        headers.append(b"User-Agent", b"bad\r\nvalue", false).unwrap();
        assert_eq!(headers.get("user-agent").unwrap().first(), Some("bad\r\nvalue"));

        let err = headers.append(b"Accept", b"bad\nvalue", true).unwrap_err();
        assert!(matches!(err, HeaderError::ForbiddenValueChar { .. }));
        assert!(!headers.contains("Accept"));
    }

    #[test]
    fn set_empty_is_removal() {
        let mut headers = request();
        headers.set("Accept", "text/html").unwrap();
        assert!(headers.contains("Accept"));

        headers.set("Accept", "").unwrap();
        assert!(!headers.contains("Accept"));
        assert_eq!(headers.get("Accept"), None);
    }

    #[test]
    fn remove_reports_whether_something_was_removed() {
        let mut headers = request();
        headers.set("Accept", "text/html").unwrap();

        assert!(headers.remove("accept").unwrap());
        assert!(!headers.remove("accept").unwrap());
        assert!(!headers.remove("X-Missing").unwrap());
    }

    #[test]
    fn read_only_rejects_mutation() {
        let mut headers = request();
        headers.set("Accept", "text/html").unwrap();
        headers.set_read_only();

        assert!(matches!(headers.set("Accept", "other"), Err(HeaderError::ReadOnly)));
        assert!(matches!(headers.remove("Accept"), Err(HeaderError::ReadOnly)));
        assert!(matches!(headers.set_content_length(Some(1)), Err(HeaderError::ReadOnly)));
        // reads still work
        assert_eq!(headers.get("Accept").unwrap().first(), Some("text/html"));
    }

    #[test]
    fn read_only_rejects_ingestion_too() {
        let mut headers = request();
        headers.append(b"Host", b"example.com", false).unwrap();
        headers.set_read_only();

        assert!(matches!(
            headers.append(b"Accept", b"*/*", false),
            Err(HeaderError::ReadOnly)
        ));
        assert!(matches!(headers.append_hpack(38, b"other.example", false), Err(HeaderError::ReadOnly)));
        assert!(matches!(headers.append_qpack(95, b"curl", false), Err(HeaderError::ReadOnly)));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn clear_resets_everything_few_fields() {
        let mut headers = request();
        headers.append(b"Host", b"example.com", false).unwrap();
        headers.append(b"Content-Length", b"3", false).unwrap();
        headers.append(b"X-Custom", b"v", false).unwrap();

        headers.clear();
        assert_eq!(headers.len(), 0);
        assert!(headers.is_empty());
        assert_eq!(headers.get("Host"), None);
        assert_eq!(headers.content_length(), None);
        assert_eq!(headers.get("X-Custom"), None);
    }

    #[test]
    fn clear_resets_everything_above_threshold() {
        let mut headers = request();
        // populate more than DIRECT_CLEAR_MAX slots to take the bulk branch
        let names = [
            "Host",
            "Accept",
            "Accept-Charset",
            "Accept-Encoding",
            "Accept-Language",
            "User-Agent",
            "Cookie",
            "Referer",
            "Range",
            "Expect",
            "Via",
            "Upgrade",
            "Pragma",
            "Warning",
        ];
        assert!(names.len() > DIRECT_CLEAR_MAX as usize);
        for name in names {
            headers.append(name.as_bytes(), b"v", false).unwrap();
        }
        assert_eq!(headers.len(), names.len());

        headers.clear();
        assert_eq!(headers.len(), 0);
        for name in names {
            assert_eq!(headers.get(name), None);
        }
        // clear is idempotent
        headers.clear();
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn reuse_keeps_the_existing_allocation_for_identical_bytes() {
        let mut headers = request();
        headers.append(b"User-Agent", b"curl/8.5.0", false).unwrap();
        let before = headers.values_ref(44).unwrap().first().unwrap().as_ptr();

        headers.begin_reuse();
        assert!(!headers.contains("User-Agent"));
        headers.append(b"User-Agent", b"curl/8.5.0", false).unwrap();
        headers.finish_reuse();

        let values = headers.values_ref(44).unwrap();
        assert_eq!(values.first(), Some("curl/8.5.0"));
        // the same storage was retained, not re-decoded
        assert_eq!(values.first().unwrap().as_ptr(), before);
    }

    #[test]
    fn reuse_replaces_changed_values_without_resurrecting_old_ones() {
        let mut headers = request();
        headers.append(b"User-Agent", b"curl/8.5.0", false).unwrap();

        headers.begin_reuse();
        headers.append(b"User-Agent", b"wget/1.21", false).unwrap();
        headers.finish_reuse();

        let values = headers.get("user-agent").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), ["wget/1.21"]);
    }

    #[test]
    fn reuse_drops_stale_headers_not_seen_again() {
        let mut headers = request();
        headers.append(b"User-Agent", b"curl/8.5.0", false).unwrap();
        headers.append(b"Accept", b"*/*", false).unwrap();

        headers.begin_reuse();
        headers.append(b"Accept", b"*/*", false).unwrap();
        headers.finish_reuse();

        assert!(headers.contains("Accept"));
        assert!(!headers.contains("User-Agent"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn reuse_does_not_apply_to_multi_value_fields() {
        let mut headers = request();
        headers.append(b"Accept", b"text/html", false).unwrap();
        headers.append(b"Accept", b"text/plain", false).unwrap();

        headers.begin_reuse();
        headers.append(b"Accept", b"text/html", false).unwrap();
        headers.finish_reuse();

        // carried pair was replaced by the single new value
        let values = headers.get("Accept").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), ["text/html"]);
    }

    #[test]
    fn hpack_index_selects_slot_value_comes_from_literal_bytes() {
        let mut headers = request();
        // 38 = host in the HPACK static table
        assert!(headers.append_hpack(38, b"example.com", false).unwrap());
        assert_eq!(headers.get("host").unwrap().first(), Some("example.com"));

        // unknown index: caller falls back to literal handling
        assert!(!headers.append_hpack(8, b"200", false).unwrap());
        assert!(!headers.append_hpack(0, b"", false).unwrap());
    }

    #[test]
    fn qpack_aliases_land_in_the_same_slot() {
        let mut headers = request();
        // 44 and 52 are both content-type
        assert!(headers.append_qpack(44, b"application/json", false).unwrap());
        assert!(headers.append_qpack(52, b"text/html", false).unwrap());

        let values = headers.get("content-type").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), ["application/json", "text/html"]);
    }

    #[test]
    fn enumeration_order_is_slots_then_content_length_then_overflow() {
        let mut headers = request();
        headers.append(b"X-Tail", b"overflow", false).unwrap();
        headers.append(b"Content-Length", b"7", false).unwrap();
        headers.append(b"User-Agent", b"curl", false).unwrap();
        headers.append(b"Host", b"example.com", false).unwrap();

        let names: Vec<_> = headers.iter().map(|(name, _)| name.to_owned()).collect();
        assert_eq!(names, ["Host", "User-Agent", "Content-Length", "X-Tail"]);

        let copied = headers.to_vec();
        assert_eq!(copied.len(), 4);
        assert_eq!(copied[2].1.first(), Some("7"));
    }

    struct Utf8Codec;

    impl ValueCodec for Utf8Codec {
        fn decode(&self, raw: &[u8]) -> Result<String, HeaderError> {
            std::str::from_utf8(raw)
                .map(str::to_owned)
                .map_err(|_| HeaderError::forbidden_char("User-Agent"))
        }

        fn encode(&self, text: &str, dst: &mut Vec<u8>) {
            dst.extend_from_slice(text.as_bytes());
        }
    }

    struct DigitsCodec;

    impl ValueCodec for DigitsCodec {
        fn decode(&self, raw: &[u8]) -> Result<String, HeaderError> {
            if !raw.iter().all(u8::is_ascii_digit) {
                return Err(HeaderError::invalid_content_length("non-digit byte"));
            }
            Ok(decode_ascii(raw))
        }

        fn encode(&self, text: &str, dst: &mut Vec<u8>) {
            dst.extend_from_slice(text.as_bytes());
        }
    }

    struct TestSelector {
        utf8: Utf8Codec,
        digits: DigitsCodec,
    }

    impl TestSelector {
        fn new() -> Self {
            Self { utf8: Utf8Codec, digits: DigitsCodec }
        }
    }

    impl EncodingSelector for TestSelector {
        fn codec_for(&self, name: &str) -> Option<&dyn ValueCodec> {
            if name.eq_ignore_ascii_case("User-Agent") {
                Some(&self.utf8)
            } else if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                Some(&self.digits)
            } else {
                None
            }
        }
    }

    #[test]
    fn selected_headers_decode_through_the_custom_codec() {
        let mut headers = request();
        headers.set_encoding_selector(Arc::new(TestSelector::new()));

        headers.append(b"User-Agent", b"caf\xC3\xA9 browser", false).unwrap();
        assert_eq!(headers.get("user-agent").unwrap().first(), Some("café browser"));

        // headers the selector does not map keep the default Latin-1 fallback
        headers.append(b"Accept", b"caf\xC3\xA9", false).unwrap();
        assert_eq!(headers.get("accept").unwrap().first(), Some("caf\u{c3}\u{a9}"));
    }

    #[test]
    fn content_length_decodes_through_the_codec() {
        let mut headers = request();
        headers.set_encoding_selector(Arc::new(TestSelector::new()));

        // codec decode failure propagates and leaves the field unset
        let err = headers.append(b"Content-Length", b"4\xFF2", false).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidContentLength { .. }));
        assert_eq!(headers.content_length(), None);

        headers.append(b"Content-Length", b"42", false).unwrap();
        assert_eq!(headers.content_length(), Some(42));
    }

    #[test]
    fn generic_set_replaces_multi_value_fields() {
        let mut headers = request();
        headers.append(b"Accept", b"a", false).unwrap();
        headers.append(b"Accept", b"b", false).unwrap();

        headers.set("accept", "c").unwrap();
        let values = headers.get("Accept").unwrap();
        assert_eq!(values.iter().collect::<Vec<_>>(), ["c"]);
    }
}
