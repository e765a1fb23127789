//! Case-insensitive masked-word name matching.
//!
//! A [`NamePattern`] is generated from a canonical header name: one mask byte
//! and one pattern byte per name byte. The mask is `0xDF` on positions that
//! hold an ASCII letter (clearing bit 5 folds case) and `0xFF` on positions
//! that cannot vary, such as digits, hyphens, or the leading colon of a
//! pseudo-header. An input name matches when `input & mask == pattern`,
//! checked over little-endian 8/4/2/1-byte chunks, so the common lookup is a
//! handful of integer compares with no hashing and no allocation.
//!
//! Patterns are generated at table-construction time from the canonical name
//! list, never hand-written, and `from_le_bytes` keeps the comparison
//! byte-order consistent on every platform.

#[derive(Debug)]
pub(crate) struct NamePattern {
    mask: Box<[u8]>,
    pattern: Box<[u8]>,
}

impl NamePattern {
    pub(crate) fn new(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut mask = Vec::with_capacity(bytes.len());
        let mut pattern = Vec::with_capacity(bytes.len());
        for &b in bytes {
            let m = if b.is_ascii_alphabetic() { 0xDF } else { 0xFF };
            mask.push(m);
            pattern.push(b & m);
        }
        Self { mask: mask.into_boxed_slice(), pattern: pattern.into_boxed_slice() }
    }

    /// Case-insensitive equality against the canonical name.
    pub(crate) fn matches(&self, name: &[u8]) -> bool {
        if name.len() != self.pattern.len() {
            return false;
        }
        let mut offset = 0;
        let mut remaining = name.len();
        while remaining >= 8 {
            if load8(name, offset) & load8(&self.mask, offset) != load8(&self.pattern, offset) {
                return false;
            }
            offset += 8;
            remaining -= 8;
        }
        if remaining >= 4 {
            if load4(name, offset) & load4(&self.mask, offset) != load4(&self.pattern, offset) {
                return false;
            }
            offset += 4;
            remaining -= 4;
        }
        if remaining >= 2 {
            if load2(name, offset) & load2(&self.mask, offset) != load2(&self.pattern, offset) {
                return false;
            }
            offset += 2;
            remaining -= 2;
        }
        if remaining == 1 && name[offset] & self.mask[offset] != self.pattern[offset] {
            return false;
        }
        true
    }
}

#[inline]
fn load8(bytes: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(word)
}

#[inline]
fn load4(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[inline]
fn load2(bytes: &[u8], offset: usize) -> u16 {
    let mut word = [0u8; 2];
    word.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(word)
}
