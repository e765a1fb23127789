//! Pooled header storage and matching for micro HTTP servers.
//!
//! This crate is the header engine of a high-throughput server: it holds the
//! header fields of one request, one response, or one set of response
//! trailers, and turns raw wire bytes (or HPACK/QPACK static-table indices)
//! into structured values with minimal allocation and maximal reuse across a
//! long-lived, pooled connection object.
//!
//! # Features
//!
//! - Known headers resolved with masked-word byte matching: no hashing, no
//!   allocation on the common path
//! - One presence bit per known slot; enumeration walks set bits
//! - Value reuse across keep-alive cycles: a replayed byte-identical header
//!   keeps the previous cycle's text allocation
//! - Three ingestion entry points sharing one value-assignment policy:
//!   HTTP/1.1 literal bytes, HPACK indices, QPACK indices
//! - Specialized integer Content-Length field (parsed and rendered directly,
//!   no text round-trip)
//! - Insertion-ordered overflow map for unknown header names
//! - Response serializer writing straight into an external byte sink, with
//!   pre-rendered raw line caches for high-churn headers
//! - Pluggable per-header text encoding; the default is a fast ASCII path
//!
//! # Example
//!
//! ```
//! use micro_headers::RequestHeaders;
//!
//! let mut headers = RequestHeaders::new();
//! headers.append(b"Host", b"example.com", false)?;
//! headers.append(b"User-Agent", b"curl/8.5.0", false)?;
//! headers.append(b"Content-Length", b"42", false)?;
//!
//! assert_eq!(headers.get("host").unwrap().first(), Some("example.com"));
//! assert_eq!(headers.content_length(), Some(42));
//! assert_eq!(headers.len(), 3);
//!
//! // recycle the instance for the next request on this connection
//! headers.begin_reuse();
//! headers.append(b"User-Agent", b"curl/8.5.0", false)?; // reuses the stored text
//! headers.finish_reuse();
//!
//! assert!(headers.contains("user-agent"));
//! assert!(!headers.contains("host")); // stale value was dropped
//! # Ok::<(), micro_headers::HeaderError>(())
//! ```
//!
//! # Architecture
//!
//! - [`table`]: per-variant known-header descriptors, generated once from the
//!   canonical name lists
//! - [`collection`]: the storage engine — bitmaps, ingestion, the generic
//!   dictionary contract, recycling
//! - [`encoding`]: the text-encoding policy seam and the serializer's byte
//!   sink
//! - [`request`], [`response`], [`trailers`]: the three variant facades with
//!   typed accessors
//!
//! # Concurrency
//!
//! A collection is owned and mutated by exactly one connection-processing
//! context at a time; nothing here locks, suspends, or performs I/O.

pub mod collection;
pub mod encoding;
pub mod error;
pub mod request;
pub mod response;
pub mod table;
pub mod trailers;
pub mod value;

mod matcher;
mod overflow;
mod utils;

pub use collection::{Headers, Iter};
pub use encoding::{DefaultEncoding, EncodingSelector, HeaderSink, ValueCodec};
pub use error::HeaderError;
pub use request::{PseudoHeaders, RequestHeaders};
pub use response::ResponseHeaders;
pub use trailers::ResponseTrailers;
pub use value::HeaderValues;
