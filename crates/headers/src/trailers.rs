//! Response trailer collection: the few identities legal after a body.

use std::ops::{Deref, DerefMut};

use crate::collection::Headers;
use crate::error::HeaderError;
use crate::table::TRAILER_TABLE;
use crate::utils::typed_headers;
use crate::value::HeaderValues;

/// Trailing headers of one outgoing response. Validates eagerly, like
/// [`crate::ResponseHeaders`]; there is no Content-Length field here because
/// a trailer section carries none.
#[derive(Debug)]
pub struct ResponseTrailers {
    inner: Headers,
}

impl ResponseTrailers {
    pub fn new() -> Self {
        Self { inner: Headers::with_table(&TRAILER_TABLE) }
    }

    typed_headers! {
        0 => "ETag", etag, set_etag;
        1 => "Grpc-Message", grpc_message, set_grpc_message;
        2 => "Grpc-Status", grpc_status, set_grpc_status;
    }
}

impl Default for ResponseTrailers {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ResponseTrailers {
    type Target = Headers;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ResponseTrailers {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
