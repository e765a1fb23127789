//! Utility macros shared across the crate.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Example
///
/// ```ignore
/// ensure!(!raw.is_empty(), HeaderError::invalid_content_length("empty value"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Generates the typed accessor pair for one known header slot.
///
/// Every variant facade invokes this once per slot, keeping the slot literal
/// next to the canonical name so the pairing stays reviewable against the
/// variant's name table.
macro_rules! typed_headers {
    ($( $slot:expr => $name:literal, $get:ident, $set:ident; )*) => {
        $(
            #[doc = concat!("Values of the `", $name, "` header, if present.")]
            pub fn $get(&self) -> Option<&HeaderValues> {
                self.inner.values_ref($slot)
            }

            #[doc = concat!("Sets the `", $name, "` header directly, bypassing name matching.")]
            ///
            /// An empty value is equivalent to removal.
            pub fn $set(&mut self, value: impl Into<HeaderValues>) -> Result<(), HeaderError> {
                self.inner.set_slot($slot, value.into())
            }
        )*
    };
}

pub(crate) use typed_headers;
