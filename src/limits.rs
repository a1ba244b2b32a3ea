use crate::{Error, ErrorCode};

/// Default maximum field-name length in bytes.
pub const DEFAULT_MAX_NAME_LEN: usize = 24;

/// Default slot-table capacity of a `Message` or `Array` node.
pub const DEFAULT_MAX_BRANCHES: usize = 16;

/// Default maximum `String` value length in bytes.
pub const DEFAULT_MAX_STRING_LEN: usize = 512;

/// Default maximum `Cert` value length in bytes.
pub const DEFAULT_MAX_CERT_LEN: usize = 4096;

/// Default maximum container nesting depth accepted by the codecs.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Size limits applied to every tree.
///
/// These are the configuration constants of the message model: they bound branching,
/// name/string sizes and decode depth so memory use stays predictable on small targets.
/// Exceeding any of them is reported as `PayloadTooLarge`; nothing is silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum field-name length in bytes.
    pub max_name_len: usize,
    /// Slot-table capacity of a `Message`/`Array`.
    pub max_branches: usize,
    /// Maximum `String` value length in bytes.
    pub max_string_len: usize,
    /// Maximum `Cert` value length in bytes.
    pub max_cert_len: usize,
    /// Maximum container nesting depth accepted by decoders and encoders (root = depth 0).
    pub max_depth: usize,
}

impl Limits {
    /// Construct validated limits.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if any limit is zero or if
    /// `max_cert_len < max_string_len`.
    pub const fn new(
        max_name_len: usize,
        max_branches: usize,
        max_string_len: usize,
        max_cert_len: usize,
        max_depth: usize,
    ) -> Result<Self, Error> {
        if max_name_len == 0
            || max_branches == 0
            || max_string_len == 0
            || max_depth == 0
            || max_cert_len < max_string_len
        {
            return Err(Error::code_only(ErrorCode::PreconditionFailed));
        }
        Ok(Self {
            max_name_len,
            max_branches,
            max_string_len,
            max_cert_len,
            max_depth,
        })
    }

    /// Copy of these limits with a different branch capacity.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if `max_branches` is zero.
    pub const fn with_max_branches(self, max_branches: usize) -> Result<Self, Error> {
        Self::new(
            self.max_name_len,
            max_branches,
            self.max_string_len,
            self.max_cert_len,
            self.max_depth,
        )
    }

    /// Copy of these limits with a different decode depth.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionFailed` if `max_depth` is zero.
    pub const fn with_max_depth(self, max_depth: usize) -> Result<Self, Error> {
        Self::new(
            self.max_name_len,
            self.max_branches,
            self.max_string_len,
            self.max_cert_len,
            max_depth,
        )
    }

    pub(crate) const fn check_name(&self, name: &str) -> Result<(), Error> {
        if name.len() > self.max_name_len {
            return Err(Error::code_only(ErrorCode::PayloadTooLarge));
        }
        Ok(())
    }

    pub(crate) const fn check_depth(&self, depth: usize, offset: usize) -> Result<(), Error> {
        if depth > self.max_depth {
            return Err(Error::new(ErrorCode::PayloadTooLarge, offset));
        }
        Ok(())
    }

    pub(crate) const fn check_branches(&self, len: usize, offset: usize) -> Result<(), Error> {
        if len > self.max_branches {
            return Err(Error::new(ErrorCode::PayloadTooLarge, offset));
        }
        Ok(())
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            max_branches: DEFAULT_MAX_BRANCHES,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_cert_len: DEFAULT_MAX_CERT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
