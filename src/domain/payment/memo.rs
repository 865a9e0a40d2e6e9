//! Transfer memo parsing.
//!
//! The payer types `<marker><code>` somewhere in the free-text transfer
//! description. There is no delimiter and no checksum: the code is simply
//! the fixed number of characters following the first case-insensitive
//! occurrence of the marker. This is the trust boundary of reconciliation;
//! all of its policy lives here.

use super::{ReconcileRejection, CODE_LENGTH};

/// Default marker preceding the payment code.
pub const DEFAULT_MARKER: &str = "ATMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMemoParser {
    marker: String,
    code_length: usize,
}

impl TransferMemoParser {
    /// Parser for `marker` followed by a standard-length payment code.
    ///
    /// The marker is matched ASCII-case-insensitively.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into().to_ascii_uppercase(),
            code_length: CODE_LENGTH,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extracts the candidate code from a transfer description.
    ///
    /// The description is ASCII-uppercased first, so `atmtab12cd34` yields
    /// `AB12CD34`. The extracted characters are returned verbatim; no
    /// character-class validation is applied before lookup.
    ///
    /// # Errors
    ///
    /// - `MarkerNotFound` if the marker does not occur
    /// - `CodeTooShort` if fewer than `code_length` characters follow it
    pub fn extract_code(&self, content: &str) -> Result<String, ReconcileRejection> {
        let upper = content.to_ascii_uppercase();
        let start = upper
            .find(&self.marker)
            .ok_or(ReconcileRejection::MarkerNotFound)?;

        let code: String = upper[start + self.marker.len()..]
            .chars()
            .take(self.code_length)
            .collect();

        if code.chars().count() < self.code_length {
            return Err(ReconcileRejection::CodeTooShort);
        }
        Ok(code)
    }
}

impl Default for TransferMemoParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
