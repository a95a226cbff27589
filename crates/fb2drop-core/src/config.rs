//! Policy configuration for archive validation and extraction.

/// Archive acceptance policy with default-deny settings.
///
/// The configuration is read-only for the duration of a pipeline run and
/// is safe to share between concurrent requests by reference.
///
/// # Examples
///
/// ```
/// use fb2drop_core::PolicyConfig;
///
/// let config = PolicyConfig::default();
///
/// // Tighten for a constrained deployment
/// let strict = PolicyConfig {
///     max_payload_size: 4 * 1024 * 1024, // 4 MiB
///     max_compression_ratio: 20.0,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Maximum declared uncompressed payload size in bytes.
    pub max_payload_size: u64,

    /// Maximum compression ratio allowed (uncompressed / compressed).
    pub max_compression_ratio: f64,

    /// Required payload extension, without the leading dot.
    /// Matched case-insensitively against the entry name.
    pub required_extension: String,

    /// Number of entries the archive must contain.
    pub required_entry_count: usize,
}

impl Default for PolicyConfig {
    /// Creates a `PolicyConfig` with the stated defaults.
    ///
    /// Default values:
    /// - `max_payload_size`: 32 MiB (33,554,432 bytes)
    /// - `max_compression_ratio`: 100.0
    /// - `required_extension`: `"fb2"`
    /// - `required_entry_count`: 1
    fn default() -> Self {
        Self {
            max_payload_size: 32 * 1024 * 1024,
            max_compression_ratio: 100.0,
            required_extension: "fb2".to_string(),
            required_entry_count: 1,
        }
    }
}

impl PolicyConfig {
    /// Returns the required extension with a leading dot, lowercased,
    /// for suffix matching against declared entry names.
    #[must_use]
    pub fn extension_suffix(&self) -> String {
        format!(".{}", self.required_extension.to_ascii_lowercase())
    }
}
