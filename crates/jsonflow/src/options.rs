/// Configuration for a [`JsonProcessor`](crate::JsonProcessor).
///
/// # Examples
///
/// ```rust
/// use jsonflow::{DuplicateKeys, ProcessorOptions};
///
/// let options = ProcessorOptions {
///     stream_array: true,
///     duplicate_keys: DuplicateKeys::Reject,
///     ..Default::default()
/// };
/// assert_eq!(options.tokenizer.max_depth, 1000);
/// ```
///
/// # Default
///
/// Array streaming is off, duplicate keys keep the last value, and the
/// tokenizer uses [`TokenizerOptions::default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Whether the elements of a top-level array are emitted one by one.
    ///
    /// When `true` and the root value is an array, every element is handed
    /// downstream as soon as it completes, and the array itself is never
    /// emitted. Its closing bracket ends the stream. A root value that is not
    /// an array is unaffected.
    ///
    /// ```json
    /// [{"id":1}, {"id":2}, 3]
    /// ```
    ///
    /// yields three values instead of one.
    ///
    /// # Default
    ///
    /// `false`
    pub stream_array: bool,

    /// What to do when an object repeats a key.
    ///
    /// # Default
    ///
    /// [`DuplicateKeys::LastWins`]
    pub duplicate_keys: DuplicateKeys,

    /// Options for the default tokenizer.
    pub tokenizer: TokenizerOptions,
}

/// Policy for repeated keys within one JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeys {
    /// The last value wins and keeps the position of the first occurrence.
    #[default]
    LastWins,
    /// A repeated key is a malformed-structure error.
    Reject,
}

/// Default nesting limit of [`TokenizerOptions`].
pub(crate) const DEFAULT_MAX_DEPTH: usize = 1000;

/// Configuration for the default [`JsonTokenizer`](crate::JsonTokenizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Maximum number of simultaneously open objects and arrays.
    ///
    /// Opening one more container is a syntax error.
    ///
    /// Assembly itself uses an explicit stack, but dropping, comparing,
    /// formatting and serializing a [`Node`](crate::Node) recurse once per
    /// nesting level. Raising the limit far beyond the default can overflow
    /// the thread's stack when a deep value is later dropped or printed.
    ///
    /// # Default
    ///
    /// `1000`
    pub max_depth: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
