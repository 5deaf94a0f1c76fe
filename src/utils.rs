//! # Utility Functions Module
//!
//! Small helpers for building external command lines.

/// Converts any iterable of string-like items into owned argument strings.
///
/// Used to build ffmpeg/ffprobe argument vectors without a `.to_string()`
/// on every element.
///
/// # Example
/// ```rust
/// use media_squash::utils::to_string_vec;
///
/// let crf = 28;
/// let argv = to_string_vec(["-crf", &crf.to_string(), "-preset", "slow"]);
/// assert_eq!(argv[1], "28");
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Build an argument vector from items of a single string-like type.
///
/// ```rust
/// use media_squash::args;
///
/// let argv = args!["-c:a", "libopus", "-b:a", "96k"];
/// assert_eq!(argv.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item),*])
    };
}
