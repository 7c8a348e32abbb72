//! Parser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tokenizer and tree builder to echo parse errors when asked to.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Format a warning the way [`warn_once`] prints it, without colors.
#[must_use]
pub fn format_warning(component: &str, message: &str) -> String {
    format!("[Koala {component}] ⚠ {message}")
}

/// Warn about a diagnostic (prints once per unique message).
///
/// Returns whether the message was printed, i.e. whether it had not been seen
/// since the last [`clear_warnings`].
///
/// # Example
/// ```ignore
/// warn_once("HTML Parser", "2:5: unexpected end tag </p>");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format_warning(component, message).yellow());
    }
    should_print
}

/// Clear all recorded warnings (call before parsing a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test, so no other test clears the set between the calls.
    #[test]
    fn test_warn_once_deduplicates_until_cleared() {
        let message = "test_warn_once_deduplicates_until_cleared: stray end tag";
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
        assert!(warn_once("Other", message));

        clear_warnings();
        assert!(warn_once("Test", message));
        assert!(!warn_once("Test", message));
    }

    #[test]
    fn test_format_warning() {
        assert_eq!(
            format_warning("HTML Tokenizer", "eof-in-tag"),
            "[Koala HTML Tokenizer] ⚠ eof-in-tag"
        );
    }
}
