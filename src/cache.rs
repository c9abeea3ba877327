//! Thread-local compiled-pattern cache.
//!
//! Every pattern in the system (match patterns and exception rules) goes
//! through one compilation path with the same limits. Compiled programs
//! are cached per thread, capped at 256 entries; the cache is cleared and
//! rebuilt on demand when full.

use crate::matcher::PatternError;
use regex::{Regex, RegexBuilder};
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

/// Compiled-program budget. The engine is linear-time in the input, so
/// runtime cannot blow up; this bounds the compile side for hostile
/// patterns instead.
const SIZE_LIMIT: usize = 1 << 21;

thread_local! {
    static PATTERN_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Get a compiled pattern from the cache, or compile and cache it.
///
/// Patterns compile unicode-aware with multiline anchors. Failures are
/// not cached; a bad pattern fails identically on every call.
pub fn get_or_compile(pattern: &str) -> Result<Regex, PatternError> {
    PATTERN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }

        let regex = compile(pattern)?;
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    })
}

fn compile(pattern: &str) -> Result<Regex, PatternError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .unicode(true)
        .size_limit(SIZE_LIMIT)
        .build()
        .map_err(|err| match err {
            regex::Error::CompiledTooBig(_) => PatternError::TooLarge {
                pattern: pattern.to_string(),
            },
            other => PatternError::Invalid {
                pattern: pattern.to_string(),
                message: other.to_string(),
            },
        })
}

/// Clear the pattern cache (mainly for testing).
pub fn clear_cache() {
    PATTERN_CACHE.with(|cache| {
        cache.borrow_mut().clear();
    });
}

/// Current number of cached patterns on this thread.
pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
}
