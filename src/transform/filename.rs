//! File name helpers for resolved notes

use std::collections::HashSet;

pub const FALLBACK_TITLE: &str = "untitled";

/// Longest file stem we emit, leaving room for a suffix and ".md"
const MAX_STEM_BYTES: usize = 200;

const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a note title into a file stem that every common file system accepts.
///
/// - Replaces path separators, reserved punctuation and control characters with `_`
/// - Trims surrounding whitespace and dots, so the file is never hidden
/// - Caps the length at a character boundary
/// - Falls back to "untitled" if nothing usable is left
pub fn sanitize_file_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if c.is_control() || ILLEGAL_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let mut name = replaced.trim().trim_matches('.').trim().to_string();

    if name.len() > MAX_STEM_BYTES {
        let mut cut = MAX_STEM_BYTES;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        name.truncate(cut);
        name = name.trim_end().trim_end_matches('.').to_string();
    }

    if name.is_empty() {
        return FALLBACK_TITLE.to_string();
    }

    name
}

/// Hand out file stems that are unique within one sync pass.
///
/// Collisions are detected case-insensitively since the target folder may
/// live on a case-insensitive file system.
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, stem: &str) -> String {
        if self.used.insert(stem.to_lowercase()) {
            return stem.to_string();
        }

        let mut n = 2;
        loop {
            let candidate = format!("{} ({})", stem, n);
            if self.used.insert(candidate.to_lowercase()) {
                return candidate;
            }
            n += 1;
        }
    }
}
