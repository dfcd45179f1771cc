//! Turn remote flash notes into Markdown documents.
//!
//! A note body is kept as-is. When the note quotes a web page, a short
//! reference block is appended after a blank line:
//!
//! ```text
//! <content>
//!
//! 	title:<source title>
//! 	url:<source url>
//! 	quote:<quoted text on one line>
//! ```

mod filename;

use crate::remote::{ExtraReference, RawNote};

pub use self::filename::{sanitize_file_name, NameAllocator, FALLBACK_TITLE};

/// A note ready to be written into the sync folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// File stem, without the ".md" extension
    pub file_name: String,
    pub body: String,
    /// Epoch timestamps exactly as the service sent them
    pub created_at: i64,
    pub modified_at: i64,
}

impl ResolvedDocument {
    pub fn file_name_with_extension(&self) -> String {
        format!("{}.md", self.file_name)
    }
}

/// Resolve a single note.
pub fn resolve(raw: &RawNote) -> ResolvedDocument {
    let reference = ExtraReference::parse(raw.note_info.extra.as_deref());

    let mut body = raw.note_info.content.clone();
    if let Some(block) = reference.as_ref().and_then(reference_block) {
        body.push_str("\n\n");
        body.push_str(&block);
    }

    let title = resolve_title(&raw.note_meta.title, reference.as_ref());

    ResolvedDocument {
        file_name: sanitize_file_name(title),
        body,
        created_at: raw.note_meta.ctime,
        modified_at: raw.note_meta.mtime,
    }
}

/// Resolve a whole batch, keeping remote order and giving every document a
/// distinct file name.
pub fn resolve_all(raws: &[RawNote]) -> Vec<ResolvedDocument> {
    let mut names = NameAllocator::new();
    raws.iter()
        .map(|raw| {
            let mut doc = resolve(raw);
            let unique = names.allocate(&doc.file_name);
            if unique != doc.file_name {
                tracing::debug!(title = %doc.file_name, renamed = %unique, "duplicate note title");
                doc.file_name = unique;
            }
            doc
        })
        .collect()
}

fn resolve_title<'a>(meta_title: &'a str, reference: Option<&'a ExtraReference>) -> &'a str {
    if !meta_title.trim().is_empty() {
        return meta_title;
    }
    match reference.and_then(|r| r.title.as_deref()) {
        Some(title) if !title.trim().is_empty() => title,
        _ => FALLBACK_TITLE,
    }
}

/// Render the reference lines, or `None` if the reference has nothing to show.
fn reference_block(reference: &ExtraReference) -> Option<String> {
    let quote = reference
        .content
        .as_deref()
        .map(|c| c.replace(['\n', '\r'], ""));

    let fields = [
        ("title", reference.title.as_deref()),
        ("url", reference.url.as_deref()),
        ("quote", quote.as_deref()),
    ];

    let lines: Vec<String> = fields
        .iter()
        .filter_map(|(label, value)| match value {
            Some(v) if !v.is_empty() => Some(format!("\t{}:{}", label, v)),
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
