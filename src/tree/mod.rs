//! Tree enumeration and artifact metadata.

mod frontmatter;
mod walk;

pub use frontmatter::{document_title, first_heading, Frontmatter};
pub use walk::{
    count_markdown, count_markdown_skipping, is_markdown, list_markdown, list_subdirs,
    walk_markdown, walk_markdown_skipping,
};
