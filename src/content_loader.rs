use std::fs::{self, File, Metadata};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::file_meta::FileMetadata;
use crate::markdown::render_markdown_to_html;
use crate::models::{PostBlurb, PostModel};
use crate::parser::{parse_markdown_post, ParsedDocument};
use crate::store::{validate_slug, PostStore, StoreError};

const MARKDOWN_EXT: &str = ".md";

/// A [`PostStore`] over a flat directory of `*.md` files. Every call rereads
/// the directory.
pub struct FilesystemStore {
    dir: PathBuf,
    index_path: String,
    metadata: Arc<dyn FileMetadata>,
    open: fn(&Path) -> io::Result<File>,
}

impl FilesystemStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        index_path: impl Into<String>,
        metadata: Arc<dyn FileMetadata>,
    ) -> Self {
        Self {
            dir: dir.into(),
            index_path: index_path.into(),
            metadata,
            open: |path| File::open(path),
        }
    }

    #[cfg(test)]
    fn with_opener(self, open: fn(&Path) -> io::Result<File>) -> Self {
        Self { open, ..self }
    }

    /// Regular `.md` files in the directory, in filename order. Symlinks are
    /// not followed.
    fn markdown_files(&self) -> Result<Vec<(String, PathBuf, Metadata)>, StoreError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.ends_with(MARKDOWN_EXT) {
                continue;
            }
            let path = entry.path();
            match entry.metadata() {
                Ok(meta) if meta.is_file() => files.push((name, path, meta)),
                Ok(_) => {}
                Err(e) => warn!("Skipping {:?}: {}", path, e),
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    fn blurb(
        &self,
        path: &Path,
        meta: &Metadata,
        slug: &str,
        fallback_title: &str,
        parsed: &ParsedDocument,
    ) -> PostBlurb {
        PostBlurb {
            title: first_defined(&parsed.title, fallback_title),
            author: self.metadata.owner(path, meta),
            created: self.metadata.created_at(path, meta),
            slug: slug.to_string(),
            teaser_html: render_markdown_to_html(&parsed.teaser_markdown),
        }
    }
}

impl PostStore for FilesystemStore {
    fn index(&self) -> Result<Vec<PostBlurb>, StoreError> {
        let files = self.markdown_files()?;
        debug!("Indexing {} posts in {:?}", files.len(), self.dir);

        let mut posts = Vec::with_capacity(files.len());
        for (name, path, meta) in files {
            let parsed = match (self.open)(&path) {
                Ok(file) => parse_markdown_post(BufReader::new(file)),
                Err(e) => {
                    warn!("Skipping unreadable post {:?}: {}", path, e);
                    continue;
                }
            };
            let slug = name.strip_suffix(MARKDOWN_EXT).unwrap_or(&name);
            posts.push(self.blurb(&path, &meta, slug, &name, &parsed));
        }

        // Newest first; equal timestamps come out in reverse listing order.
        posts.sort_by(|a, b| a.created.cmp(&b.created));
        posts.reverse();
        Ok(posts)
    }

    fn get(&self, slug: &str) -> Result<PostModel, StoreError> {
        validate_slug(slug)?;

        let path = self.dir.join(format!("{slug}{MARKDOWN_EXT}"));
        let not_found = |e: std::io::Error| {
            debug!("No post at {:?}: {}", path, e);
            StoreError::NotFound(slug.to_string())
        };
        let meta = fs::symlink_metadata(&path).map_err(not_found)?;
        if !meta.is_file() {
            debug!("Not a regular file: {:?}", path);
            return Err(StoreError::NotFound(slug.to_string()));
        }
        let file = (self.open)(&path).map_err(not_found)?;

        let parsed = parse_markdown_post(BufReader::new(file));
        Ok(PostModel {
            blurb: self.blurb(&path, &meta, slug, slug, &parsed),
            index_path: self.index_path.clone(),
            body_html: render_markdown_to_html(&parsed.body_markdown),
        })
    }
}

fn first_defined(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
