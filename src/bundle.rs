// File splitter: one local text file becomes a bundle of named blocks,
// cut on whole lines that equal the separator marker.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{GistError, Result};

/// Content of one file inside a bundle, as the remote service expects it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub content: String,
}

/// Request body for create and update. `public` is always true.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FileBundle {
    pub public: bool,
    pub files: BTreeMap<String, FileContent>,
}

impl FileBundle {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn content(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|f| f.content.as_str())
    }
}

/// Name of block `index` for a file called `base_name`.
///
/// Block 0 keeps the base name. Later blocks get `_<index>` in front of the
/// extension. Only the first `.<ext>` from the left is rewritten, so
/// `a.py.py` turns into `a_1.py.py`; remote names may already rely on that.
pub fn block_file_name(base_name: &str, index: usize) -> String {
    if index == 0 {
        return base_name.to_string();
    }
    match Path::new(base_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let dotted = format!(".{ext}");
            base_name.replacen(&dotted, &format!("_{index}{dotted}"), 1)
        }
        None => format!("{base_name}_{index}"),
    }
}

/// Cut `text` into blocks on lines equal to `separator`. The separator
/// lines are dropped; empty blocks are kept.
pub fn split_blocks(text: &str, separator: &str) -> Vec<String> {
    let mut blocks = vec![String::new()];
    for line in text.split_inclusive('\n') {
        let bare = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        if bare == separator {
            blocks.push(String::new());
        } else if let Some(current) = blocks.last_mut() {
            current.push_str(line);
        }
    }
    blocks
}

/// Build a bundle from already-loaded text.
pub fn split_text(base_name: &str, text: &str, separator: &str) -> FileBundle {
    let files = split_blocks(text, separator)
        .into_iter()
        .enumerate()
        .map(|(i, content)| (block_file_name(base_name, i), FileContent { content }))
        .collect();
    FileBundle {
        public: true,
        files,
    }
}

/// Read `path` as UTF-8 and split it into a bundle.
pub fn split_file(path: &Path, separator: &str) -> Result<FileBundle> {
    if separator.is_empty() {
        return Err(GistError::InvalidArgument(
            "separator must not be empty".into(),
        ));
    }
    let text = std::fs::read_to_string(path).map_err(|source| GistError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let base_name = base_name(path)?;
    let bundle = split_text(&base_name, &text, separator);
    log::debug!("Split {} into {} file(s)", path.display(), bundle.len());
    Ok(bundle)
}

/// Final path component as a string.
pub fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GistError::InvalidArgument(format!("{} has no usable file name", path.display()))
        })
}
