// Pure identifier resolution. Fetching the directory is the client's job;
// this module only decides what a name maps to.

use crate::error::{GistError, Result};
use crate::model::Gist;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    NotFound,
    Ambiguous(Vec<String>),
}

impl Resolution {
    /// Turn the outcome into the caller-facing error taxonomy.
    pub fn into_result(self, file_name: &str) -> Result<String> {
        match self {
            Resolution::Resolved(id) => Ok(id),
            Resolution::NotFound => Err(GistError::NotFound {
                file_name: file_name.to_string(),
            }),
            Resolution::Ambiguous(conflicting_ids) => Err(GistError::Ambiguous {
                file_name: file_name.to_string(),
                conflicting_ids,
            }),
        }
    }
}

/// Treat empty strings the same as absent ones.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Ids of every gist holding a file called `file_name`, in directory order.
pub fn matching_ids<'a, I>(file_name: &str, directory: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Gist>,
{
    directory
        .into_iter()
        .filter(|g| g.has_file(file_name))
        .map(|g| g.id.clone())
        .collect()
}

/// Map a file name to exactly one gist id within `directory`.
pub fn resolve_name<'a, I>(file_name: &str, directory: I) -> Resolution
where
    I: IntoIterator<Item = &'a Gist>,
{
    let mut ids = matching_ids(file_name, directory);
    match ids.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Resolved(ids.remove(0)),
        _ => Resolution::Ambiguous(ids),
    }
}

/// Resolve from an explicit id or a file name. An explicit id wins and is
/// returned untouched; passing neither is an `InvalidArgument`.
pub fn resolve<'a, I>(
    explicit_id: Option<&str>,
    file_name: Option<&str>,
    directory: I,
) -> Result<Resolution>
where
    I: IntoIterator<Item = &'a Gist>,
{
    if let Some(id) = non_empty(explicit_id) {
        return Ok(Resolution::Resolved(id.to_string()));
    }
    let name = non_empty(file_name).ok_or_else(|| {
        GistError::InvalidArgument("either a gist id or a file name is required".into())
    })?;
    Ok(resolve_name(name, directory))
}
