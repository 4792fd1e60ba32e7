use std::ffi::OsString;
use std::path::{Path, PathBuf};

use url::Url;

use super::options::ResumeOptions;
use crate::core::resolve_filename;

/// Where a download lands, fixed at the start of a `resume()` call.
///
/// `partial` is always `destination` with `.<partial_ext>` appended and
/// only exists on disk while the download is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub source_url:  Url,
    pub destination: PathBuf,
    pub partial:     PathBuf,
    pub chunk_size:  u64,
    pub range_unit:  String,
}

impl DownloadTarget {
    /// Uses the configured `file_path`, or derives a name from `url` under
    /// the configured download directory.
    pub fn resolve(url: &Url, options: &ResumeOptions) -> Self {
        let destination = match &options.file_path {
            Some(path) => path.clone(),
            None => options.download_dir.join(resolve_filename(url)),
        };
        let partial = partial_path(&destination, &options.partial_ext);

        Self {
            source_url: url.clone(),
            destination,
            partial,
            chunk_size: options.chunk_size,
            range_unit: options.range_unit.clone(),
        }
    }
}

/// `<destination>.<ext>`, keeping any extension the destination already has.
pub fn partial_path(destination: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
