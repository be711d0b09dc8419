use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[cfg(not(unix))]
/// Mode recorded for files on platforms without `st_mode`
const DEFAULT_FILE_MODE: u32 = 0o100644;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Normalize a user-supplied path to the `/`-separated key used by the index
    pub fn relative_path(&self, path: &Path) -> anyhow::Result<String> {
        let path = path.strip_prefix(&self.path).unwrap_or(path);

        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => segments.push(
                    name.to_str()
                        .with_context(|| format!("Path {path:?} is not valid UTF-8"))?
                        .to_string(),
                ),
                Component::CurDir => {}
                Component::ParentDir if segments.pop().is_some() => {}
                _ => anyhow::bail!("Path {} is outside the repository", path.display()),
            }
        }

        if segments.is_empty() {
            anyhow::bail!("Path {} does not name a file", path.display());
        }

        Ok(segments.join("/"))
    }

    pub fn full_path(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    pub fn is_file(&self, relative: &str) -> bool {
        self.full_path(relative).is_file()
    }

    /// Every file below the root, skipping hidden directories (the control directory
    /// among them), as sorted `/`-separated relative paths
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.file_type().is_dir() && Self::is_hidden(entry.file_name())));

        for entry in walker {
            let entry = entry.context("Unable to walk the working tree")?;
            if entry.file_type().is_file() {
                files.push(self.relative_path(entry.path())?);
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_hidden(name: &std::ffi::OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }

    pub fn read_file(&self, relative: &str) -> anyhow::Result<Bytes> {
        let file_path = self.full_path(relative);
        if !file_path.is_file() {
            return Err(RepositoryError::FileNotFound(file_path).into());
        }

        let content = std::fs::read(&file_path)
            .with_context(|| format!("Unable to read file {}", file_path.display()))?;

        Ok(Bytes::from(content))
    }

    pub fn file_mode(&self, relative: &str) -> anyhow::Result<u32> {
        let file_path = self.full_path(relative);
        let metadata = std::fs::metadata(&file_path)
            .with_context(|| format!("Unable to stat file {}", file_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            Ok(metadata.permissions().mode())
        }

        #[cfg(not(unix))]
        {
            let _ = metadata;
            Ok(DEFAULT_FILE_MODE)
        }
    }

    pub fn write_file(&self, relative: &str, data: &[u8]) -> anyhow::Result<()> {
        let file_path = self.full_path(relative);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        std::fs::write(&file_path, data)
            .with_context(|| format!("Failed to write to file: {:?}", relative))
    }

    /// Remove a file; a file that is already gone is not an error
    pub fn remove_file(&self, relative: &str) -> anyhow::Result<()> {
        let file_path = self.full_path(relative);

        match std::fs::remove_file(&file_path) {
            Err(error) if error.kind() != std::io::ErrorKind::NotFound => {
                Err(error).with_context(|| format!("Failed to remove file: {:?}", relative))
            }
            _ => Ok(()),
        }
    }

    /// Remove the now-empty parent directories of the given files, deepest first
    pub fn prune_empty_dirs<'p>(&self, files: impl Iterator<Item = &'p str>) -> anyhow::Result<()> {
        let mut dirs = BTreeSet::new();
        for file in files {
            let mut dir = Path::new(file).parent();
            while let Some(parent) = dir.filter(|p| !p.as_os_str().is_empty()) {
                dirs.insert(parent.to_path_buf());
                dir = parent.parent();
            }
        }

        let mut dirs = dirs.into_iter().collect::<Vec<_>>();
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.as_os_str().len()));

        for dir in dirs {
            let dir_path = self.path.join(&dir);
            let is_empty = dir_path
                .read_dir()
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);

            if is_empty {
                std::fs::remove_dir(&dir_path)
                    .with_context(|| format!("Failed to remove directory: {:?}", dir))?;
            }
        }

        Ok(())
    }
}
