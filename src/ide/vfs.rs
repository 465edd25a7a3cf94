//! In-memory directory tree of rendered template entries.
//!
//! Entries are inserted by their rendered relative path; intermediate
//! directories are created on demand. The tree is written out with
//! [`VfsDirectory::write`] and also drives the layout of the exported
//! descriptor.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::template::FileEntry;

/// Errors that can occur when inserting into the tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InsertError {
    #[error("'{0}' is already part of the template")]
    Duplicate(PathBuf),
    #[error("invalid path '{0}'")]
    InvalidPath(String),
    #[error("'{0}' is a file, not a directory")]
    NotADirectory(PathBuf),
}

#[derive(Debug)]
pub struct VfsFile<'t> {
    pub name: String,
    /// Path relative to the tree root.
    pub path: PathBuf,
    /// Resolved absolute source file.
    pub source: PathBuf,
    pub entry: &'t FileEntry,
}

#[derive(Debug)]
pub enum VfsNode<'t> {
    Directory(VfsDirectory<'t>),
    File(VfsFile<'t>),
}

impl VfsNode<'_> {
    pub fn name(&self) -> &str {
        match self {
            VfsNode::Directory(d) => &d.name,
            VfsNode::File(f) => &f.name,
        }
    }
}

#[derive(Debug, Default)]
pub struct VfsDirectory<'t> {
    /// Empty for the root.
    pub name: String,
    pub path: PathBuf,
    pub entries: Vec<VfsNode<'t>>,
}

/// Splits a rendered path on either separator, dropping empty and `.` parts.
fn split_path(relative: &str) -> std::result::Result<Vec<&str>, InsertError> {
    let parts: Vec<&str> = relative
        .split(['/', '\\'])
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();
    if parts.is_empty() || parts.contains(&"..") {
        return Err(InsertError::InvalidPath(relative.to_string()));
    }
    Ok(parts)
}

impl<'t> VfsDirectory<'t> {
    pub fn root() -> Self {
        Self::default()
    }

    /// Inserts a file at `relative` and returns its normalized relative path.
    pub fn insert(
        &mut self,
        relative: &str,
        source: PathBuf,
        entry: &'t FileEntry,
    ) -> std::result::Result<PathBuf, InsertError> {
        let parts = split_path(relative)?;
        let (file_name, dirs) = parts
            .split_last()
            .ok_or_else(|| InsertError::InvalidPath(relative.to_string()))?;

        let mut dir = self;
        for part in dirs {
            let index = match dir.entries.iter().position(|e| e.name() == *part) {
                Some(index) => index,
                None => {
                    dir.entries.push(VfsNode::Directory(VfsDirectory {
                        name: part.to_string(),
                        path: dir.path.join(part),
                        entries: Vec::new(),
                    }));
                    dir.entries.len() - 1
                }
            };
            dir = match &mut dir.entries[index] {
                VfsNode::Directory(sub) => sub,
                VfsNode::File(file) => return Err(InsertError::NotADirectory(file.path.clone())),
            };
        }

        let path = dir.path.join(file_name);
        if dir.entries.iter().any(|e| e.name() == *file_name) {
            return Err(InsertError::Duplicate(path));
        }
        dir.entries.push(VfsNode::File(VfsFile {
            name: file_name.to_string(),
            path: path.clone(),
            source,
            entry,
        }));
        Ok(path)
    }

    /// Looks up a directory by its path relative to this one.
    pub fn find_dir(&self, relative: &Path) -> Option<&VfsDirectory<'t>> {
        let mut dir = self;
        for part in relative.iter() {
            dir = dir.entries.iter().find_map(|e| match e {
                VfsNode::Directory(sub) if sub.name.as_str() == part.to_string_lossy() => Some(sub),
                _ => None,
            })?;
        }
        Some(dir)
    }

    /// All files below this directory, depth first in insertion order.
    pub fn files(&self) -> Vec<&VfsFile<'t>> {
        let mut files = Vec::new();
        for entry in &self.entries {
            match entry {
                VfsNode::Directory(sub) => files.extend(sub.files()),
                VfsNode::File(file) => files.push(file),
            }
        }
        files
    }

    /// Creates every directory under `root` and hands each file with its
    /// absolute destination to `write_file`.
    pub fn write<F>(&self, root: &Path, write_file: &mut F) -> Result<()>
    where
        F: FnMut(&Path, &VfsFile<'t>) -> Result<()>,
    {
        fs::create_dir_all(root.join(&self.path))?;
        for entry in &self.entries {
            match entry {
                VfsNode::Directory(sub) => sub.write(root, write_file)?,
                VfsNode::File(file) => write_file(&root.join(&file.path), file)?,
            }
        }
        Ok(())
    }
}
