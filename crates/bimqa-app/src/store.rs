//! Folder of `.opset` files.
//!
//! A set is addressed by its path relative to the store root, without the
//! extension (`Walls`, `levels/Level 1`).

use anyhow::Context;
use bimqa_types::config::to_config_json;
use bimqa_types::{CONFIG_EXTENSION, OperationSetDoc, has_config_extension};
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Operation sets shipped with the tool, installed by `sets init`.
pub const BUILTIN_SETS: &[(&str, &str)] = &[
    (
        "Documentation Tags",
        include_str!("../builtin/Documentation Tags.opset"),
    ),
    ("Sloped Pipes", include_str!("../builtin/Sloped Pipes.opset")),
];

const NEW_SET_NAME: &str = "New Operation Set";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSet {
    pub name: String,
    pub path: Utf8PathBuf,
}

#[derive(Clone, Debug)]
pub struct OperationSetStore {
    root: Utf8PathBuf,
}

impl OperationSetStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Every set under the root, sorted by name. A missing root is empty.
    pub fn list(&self) -> anyhow::Result<Vec<StoredSet>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut sets = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walk {}", self.root))?;
            if !entry.file_type().is_file() || !has_config_extension(entry.path()) {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            let name = relative
                .with_extension("")
                .components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/");
            sets.push(StoredSet {
                name,
                path: path.to_path_buf(),
            });
        }
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    pub fn find(&self, name: &str) -> anyhow::Result<StoredSet> {
        self.list()?
            .into_iter()
            .find(|s| s.name == name)
            .with_context(|| format!("operation set not found: {name}"))
    }

    /// Contents of the named set.
    pub fn load(&self, name: &str) -> anyhow::Result<String> {
        let set = self.find(name)?;
        std::fs::read_to_string(&set.path).with_context(|| format!("read {}", set.path))
    }

    /// Write `doc` under `name`, replacing any existing file.
    pub fn save(&self, name: &str, doc: &OperationSetDoc) -> anyhow::Result<StoredSet> {
        let path = self.path_for(name)?;
        let text = to_config_json(doc).context("serialize operation set")?;
        write_file(&path, &text)?;
        tracing::debug!(set = name, path = %path, "operation set saved");
        Ok(StoredSet {
            name: name.to_string(),
            path,
        })
    }

    /// Create an empty set. Without a name, the first free
    /// `New Operation Set`, `New Operation Set 2`, ... is used.
    pub fn create(&self, name: Option<&str>) -> anyhow::Result<StoredSet> {
        let existing: Vec<String> = self.list()?.into_iter().map(|s| s.name).collect();
        let name = match name {
            Some(name) => {
                if existing.iter().any(|n| n == name) {
                    anyhow::bail!("operation set already exists: {name}");
                }
                name.to_string()
            }
            None => unique_name(&existing),
        };
        self.save(&name, &OperationSetDoc::new(name.clone()))
    }

    pub fn rename(&self, from: &str, to: &str) -> anyhow::Result<StoredSet> {
        let source = self.find(from)?;
        let target = self.path_for(to)?;
        if target.exists() {
            anyhow::bail!("operation set already exists: {to}");
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        std::fs::rename(&source.path, &target)
            .with_context(|| format!("rename {} to {}", source.path, target))?;
        Ok(StoredSet {
            name: to.to_string(),
            path: target,
        })
    }

    pub fn delete(&self, name: &str) -> anyhow::Result<()> {
        let set = self.find(name)?;
        std::fs::remove_file(&set.path).with_context(|| format!("delete {}", set.path))
    }

    /// Copy the built-in sets into the store. Existing files are kept.
    /// Returns the names that were written.
    pub fn install_builtin(&self) -> anyhow::Result<Vec<String>> {
        let mut installed = Vec::new();
        for (name, text) in BUILTIN_SETS {
            let path = self.path_for(name)?;
            if path.exists() {
                tracing::info!(set = *name, "built-in set already present, keeping it");
                continue;
            }
            write_file(&path, text)?;
            installed.push(name.to_string());
        }
        Ok(installed)
    }

    fn path_for(&self, name: &str) -> anyhow::Result<Utf8PathBuf> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            anyhow::bail!("operation set name must not be empty");
        }
        if name.contains('\\') || name.split('/').any(|part| part.is_empty() || part == "..") {
            anyhow::bail!("invalid operation set name: {name}");
        }
        Ok(self.root.join(format!("{name}.{CONFIG_EXTENSION}")))
    }
}

fn unique_name(existing: &[String]) -> String {
    let mut n = 1;
    loop {
        let candidate = if n > 1 {
            format!("{NEW_SET_NAME} {n}")
        } else {
            NEW_SET_NAME.to_string()
        };
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn write_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("write {path}"))
}
