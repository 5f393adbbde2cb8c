//! Filesystem-backed image store
//!
//! Files live under `<root>/<namespace>/<uuid>.<ext>` and are addressed by
//! `<public_path>/<namespace>/<uuid>.<ext>`, the same URL the static file
//! service exposes them under.

use super::{file_extension, FileStore, ImageUpload, Namespace};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub struct LocalFileStore {
    root: PathBuf,
    public_path: String,
}

impl LocalFileStore {
    /// Open the store, creating one directory per namespace
    pub async fn open(root: impl Into<PathBuf>, public_path: &str) -> Result<Self> {
        let root = root.into();
        for ns in Namespace::ALL {
            let dir = root.join(ns.as_str());
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("failed to create upload directory {}", dir.display()))?;
        }

        info!(root = %root.display(), "Upload directories ready");

        Ok(Self {
            root,
            public_path: public_path.trim_end_matches('/').to_string(),
        })
    }

    /// Map a public path back to a file under the root.
    ///
    /// Only `<public_path>/<namespace>/<file>` is accepted; anything with
    /// extra segments, parent references or an unknown namespace is refused.
    fn resolve(&self, public: &str) -> Result<PathBuf> {
        let relative = public
            .strip_prefix(&self.public_path)
            .and_then(|rest| rest.strip_prefix('/'))
            .with_context(|| format!("path {} is outside the upload directory", public))?;

        let parts: Vec<&str> = Path::new(relative)
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .with_context(|| format!("path {} is not a stored image", public))?;

        match parts.as_slice() {
            [ns, file] if Namespace::parse(ns).is_some() && !file.is_empty() => {
                Ok(self.root.join(ns).join(file))
            }
            _ => bail!("path {} is not a stored image", public),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(&self, namespace: Namespace, upload: ImageUpload) -> Result<String> {
        let ext = file_extension(upload.file_name.as_deref(), upload.content_type.as_deref());
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let target = self.root.join(namespace.as_str()).join(&file_name);

        tokio::fs::write(&target, &upload.bytes)
            .await
            .with_context(|| format!("failed to write {}", target.display()))?;

        debug!(path = %target.display(), size = upload.bytes.len(), "Stored image");

        Ok(format!("{}/{}/{}", self.public_path, namespace, file_name))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path = %target.display(), "Removed image");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", target.display())),
        }
    }
}
