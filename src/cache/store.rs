use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

use super::{ArtifactKey, ArtifactStore};

/// 以暂存目录为后端的产物存储，每个产物一个文件
pub struct DiskArtifactStore {
    root: PathBuf,
}

impl DiskArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, key: &ArtifactKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

#[async_trait]
impl ArtifactStore for DiskArtifactStore {
    async fn contains(&self, key: &ArtifactKey) -> bool {
        fs::metadata(self.path_of(key))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn read(&self, key: &ArtifactKey) -> Result<Option<String>> {
        let path = self.path_of(key);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read artifact {:?}", path)),
        }
    }

    async fn write(&self, key: &ArtifactKey, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create staging dir {:?}", self.root))?;

        // 产物只在完整写入后才出现在最终路径上
        let path = self.path_of(key);
        let partial = self.root.join(format!(".{}.partial", key.as_str()));
        fs::write(&partial, contents)
            .await
            .with_context(|| format!("Failed to write artifact {:?}", partial))?;
        fs::rename(&partial, &path)
            .await
            .with_context(|| format!("Failed to move artifact into place {:?}", path))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if fs::metadata(&self.root).await.is_ok() {
            fs::remove_dir_all(&self.root)
                .await
                .with_context(|| format!("Failed to clear staging dir {:?}", self.root))?;
        }
        Ok(())
    }
}

/// 内存中的产物存储，用于测试
#[derive(Default)]
pub struct MemoryArtifactStore {
    artifacts: Mutex<HashMap<ArtifactKey, String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置产物，模拟上一次运行留下的检查点
    pub fn with_artifact(self, key: ArtifactKey, contents: impl Into<String>) -> Self {
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.insert(key, contents.into());
        }
        self
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn contains(&self, key: &ArtifactKey) -> bool {
        self.artifacts
            .lock()
            .map(|artifacts| artifacts.contains_key(key))
            .unwrap_or(false)
    }

    async fn read(&self, key: &ArtifactKey) -> Result<Option<String>> {
        let artifacts = self
            .artifacts
            .lock()
            .map_err(|_| anyhow::anyhow!("artifact store lock poisoned"))?;
        Ok(artifacts.get(key).cloned())
    }

    async fn write(&self, key: &ArtifactKey, contents: &str) -> Result<()> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|_| anyhow::anyhow!("artifact store lock poisoned"))?;
        artifacts.insert(key.clone(), contents.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut artifacts = self
            .artifacts
            .lock()
            .map_err(|_| anyhow::anyhow!("artifact store lock poisoned"))?;
        artifacts.clear();
        Ok(())
    }
}
