use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::core::Library;
use crate::storage::collection::MemoryCollection;
use crate::storage::etags::{EtagEntry, MemoryEtagStore};

/// 磁盘上的目录快照格式：
///
/// ```json
/// { "collections": { "jsdelivr": [ {"name": "jquery", ...} ] },
///   "etags": { "jsdelivr": [ {"path": "jquery", "etag": "..."} ] } }
/// ```
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    collections: BTreeMap<String, Vec<Library>>,
    #[serde(default)]
    etags: BTreeMap<String, Vec<EtagEntry>>,
}

/// 一次加载得到的不可变目录视图，请求期间只读共享
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    collections: BTreeMap<String, MemoryCollection>,
    etags: MemoryEtagStore,
    fingerprint: u64,
}

impl CatalogSnapshot {
    /// 解析目录文件。同一库内资源版本号必须唯一，否则整份快照作废。
    pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
        let file: CatalogFile = serde_json::from_slice(bytes)?;
        for (name, records) in &file.collections {
            if let Some((lib, version)) = records
                .iter()
                .find_map(|lib| lib.duplicate_version().map(|v| (lib, v)))
            {
                anyhow::bail!(
                    "collection {}: library {} has duplicate asset version {}",
                    name,
                    lib.name,
                    version
                );
            }
        }
        let collections = file
            .collections
            .into_iter()
            .map(|(name, records)| (name.clone(), MemoryCollection::new(name, records)))
            .collect();
        Ok(Self {
            collections,
            etags: MemoryEtagStore::new(file.etags),
            fingerprint: xxhash_rust::xxh3::xxh3_64(bytes),
        })
    }

    pub fn collection(&self, name: &str) -> Option<&MemoryCollection> {
        self.collections.get(name)
    }

    pub fn etags(&self) -> &MemoryEtagStore {
        &self.etags
    }

    /// 各集合记录数
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.collections
            .iter()
            .map(|(k, c)| (k.clone(), c.len()))
            .collect()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// 目录存储：ArcSwap 原子切换，重载不阻塞读
pub struct CatalogStore {
    path: PathBuf,
    current: ArcSwap<CatalogSnapshot>,
    last_error: Mutex<Option<String>>,
    reloads: AtomicU64,
}

impl CatalogStore {
    pub fn from_snapshot(path: PathBuf, snapshot: CatalogSnapshot) -> Self {
        Self {
            path,
            current: ArcSwap::from_pointee(snapshot),
            last_error: Mutex::new(None),
            reloads: AtomicU64::new(0),
        }
    }

    /// 首次加载失败直接返回错误（没有可服务的旧快照）
    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow::anyhow!("read catalog {:?}: {}", path, e))?;
        let snapshot = CatalogSnapshot::from_json(&bytes)?;
        tracing::info!(
            "Catalog loaded from {:?}: {} collections",
            path,
            snapshot.collections.len()
        );
        Ok(Self::from_snapshot(path, snapshot))
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// 重新读取快照文件。内容 hash 未变时跳过解析，返回 false。
    /// 失败时保留旧快照并记录错误。
    pub async fn reload(&self) -> anyhow::Result<bool> {
        match self.try_reload().await {
            Ok(swapped) => {
                *self.last_error.lock() = None;
                Ok(swapped)
            }
            Err(e) => {
                *self.last_error.lock() = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn try_reload(&self) -> anyhow::Result<bool> {
        let bytes = tokio::fs::read(&self.path).await?;
        let hash = xxhash_rust::xxh3::xxh3_64(&bytes);
        if hash == self.current.load().fingerprint {
            tracing::debug!("Catalog unchanged ({:016x}), skip reload", hash);
            return Ok(false);
        }

        let snapshot = CatalogSnapshot::from_json(&bytes)?;
        let counts = snapshot.counts();
        self.current.store(Arc::new(snapshot));
        self.reloads.fetch_add(1, Ordering::Relaxed);
        tracing::info!("Catalog reloaded: {:?}", counts);
        Ok(true)
    }

    /// 定时重载循环
    pub async fn reload_loop(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = self.reload().await {
                tracing::warn!("Catalog reload failed, keeping previous snapshot: {}", e);
            }
        }
    }
}
