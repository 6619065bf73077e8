use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 缓存校验值：path 为库名
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtagEntry {
    pub path: String,
    pub etag: String,
}

pub trait EtagStore: Send + Sync {
    /// 某集合的全部 etag；未知集合返回空
    fn etags(&self, collection: &str) -> &[EtagEntry];

    fn lookup(&self, collection: &str, path: &str) -> Option<&str> {
        self.etags(collection)
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.etag.as_str())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryEtagStore {
    by_collection: BTreeMap<String, Vec<EtagEntry>>,
}

impl MemoryEtagStore {
    pub fn new(by_collection: BTreeMap<String, Vec<EtagEntry>>) -> Self {
        Self { by_collection }
    }
}

impl EtagStore for MemoryEtagStore {
    fn etags(&self, collection: &str) -> &[EtagEntry] {
        self.by_collection
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
