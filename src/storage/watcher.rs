use notify::{Config, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::storage::catalog::CatalogStore;

/// 目录快照文件监听器
/// 使用 bounded channel 做背压，避免无限堆积
pub struct CatalogWatcher;

impl CatalogWatcher {
    /// 启动监听，返回变更通知接收端
    ///
    /// 监听的是父目录（非递归）：编辑器/部署脚本常用 rename 替换文件，直接监听文件会丢事件。
    pub fn start(
        catalog: &Path,
        channel_size: usize,
        overflow_drops: Arc<AtomicU64>,
    ) -> anyhow::Result<(mpsc::Receiver<()>, notify::RecommendedWatcher)> {
        let (tx, rx) = mpsc::channel(channel_size);
        let target: PathBuf = catalog.to_path_buf();

        let mut watcher = notify::RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let Ok(event) = res else { return };
                if !touches_catalog(&event, &target) {
                    return;
                }
                // 非阻塞发送：队列满时丢弃并计数（队列里已有待处理的重载）
                if tx.try_send(()).is_err() {
                    overflow_drops.fetch_add(1, Ordering::Relaxed);
                }
            },
            Config::default(),
        )?;

        let dir = catalog
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        // 注意：watcher 必须由调用方持有，否则会被 drop
        Ok((rx, watcher))
    }
}

/// 只关心创建/修改事件，且路径指向快照文件本身（同目录下其他文件忽略）
fn touches_catalog(event: &notify::Event, catalog: &Path) -> bool {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return false;
    }
    let file_name = catalog.file_name();
    event
        .paths
        .iter()
        .any(|p| p == catalog || (file_name.is_some() && p.file_name() == file_name))
}

/// 消费变更通知：debounce 窗口内的多次写入合并为一次重载
pub async fn reload_on_change(store: Arc<CatalogStore>, mut rx: mpsc::Receiver<()>, debounce: Duration) {
    while rx.recv().await.is_some() {
        tokio::time::sleep(debounce).await;
        while rx.try_recv().is_ok() {}

        match store.reload().await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Catalog change event without content change"),
            Err(e) => tracing::warn!("Catalog reload failed, keeping previous snapshot: {}", e),
        }
    }
}
