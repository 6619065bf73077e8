use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// 单个集合的请求计数
#[derive(Debug, Default)]
struct CollectionCounters {
    find: AtomicU64,
    find_one: AtomicU64,
    not_found: AtomicU64,
    errors: AtomicU64,
}

/// 请求统计（无锁计数，按集合分桶）
#[derive(Debug, Default)]
pub struct RequestStats {
    per_collection: DashMap<String, CollectionCounters>,
}

/// 请求结果分类
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    NotFound,
    Error,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, collection: &str, find_one: bool, outcome: Outcome) {
        let entry = self
            .per_collection
            .entry(collection.to_string())
            .or_default();
        if find_one {
            entry.find_one.fetch_add(1, Ordering::Relaxed);
        } else {
            entry.find.fetch_add(1, Ordering::Relaxed);
        }
        match outcome {
            Outcome::Ok => {}
            Outcome::NotFound => {
                entry.not_found.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Error => {
                entry.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn report(&self) -> BTreeMap<String, CollectionReport> {
        self.per_collection
            .iter()
            .map(|e| {
                let c = e.value();
                (
                    e.key().clone(),
                    CollectionReport {
                        find: c.find.load(Ordering::Relaxed),
                        find_one: c.find_one.load(Ordering::Relaxed),
                        not_found: c.not_found.load(Ordering::Relaxed),
                        errors: c.errors.load(Ordering::Relaxed),
                    },
                )
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CollectionReport {
    pub find: u64,
    pub find_one: u64,
    pub not_found: u64,
    pub errors: u64,
}

/// `/status` 响应
#[derive(Clone, Debug, Default, Serialize)]
pub struct StatusReport {
    /// 各集合记录数
    pub records: BTreeMap<String, usize>,
    pub requests: BTreeMap<String, CollectionReport>,
    pub catalog_fingerprint: String,
    pub catalog_reloads: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reload_error: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "╔══════════════════════════════════════════════════╗")?;
        writeln!(f, "║           cdn-query Status Report                ║")?;
        writeln!(f, "╠══════════════════════════════════════════════════╣")?;
        writeln!(f, "║ Catalog: {:>16}  reloads: {:>10}   ║", self.catalog_fingerprint, self.catalog_reloads)?;
        for (name, count) in &self.records {
            writeln!(f, "╠──────────────────────────────────────────────────╣")?;
            writeln!(f, "║ {:<20} records: {:>10}          ║", name, count)?;
            let r = self.requests.get(name).cloned().unwrap_or_default();
            writeln!(f, "║   find:         {:>10}                       ║", r.find)?;
            writeln!(f, "║   findOne:      {:>10}                       ║", r.find_one)?;
            writeln!(f, "║   not found:    {:>10}                       ║", r.not_found)?;
            writeln!(f, "║   errors:       {:>10}                       ║", r.errors)?;
        }
        if let Some(e) = &self.last_reload_error {
            writeln!(f, "╠──────────────────────────────────────────────────╣")?;
            writeln!(f, "║ last reload error: {}", e)?;
        }
        writeln!(f, "╚══════════════════════════════════════════════════╝")?;
        Ok(())
    }
}
