use crate::core::Library;
use crate::query::params::Filter;

/// 集合层抽象：只需要按过滤条件取候选，顺序为存储顺序
pub trait Collection: Send + Sync {
    fn name(&self) -> &str;

    /// 全量记录（存储顺序）
    fn data(&self) -> &[Library];

    /// 满足全部过滤条件的记录（存储顺序，借用，不复制记录）
    fn find(&self, filters: &[Filter]) -> Vec<&Library> {
        self.data()
            .iter()
            .filter(|lib| filters.iter().all(|f| f.matches(lib)))
            .collect()
    }
}

/// 内存集合（目录快照中的一个 cdn）
#[derive(Clone, Debug, Default)]
pub struct MemoryCollection {
    name: String,
    records: Vec<Library>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>, records: Vec<Library>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &[Library] {
        &self.records
    }
}
