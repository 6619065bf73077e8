use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NAME_KEY: &str = "name";
pub const VERSION_KEY: &str = "version";
pub const FIELDS_KEY: &str = "fields";

/// 客户端查询：过滤键 → 值。
///
/// `name` / `version` / `fields` 为保留键，其余键作为不透明的过滤参数交给集合层。
/// 空字符串与缺省同义。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(BTreeMap<String, String>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// 非空值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(VERSION_KEY)
    }

    pub fn fields(&self) -> Option<&str> {
        self.get(FIELDS_KEY)
    }

    /// 调用方是否显式请求了 `assets` 字段
    pub fn requests_assets(&self) -> bool {
        self.fields()
            .map(|f| f.split(',').any(|s| s.trim() == "assets"))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
