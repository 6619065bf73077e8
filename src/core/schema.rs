use serde::{Deserialize, Serialize};

/// v2 公共 schema 的默认投影字段
pub const DEFAULT_FIELDS: &[&str] = &[
    "name",
    "mainfile",
    "lastversion",
    "description",
    "homepage",
    "github",
    "author",
    "versions",
    "assets",
];

/// 不可变的 schema 配置：默认投影字段集合，同时也是合法过滤键的集合
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(DEFAULT_FIELDS.iter().copied())
    }
}
