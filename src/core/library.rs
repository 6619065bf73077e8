use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 存储层内部 id 的字段名（对外响应中必须剥离）
pub const INTERNAL_ID_KEY: &str = "$loki";

/// 目录条目：一个具名库及其按版本划分的资源包
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    /// 有序资源序列；同一库内 version 唯一
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Asset>>,
    #[serde(rename = "$loki", default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<Value>,
    /// 其余属性（mainfile / lastversion / versions ...）原样保留
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

/// 单个版本的文件清单
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub version: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(flatten)]
    pub attrs: Map<String, Value>,
}

impl Library {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assets: None,
            internal_id: None,
            attrs: Map::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// 按字段名读取属性，供过滤参数比较使用。
    /// `assets` 与内部 id 不参与过滤，返回 None。
    pub fn attr(&self, field: &str) -> Option<Value> {
        match field {
            "name" => Some(Value::String(self.name.clone())),
            "assets" | INTERNAL_ID_KEY => None,
            _ => self.attrs.get(field).cloned(),
        }
    }

    /// 第一个重复出现的资源版本号（若有）
    pub fn duplicate_version(&self) -> Option<&str> {
        let assets = self.assets.as_deref()?;
        let mut seen = std::collections::HashSet::with_capacity(assets.len());
        assets
            .iter()
            .map(|a| a.version.as_str())
            .find(|v| !seen.insert(*v))
    }
}

impl Asset {
    pub fn new<I, S>(version: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: version.into(),
            files: files.into_iter().map(Into::into).collect(),
            attrs: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_keeps_extra_attributes_and_internal_id() {
        let lib: Library = serde_json::from_value(json!({
            "name": "jquery",
            "mainfile": "jquery.min.js",
            "assets": [{"version": "1.0.0", "files": ["a.js"], "baseUrl": "/x"}],
            "$loki": 7
        }))
        .unwrap();

        assert_eq!(lib.name, "jquery");
        assert_eq!(lib.internal_id, Some(json!(7)));
        assert_eq!(lib.attrs.get("mainfile"), Some(&json!("jquery.min.js")));
        let assets = lib.assets.as_ref().unwrap();
        assert_eq!(assets[0].files, vec!["a.js".to_string()]);
        assert_eq!(assets[0].attrs.get("baseUrl"), Some(&json!("/x")));
    }

    #[test]
    fn missing_assets_stays_absent() {
        let lib: Library = serde_json::from_value(json!({"name": "a"})).unwrap();
        assert!(lib.assets.is_none());
        assert!(lib.attr("assets").is_none());
        assert_eq!(lib.attr("name"), Some(json!("a")));
    }

    #[test]
    fn duplicate_version_reports_first_repeat() {
        let ok = Library::new("a").with_assets(vec![Asset::new("1", ["a.js"]), Asset::new("2", ["b.js"])]);
        assert_eq!(ok.duplicate_version(), None);
        assert_eq!(Library::new("b").duplicate_version(), None);

        let dup = Library::new("c").with_assets(vec![
            Asset::new("1", ["a.js"]),
            Asset::new("2", ["b.js"]),
            Asset::new("1", ["c.js"]),
        ]);
        assert_eq!(dup.duplicate_version(), Some("1"));
    }
}
