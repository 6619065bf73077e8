use serde_json::{Map, Value};

use crate::core::{Asset, Library, Query, Schema, INTERNAL_ID_KEY};

/// 待整形的选择结果：输出形状与输入一致（单条 → 对象，多条 → 数组）
#[derive(Debug)]
pub enum Selection<'a> {
    One(&'a Library),
    Many(Vec<&'a Library>),
}

/// v2 响应整形器。
///
/// 源记录只读：每条记录都先构造一份独立的 JSON 对象，再做 assets 重组、
/// 内部 id 剥离与字段投影，调用方永远观察不到被改动的源记录。
pub struct Formatter<'s> {
    schema: &'s Schema,
}

impl<'s> Formatter<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn format(&self, query: &Query, selection: &Selection<'_>) -> Value {
        let fields = self.projected_fields(query);
        match selection {
            Selection::One(lib) => {
                let exclude_assets = !query.requests_assets();
                Value::Object(self.format_record(lib, exclude_assets, &fields))
            }
            // 多结果永远不返回嵌套的 assets 明细
            Selection::Many(libs) => Value::Array(
                libs.iter()
                    .map(|lib| Value::Object(self.format_record(lib, true, &fields)))
                    .collect(),
            ),
        }
    }

    fn projected_fields<'q>(&'q self, query: &'q Query) -> Vec<&'q str> {
        match query.fields() {
            Some(f) => f.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
            None => self.schema.fields().iter().map(String::as_str).collect(),
        }
    }

    fn format_record(
        &self,
        lib: &Library,
        exclude_assets: bool,
        fields: &[&str],
    ) -> Map<String, Value> {
        let mut obj = lib.attrs.clone();
        obj.insert("name".to_string(), Value::String(lib.name.clone()));

        if let Some(assets) = &lib.assets {
            if !exclude_assets {
                let by_version = assets_by_version(assets);
                obj.insert("assets".to_string(), Value::Object(by_version));
            }
        }

        obj.remove(INTERNAL_ID_KEY);
        obj.retain(|k, _| fields.contains(&k.as_str()));
        obj
    }
}

/// `[{version, files, ..}]` → `{version: {files, ..}}`
///
/// 版本号唯一由目录加载时保证（见 `CatalogSnapshot::from_json`），这里一一对应。
fn assets_by_version(assets: &[Asset]) -> Map<String, Value> {
    let mut out = Map::with_capacity(assets.len());
    for asset in assets {
        let mut payload = asset.attrs.clone();
        payload.remove("version");
        payload.insert(
            "files".to_string(),
            Value::Array(asset.files.iter().cloned().map(Value::String).collect()),
        );
        out.insert(asset.version.clone(), Value::Object(payload));
    }
    out
}
