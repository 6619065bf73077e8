use serde_json::Value;

use crate::core::{Library, Query, Schema, FIELDS_KEY, NAME_KEY, VERSION_KEY};

/// 单个过滤条件：字段值等于任一候选值
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn matches(&self, lib: &Library) -> bool {
        match lib.attr(&self.field) {
            Some(v) => self.matches_value(&v),
            None => false,
        }
    }

    fn matches_value(&self, v: &Value) -> bool {
        match v {
            Value::Array(items) => items.iter().any(|i| self.matches_value(i)),
            Value::String(s) => self.values.iter().any(|x| x == s),
            Value::Null | Value::Object(_) => false,
            other => {
                let text = other.to_string();
                self.values.iter().any(|x| *x == text)
            }
        }
    }
}

/// 查询参数 → 集合过滤条件。
///
/// 排除 `name`（由名称匹配单独处理）以及 `fields` / `version` 控制键；
/// 不在 schema 中的键忽略。值中的 `,` 表示任一匹配。
pub fn build_action_params(query: &Query, schema: &Schema) -> Vec<Filter> {
    query
        .iter()
        .filter(|(k, v)| !v.is_empty() && !is_control_key(k) && schema.contains(k))
        .map(|(k, v)| Filter {
            field: k.to_string(),
            values: v.split(',').map(|s| s.to_string()).collect(),
        })
        .collect()
}

/// 查询中是否带有至少一个可用参数（名称或 schema 字段）
pub fn has_param(query: &Query, schema: &Schema) -> bool {
    query.iter().any(|(k, v)| {
        !v.is_empty() && (k == NAME_KEY || (!is_control_key(k) && schema.contains(k)))
    })
}

fn is_control_key(k: &str) -> bool {
    k == NAME_KEY || k == FIELDS_KEY || k == VERSION_KEY
}
