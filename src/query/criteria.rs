use crate::query::matcher::{AnyOfMatcher, GlobMatcher, Matcher};

/// 名称模式：编译一次，匹配多次
#[derive(Debug)]
pub enum NamePattern {
    /// `a,b` → 任一字面量（花括号分组语义）
    Alternation(AnyOfMatcher),
    /// 含 `*` 的通配模式
    Glob(GlobMatcher),
}

impl Matcher for NamePattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Alternation(m) => m.matches(name),
            NamePattern::Glob(m) => m.matches(name),
        }
    }
}

/// 解析后的名称匹配规格。`pattern` 为 None 当且仅当名称是裸字面量。
#[derive(Debug)]
pub struct NameCriteria {
    pub value: String,
    pub pattern: Option<NamePattern>,
}

/// 名称词 → 匹配规格。
///
/// - 缺省/空串 → None（不做名称过滤）
/// - 含 `,` → 候选集合（优先于 `*` 判断）
/// - 含 `*` → 通配
/// - 否则 → 字面量
pub fn resolve(name_term: Option<&str>) -> Option<NameCriteria> {
    let term = name_term.filter(|t| !t.is_empty())?;

    let pattern = if term.contains(',') {
        Some(NamePattern::Alternation(AnyOfMatcher::from_alternatives(term)))
    } else if term.contains('*') {
        Some(NamePattern::Glob(GlobMatcher::new(term)))
    } else {
        None
    };

    Some(NameCriteria {
        value: term.to_string(),
        pattern,
    })
}
