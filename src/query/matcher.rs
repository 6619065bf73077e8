use wildmatch::WildMatch;

/// Matcher 抽象接口，定义名称匹配行为
pub trait Matcher: Send + Sync {
    /// 判断名称是否匹配
    fn matches(&self, name: &str) -> bool;
}

/// 精确相等匹配
#[derive(Clone, Debug)]
pub struct ExactMatcher {
    literal: String,
}

impl ExactMatcher {
    pub fn new(literal: &str) -> Self {
        Self {
            literal: literal.to_string(),
        }
    }
}

impl Matcher for ExactMatcher {
    fn matches(&self, name: &str) -> bool {
        name == self.literal
    }
}

/// 通配符匹配 (Glob)：`*` 匹配任意长度，`?` 匹配单个字符
#[derive(Clone, Debug)]
pub struct GlobMatcher {
    wild: WildMatch,
    prefix: Option<String>,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> Self {
        // 提取通配符前的固定前缀
        let prefix = pattern
            .split(|c| c == '*' || c == '?')
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Self {
            wild: WildMatch::new(pattern),
            prefix,
        }
    }
}

impl Matcher for GlobMatcher {
    fn matches(&self, name: &str) -> bool {
        // 前缀不符直接淘汰，省一次完整的通配匹配
        if let Some(p) = &self.prefix {
            if !name.starts_with(p.as_str()) {
                return false;
            }
        }
        self.wild.matches(name)
    }
}

/// 花括号展开后的候选集合：任一分支命中即匹配
pub struct AnyOfMatcher {
    branches: Vec<Box<dyn Matcher>>,
}

impl AnyOfMatcher {
    /// `a,b*,c` → 三个分支；空分支只匹配空名称
    pub fn from_alternatives(term: &str) -> Self {
        let branches = term
            .split(',')
            .map(|alt| -> Box<dyn Matcher> {
                if is_glob(alt) {
                    Box::new(GlobMatcher::new(alt))
                } else {
                    Box::new(ExactMatcher::new(alt))
                }
            })
            .collect();
        Self { branches }
    }
}

impl Matcher for AnyOfMatcher {
    fn matches(&self, name: &str) -> bool {
        self.branches.iter().any(|m| m.matches(name))
    }
}

impl std::fmt::Debug for AnyOfMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOfMatcher")
            .field("branches", &self.branches.len())
            .finish()
    }
}

fn is_glob(s: &str) -> bool {
    s.contains('*') || s.contains('?')
}
