use serde::{Deserialize, Serialize};

use crate::core::Library;
use crate::query::criteria::NameCriteria;
use crate::query::matcher::Matcher;

/// 名称相似度度量：值越小越接近，相同字符串必须为 0
pub trait Rank: Send + Sync {
    fn rank(&self, candidate: &str, literal: &str) -> usize;
}

/// 可配置的编辑距离实现（strsim）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    #[default]
    Levenshtein,
    /// 相邻字符交换计 1 次编辑（`jqeury` 更接近 `jquery`）
    DamerauLevenshtein,
}

impl Rank for RankMetric {
    fn rank(&self, candidate: &str, literal: &str) -> usize {
        match self {
            RankMetric::Levenshtein => strsim::levenshtein(candidate, literal),
            RankMetric::DamerauLevenshtein => strsim::damerau_levenshtein(candidate, literal),
        }
    }
}

impl std::str::FromStr for RankMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "levenshtein" => Ok(RankMetric::Levenshtein),
            "damerau_levenshtein" | "damerau-levenshtein" => Ok(RankMetric::DamerauLevenshtein),
            other => Err(format!("unknown rank metric: {}", other)),
        }
    }
}

/// 对单个候选打分。
///
/// 返回 None 表示排除（名称不满足模式）；Some(0) 表示与字面量完全相同。
/// 模式命中的名称仍按与字面量的距离排序，使最接近的命中排在前面。
pub fn score(record: &Library, criteria: &NameCriteria, ranker: &dyn Rank) -> Option<usize> {
    match &criteria.pattern {
        Some(pattern) => {
            if !pattern.matches(&record.name) {
                return None;
            }
            Some(ranker.rank(&record.name, &criteria.value))
        }
        None if record.name == criteria.value => Some(0),
        None => Some(ranker.rank(&record.name, &criteria.value)),
    }
}
