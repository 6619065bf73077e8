use crate::core::Library;
use crate::query::criteria::NameCriteria;
use crate::query::scorer::{score, Rank};

/// 打分排序期间的临时配对，不对外输出
struct ScoredCandidate<'a> {
    score: usize,
    record: &'a Library,
}

/// 多结果查询：按分数升序（稳定排序，同分保持原有顺序），排除不满足模式的候选。
/// 无名称条件时原样返回，不排序。
pub fn find<'a>(
    candidates: &[&'a Library],
    criteria: Option<&NameCriteria>,
    ranker: &dyn Rank,
) -> Vec<&'a Library> {
    let Some(criteria) = criteria else {
        return candidates.to_vec();
    };

    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .iter()
        .copied()
        .filter_map(|record| {
            score(record, criteria, ranker).map(|score| ScoredCandidate { score, record })
        })
        .collect();
    scored.sort_by_key(|c| c.score);

    tracing::debug!(
        "find: {} of {} candidates kept for {:?}",
        scored.len(),
        candidates.len(),
        criteria.value
    );
    scored.into_iter().map(|c| c.record).collect()
}

/// 精确模式：第一个名称与字面量完全相同的候选（不打分、不走模式）
pub fn find_one_exact<'a>(
    candidates: &[&'a Library],
    criteria: &NameCriteria,
) -> Option<&'a Library> {
    candidates.iter().copied().find(|lib| lib.name == criteria.value)
}

/// 宽松模式：取最小分数的候选；同分取先出现者；遇到 0 分立即返回
pub fn find_one_loose<'a>(
    candidates: &[&'a Library],
    criteria: &NameCriteria,
    ranker: &dyn Rank,
) -> Option<&'a Library> {
    let mut best: Option<ScoredCandidate<'a>> = None;
    for &record in candidates {
        let Some(s) = score(record, criteria, ranker) else {
            continue;
        };
        if best.as_ref().map_or(true, |b| s < b.score) {
            best = Some(ScoredCandidate { score: s, record });
        }
        if s == 0 {
            break;
        }
    }
    best.map(|b| b.record)
}

/// 单结果选择，按 (criteria, exact_match) 组合分派。
///
/// 无名称条件 + 精确模式没有可比较的字面量，按未命中处理。
pub fn find_one<'a>(
    candidates: &[&'a Library],
    criteria: Option<&NameCriteria>,
    exact_match: bool,
    ranker: &dyn Rank,
) -> Option<&'a Library> {
    match (criteria, exact_match) {
        (Some(c), true) => find_one_exact(candidates, c),
        (Some(c), false) => find_one_loose(candidates, c, ranker),
        (None, false) => candidates.first().copied(),
        (None, true) => None,
    }
}
