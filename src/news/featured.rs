use crate::models::{Candidate, Category};

/// Pick the featured subset: the most recent premium-market articles, up to
/// `count`. Returns their URLs in rank order, so position + 1 is the
/// featured order. Fewer than `count` qualifying candidates means a shorter
/// list, never padding.
pub fn select_featured(candidates: &[Candidate], count: usize) -> Vec<String> {
    let mut premium: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.category == Category::PremiumMarket)
        .collect();

    premium.sort_by(|a, b| b.article.published_at.cmp(&a.article.published_at));

    premium
        .into_iter()
        .take(count)
        .map(|c| c.article.url.clone())
        .collect()
}
