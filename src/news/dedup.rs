use std::collections::HashSet;

use url::Url;

use crate::models::RawArticle;

/// Portuguese stop words, already in diacritic-folded form since key terms
/// are folded before the comparison.
const STOP_WORDS: &[&str] = &[
    "a", "o", "e", "de", "da", "do", "em", "no", "na", "para", "com", "por", "que", "um", "uma",
    "os", "as", "dos", "das", "ao", "sao", "foi", "sera", "apos", "entre", "sobre", "como",
    "mais", "seu", "sua", "seus", "suas",
];

/// Fold common Latin accented characters to their ASCII base letter.
pub(crate) fn fold_diacritics(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Extract the normalized key-term set of a title: lowercase, fold accents,
/// strip non-alphanumerics, then drop short tokens and stop words.
pub fn extract_key_terms(title: &str) -> HashSet<String> {
    let normalized: String = title
        .to_lowercase()
        .chars()
        .map(fold_diacritics)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity over two key-term sets. An empty union counts as 0,
/// so two meaningless titles are never duplicates of each other.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

fn normalize_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) => url.to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

/// Drop candidates whose URL was already seen. First occurrence wins.
pub fn dedup_by_url(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(normalize_url(&article.url)))
        .collect()
}

/// Drop candidates whose title is too similar to an already-accepted one.
/// Order-sensitive and O(n²), fine at tens to low hundreds of candidates.
pub fn dedup_by_similarity(articles: Vec<RawArticle>, threshold: f64) -> Vec<RawArticle> {
    let mut accepted: Vec<(HashSet<String>, String)> = Vec::new();
    let mut kept = Vec::new();

    for article in articles {
        let terms = extract_key_terms(&article.title);
        let duplicate = accepted
            .iter()
            .map(|(existing_terms, existing_title)| {
                (jaccard_similarity(&terms, existing_terms), existing_title)
            })
            .find(|(similarity, _)| *similarity >= threshold);

        match duplicate {
            Some((similarity, existing_title)) => {
                tracing::debug!(
                    new_title = %article.title,
                    existing_title = %existing_title,
                    similarity = format!("{:.0}%", similarity * 100.0),
                    "Dropping near-duplicate title"
                );
            }
            None => {
                accepted.push((terms, article.title.clone()));
                kept.push(article);
            }
        }
    }

    kept
}
