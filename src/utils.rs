use std::ops::Range;

pub type IntentName = String;
pub type GazetteerName = String;

/// Lowercase the input, drop everything that is neither alphanumeric nor
/// whitespace, and collapse whitespace runs. This is the normalization
/// applied before featurization.
pub fn preprocess_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split the input into lowercased alphanumeric tokens.
pub fn tokenize_light(text: &str) -> Vec<String> {
    preprocess_text(text)
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

/// Contiguous n-grams of `tokens`, for n in `1..=max_ngram`.
pub fn compute_all_ngrams(tokens: &[String], max_ngram: usize) -> Vec<String> {
    let mut ngrams = Vec::new();
    for n in 1..=max_ngram {
        if n > tokens.len() {
            break;
        }
        for window in tokens.windows(n) {
            ngrams.push(window.join(" "));
        }
    }
    ngrams
}

/// Capitalize the first letter of each whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn ranges_overlap(lhs: &Range<usize>, rhs: &Range<usize>) -> bool {
    lhs.start < rhs.end && rhs.start < lhs.end
}

pub fn deduplicate_overlapping_items<I, O, S, K>(
    items: Vec<I>,
    overlap: O,
    sort_key_fn: S,
) -> Vec<I>
where
    I: Clone,
    O: Fn(&I, &I) -> bool,
    S: FnMut(&I) -> K,
    K: Ord,
{
    let mut sorted_items = items.clone();
    sorted_items.sort_by_key(sort_key_fn);
    let mut deduplicated_items: Vec<I> = Vec::with_capacity(items.len());
    for item in sorted_items {
        if !deduplicated_items
            .iter()
            .any(|dedup_item| overlap(dedup_item, &item))
        {
            deduplicated_items.push(item);
        }
    }
    deduplicated_items
}
