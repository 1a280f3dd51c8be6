//! Post-OCR correction of medicine names.
//!
//! OCR routinely turns "Metformin" into "Metfonnin" (rn/m confusion), which
//! would make the whole-word extractor miss it. Words that sit within edit
//! distance 2 of exactly one single-word known medicine are rewritten to that
//! name. Words shorter than 5 characters are never touched.

use tracing::debug;

const MIN_WORD_LEN: usize = 5;
const MAX_DISTANCE: u32 = 2;

/// Apply medicine-name correction to recognized text.
pub fn correct_medicine_names(text: &str, known_medicines: &[String]) -> String {
    let dictionary = build_dictionary(known_medicines);
    if dictionary.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut word_buf = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word_buf.push(ch);
        } else {
            if !word_buf.is_empty() {
                result.push_str(&try_correct_word(&word_buf, &dictionary));
                word_buf.clear();
            }
            result.push(ch);
        }
    }

    if !word_buf.is_empty() {
        result.push_str(&try_correct_word(&word_buf, &dictionary));
    }

    result
}

/// Lowercased, sorted, unique single-word names.
fn build_dictionary(known_medicines: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = known_medicines
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty() && n.chars().all(char::is_alphanumeric))
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

fn try_correct_word(word: &str, dictionary: &[String]) -> String {
    let word_len = word.chars().count();
    if word_len < MIN_WORD_LEN {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if dictionary.binary_search(&lower).is_ok() {
        return word.to_string();
    }

    let mut best_term: Option<&str> = None;
    let mut best_distance = MAX_DISTANCE + 1;
    let mut ambiguous = false;

    for term in dictionary {
        let len_diff = (word_len as i64 - term.chars().count() as i64).unsigned_abs();
        if len_diff > u64::from(MAX_DISTANCE) {
            continue;
        }

        let dist = edit_distance(&lower, term);
        if dist < best_distance {
            best_distance = dist;
            best_term = Some(term);
            ambiguous = false;
        } else if dist == best_distance && best_term.is_some() {
            ambiguous = true;
        }
    }

    match best_term {
        Some(term) if !ambiguous => {
            debug!(from = %word, to = %term, distance = best_distance, "Corrected OCR medicine name");
            preserve_case(word, term)
        }
        _ => word.to_string(),
    }
}

/// Carry the original word's capitalization pattern over to the correction.
fn preserve_case(original: &str, correction: &str) -> String {
    if original.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
        return correction.to_uppercase();
    }

    let first_upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if first_upper {
        let mut chars = correction.chars();
        match chars.next() {
            Some(c) => {
                let mut s = c.to_uppercase().to_string();
                s.extend(chars);
                s
            }
            None => correction.to_string(),
        }
    } else {
        correction.to_string()
    }
}

/// Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n as u32;
    }
    if n == 0 {
        return m as u32;
    }

    let mut prev: Vec<u32> = (0..=n as u32).collect();
    let mut curr = vec![0u32; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = (i + 1) as u32;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = u32::from(a_ch != b_ch);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
