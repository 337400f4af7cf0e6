//! Utterance cleanup per slot. Never fails; falls back to a sane default.

use once_cell::sync::Lazy;
use regex::Regex;

use super::slots::SlotKey;

/// Filler phrases removed from a spoken name, first occurrence each, in order.
static NAME_FILLERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["my name is", "this is", "i am", "mera naam"]
        .iter()
        .map(|phrase| Regex::new(&format!(r"(?i)\b{phrase}\b")).expect("valid regex"))
        .collect()
});

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

pub const DEFAULT_GUESTS: u32 = 1;

pub fn normalize(key: SlotKey, raw: &str) -> String {
    match key {
        SlotKey::CustomerName => normalize_name(raw),
        SlotKey::NumberOfGuests => guest_count(raw).to_string(),
        _ => raw.trim().to_string(),
    }
}

/// "my name is john doe" -> "John Doe".
pub fn normalize_name(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    for filler in NAME_FILLERS.iter() {
        text = filler.replace(&text, "").into_owned();
    }

    let letters: String = text.chars().filter(|c| c.is_alphabetic() || *c == ' ').collect();

    letters
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First run of digits in the utterance; `DEFAULT_GUESTS` when there is none
/// or it is not a positive count.
pub fn guest_count(raw: &str) -> u32 {
    DIGITS
        .find(raw)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_GUESTS)
}
