//! SEO heuristic for generated descriptions. Deterministic; makes no LLM call.
//!
//! Algorithm:
//! 1. base = 50
//! 2. word count (whitespace-delimited): >120 → +15, >80 → +10, >50 → +5
//! 3. +2 for each keyword in SEO_KEYWORDS present anywhere (case-insensitive substring)
//! 4. +5 once if any HIGHLIGHT word matches
//! 5. clamp to [MIN_SEO_SCORE, MAX_SEO_SCORE] at the very end

use std::sync::OnceLock;

use regex::Regex;

pub const MIN_SEO_SCORE: u32 = 60;
pub const MAX_SEO_SCORE: u32 = 100;
const BASE_SCORE: u32 = 50;

const SEO_KEYWORDS: &[&str] = &[
    "spacious",
    "modern",
    "luxury",
    "affordable",
    "family",
    "investment",
    "convenient",
];
const KEYWORD_BONUS: u32 = 2;

const HIGHLIGHT_PATTERN: &str = r"(?i)(beautiful|stunning|prime|exclusive)";
const HIGHLIGHT_BONUS: u32 = 5;

fn highlight_regex() -> &'static Regex {
    static HIGHLIGHT: OnceLock<Regex> = OnceLock::new();
    HIGHLIGHT.get_or_init(|| Regex::new(HIGHLIGHT_PATTERN).expect("highlight pattern is valid"))
}

fn length_bonus(word_count: usize) -> u32 {
    match word_count {
        n if n > 120 => 15,
        n if n > 80 => 10,
        n if n > 50 => 5,
        _ => 0,
    }
}

/// Scores a generated description. Always within [60, 100].
pub fn seo_score(description: &str) -> u32 {
    let lower = description.to_lowercase();

    let mut score = BASE_SCORE + length_bonus(description.split_whitespace().count());

    score += SEO_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count() as u32
        * KEYWORD_BONUS;

    if highlight_regex().is_match(description) {
        score += HIGHLIGHT_BONUS;
    }

    score.clamp(MIN_SEO_SCORE, MAX_SEO_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n` neutral words that hit no keyword or highlight.
    fn filler(n: usize) -> String {
        vec!["room"; n].join(" ")
    }

    #[test]
    fn test_long_text_with_two_keywords() {
        // 128 filler + "modern" + "spacious" = 130 words → 50 + 15 + 2 + 2
        let text = format!("{} modern spacious", filler(128));
        assert_eq!(text.split_whitespace().count(), 130);
        assert_eq!(seo_score(&text), 69);
    }

    #[test]
    fn test_short_text_is_clamped_up() {
        // 40 words with "stunning" → 50 + 0 + 5 = 55 → 60
        let text = format!("{} stunning", filler(39));
        assert_eq!(seo_score(&text), 60);
    }

    #[test]
    fn test_tier_boundaries_are_strict() {
        let kw = "luxury family investment convenient affordable"; // +10
        // 50 words total → no length bonus: 50 + 10 = 60
        assert_eq!(seo_score(&format!("{} {kw}", filler(45))), 60);
        // 51 words → +5
        assert_eq!(seo_score(&format!("{} {kw}", filler(46))), 65);
        // 80 words → still +5
        assert_eq!(seo_score(&format!("{} {kw}", filler(75))), 65);
        // 81 words → +10
        assert_eq!(seo_score(&format!("{} {kw}", filler(76))), 70);
        // 120 words → still +10
        assert_eq!(seo_score(&format!("{} {kw}", filler(115))), 70);
        // 121 words → +15
        assert_eq!(seo_score(&format!("{} {kw}", filler(116))), 75);
    }

    #[test]
    fn test_keyword_counts_once_per_keyword() {
        let once = format!("{} modern", filler(125));
        let thrice = format!("{} modern modern modern", filler(123));
        assert_eq!(seo_score(&once), seo_score(&thrice));
        assert_eq!(seo_score(&once), 67);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        // "MODERNIZED" contains "modern", "Families" contains "famil" but not "family"
        let text = format!("{} MODERNIZED Families", filler(130));
        assert_eq!(seo_score(&text), 67);
    }

    #[test]
    fn test_highlight_bonus_applied_once() {
        let text = format!("{} Beautiful STUNNING prime exclusive", filler(130));
        assert_eq!(seo_score(&text), 70);
    }

    #[test]
    fn test_every_bonus_stays_under_the_cap() {
        let text = format!(
            "{} spacious modern luxury affordable family investment convenient stunning",
            filler(200)
        );
        // 50 + 15 + 14 + 5 = 84, under the cap
        assert_eq!(seo_score(&text), 84);
        assert!(seo_score(&text) <= MAX_SEO_SCORE);
    }

    #[test]
    fn test_bounds_hold_for_assorted_inputs() {
        let inputs = [
            String::new(),
            "   ".to_string(),
            "stunning".to_string(),
            filler(500),
            format!("{} luxury prime", filler(90)),
        ];
        for text in &inputs {
            let score = seo_score(text);
            assert!((MIN_SEO_SCORE..=MAX_SEO_SCORE).contains(&score), "{score}");
            assert_eq!(score, seo_score(text));
        }
    }
}
