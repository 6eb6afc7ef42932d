//! Transcript similarity scoring

/// Similarity between a prompt sentence and its transcript, in 0.0..=1.0.
///
/// Case, punctuation, and whitespace runs are normalized away first so API
/// formatting quirks do not drag the score down.
pub fn ratio(expected: &str, actual: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize(expected), &normalize(actual))
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_scores_one() {
        assert_eq!(ratio("Hello, welcome to ECHO GEN!", "Hello, welcome to ECHO GEN!"), 1.0);
    }

    #[test]
    fn test_punctuation_and_case_are_ignored() {
        assert_eq!(ratio("Hello, welcome to ECHO GEN!", "hello welcome to echo gen"), 1.0);
    }

    #[test]
    fn test_unrelated_text_scores_low() {
        let score = ratio("Thank you for providing your voice samples.", "completely different words");
        assert!(score < 0.5, "score was {}", score);
    }

    #[test]
    fn test_close_transcript_scores_high() {
        let score = ratio(
            "Please record your voice to create a custom voice profile.",
            "please record your voice to create a custom voice profile",
        );
        assert!(score > 0.95, "score was {}", score);
    }

    #[test]
    fn test_score_is_bounded() {
        for (a, b) in [("", ""), ("a", ""), ("", "b"), ("abc", "xyz")] {
            let score = ratio(a, b);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}
