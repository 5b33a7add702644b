//! Text normalization helpers.

/// Collapse runs of whitespace (including line breaks) into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Deep\n  Residual\r\nLearning\tfor Image  "),
            "Deep Residual Learning for Image"
        );
        assert_eq!(collapse_whitespace("\n\n"), "");
        assert_eq!(collapse_whitespace("single"), "single");
    }
}
