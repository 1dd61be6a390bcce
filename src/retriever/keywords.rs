/// Tokens shorter than this are dropped
pub const MIN_KEYWORD_LEN: usize = 3;

/// Tokens at least this long also contribute their leading stem
pub const STEM_SOURCE_LEN: usize = 6;

/// Length of the stem taken from long tokens
pub const STEM_LEN: usize = 4;

/// Turn free text into lower-cased substring keywords.
///
/// Long tokens also yield a short stem so "authentication" finds `authUser`.
/// Order is first appearance; duplicates are dropped.
pub fn expand_keywords(text: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut push = |keyword: String| {
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    };

    for token in text.split_whitespace().map(str::to_lowercase) {
        let len = token.chars().count();
        if len < MIN_KEYWORD_LEN {
            continue;
        }
        let stem = (len >= STEM_SOURCE_LEN).then(|| token.chars().take(STEM_LEN).collect::<String>());
        push(token);
        if let Some(stem) = stem {
            push(stem);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_tokens_dropped() {
        assert_eq!(expand_keywords("fix Main class"), vec!["fix", "main", "class"]);
        assert_eq!(expand_keywords("a to of"), Vec::<String>::new());
        assert!(expand_keywords("").is_empty());
        assert!(expand_keywords("   \t\n ").is_empty());
    }

    #[test]
    fn test_long_tokens_add_stem() {
        assert_eq!(
            expand_keywords("Authentication helper"),
            vec!["authentication", "auth", "helper", "help"]
        );
        // five characters is below the stem threshold
        assert_eq!(expand_keywords("parse"), vec!["parse"]);
    }

    #[test]
    fn test_duplicates_removed_in_order() {
        assert_eq!(
            expand_keywords("render Renderer render"),
            vec!["render", "rend", "renderer"]
        );
    }

    #[test]
    fn test_any_whitespace_splits() {
        assert_eq!(expand_keywords("user\tlogin\nflow"), vec!["user", "login", "flow"]);
    }
}
