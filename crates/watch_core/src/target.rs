use url::Url;

/// How a fetched page is reduced to the keyword-relevant subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Parse as HTML and inspect text nodes.
    #[default]
    Markup,
    /// Treat the body as plain text and keep matching lines.
    Lines,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("unsupported url scheme {scheme:?} in {url:?}")]
    UnsupportedScheme { url: String, scheme: String },
}

/// One monitored page. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    key: String,
    url: Url,
    keywords: Vec<String>,
    mode: ExtractMode,
}

impl Target {
    /// Builds a target keyed by its own URL. Blank keywords are dropped.
    pub fn new(url: &str, keywords: &[String], mode: ExtractMode) -> Result<Self, TargetError> {
        let trimmed = url.trim();
        let parsed = Url::parse(trimmed).map_err(|err| TargetError::InvalidUrl {
            url: trimmed.to_string(),
            message: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TargetError::UnsupportedScheme {
                url: trimmed.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        let mut kept: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.trim();
            if !keyword.is_empty() && !kept.iter().any(|k| k == keyword) {
                kept.push(keyword.to_string());
            }
        }

        Ok(Self {
            key: trimmed.to_string(),
            url: parsed,
            keywords: kept,
            mode,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    /// True when no keyword filter applies and the full page is watched.
    pub fn is_unfiltered(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn key_defaults_to_trimmed_url() {
        let target = Target::new(" https://example.org/school ", &[], ExtractMode::Markup).unwrap();
        assert_eq!(target.key(), "https://example.org/school");
        assert_eq!(target.url().as_str(), "https://example.org/school");
        assert!(target.is_unfiltered());
    }

    #[test]
    fn blank_and_duplicate_keywords_are_dropped() {
        let target = Target::new(
            "https://example.org/",
            &kw(&["Hard Tennis", " ", "", "Hard Tennis", " Squash "]),
            ExtractMode::Lines,
        )
        .unwrap();
        assert_eq!(target.keywords(), &kw(&["Hard Tennis", "Squash"])[..]);
    }

    #[test]
    fn matching_is_case_sensitive_substring() {
        let target = Target::new("https://example.org/", &kw(&["Hard Tennis"]), ExtractMode::Markup).unwrap();
        assert!(target.matches("Hard Tennis Beginner"));
        assert!(!target.matches("hard tennis beginner"));
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        assert!(matches!(
            Target::new("/school", &[], ExtractMode::Markup),
            Err(TargetError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Target::new("ftp://example.org/", &[], ExtractMode::Markup),
            Err(TargetError::UnsupportedScheme { .. })
        ));
    }
}
