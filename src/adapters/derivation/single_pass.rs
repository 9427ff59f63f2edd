//! Single-pass extractive derivation engine.
//!
//! Deterministic stand-in for the external generation collaborator: the
//! summary is the first paragraph, keywords are the most frequent long words.
//! Useful for development and demos; production wiring injects a real engine
//! behind the same port.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::domain::foundation::PortalError;
use crate::domain::sop::SourceDocument;
use crate::ports::{DerivationEngine, DerivedContent};

/// Words shorter than this never become keywords.
const MIN_KEYWORD_LENGTH: usize = 4;

/// Maximum number of keywords to emit.
const MAX_KEYWORDS: usize = 8;

/// Deterministic extractive implementation of [`DerivationEngine`].
#[derive(Debug, Default, Clone)]
pub struct SinglePassEngine;

impl SinglePassEngine {
    pub fn new() -> Self {
        Self
    }

    fn extract_summary(body: &str) -> Option<String> {
        body.split("\n\n")
            .map(str::trim)
            .find(|p| !p.is_empty())
            .map(str::to_string)
    }

    fn extract_keywords(body: &str) -> BTreeSet<String> {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for word in body.split(|c: char| !c.is_alphanumeric()) {
            let word = word.to_lowercase();
            if word.len() >= MIN_KEYWORD_LENGTH {
                *frequencies.entry(word).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(word, _)| word)
            .collect()
    }
}

#[async_trait]
impl DerivationEngine for SinglePassEngine {
    async fn derive(&self, source: &SourceDocument) -> Result<DerivedContent, PortalError> {
        let body = source.body();
        if body.trim().is_empty() {
            return Err(PortalError::derivation(
                source.sop_id(),
                "document body is empty",
            ));
        }

        let mut warnings = Vec::new();
        let summary = match Self::extract_summary(body) {
            Some(summary) => summary,
            None => {
                warnings.push("no paragraph found, using title as summary".to_string());
                source.title().to_string()
            }
        };

        let keywords = Self::extract_keywords(body);
        if keywords.is_empty() {
            warnings.push("no keyword candidates found".to_string());
        }

        Ok(DerivedContent {
            title: source.title().to_string(),
            summary,
            keywords,
            body: body.to_string(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> SourceDocument {
        SourceDocument::new("SOP-1", 1, "Incident Response", body).unwrap()
    }

    #[tokio::test]
    async fn derives_summary_from_first_paragraph() {
        let engine = SinglePassEngine::new();
        let content = engine
            .derive(&doc("First paragraph here.\n\nSecond paragraph."))
            .await
            .unwrap();

        assert_eq!(content.summary, "First paragraph here.");
        assert_eq!(content.title, "Incident Response");
        assert!(content.warnings.is_empty());
    }

    #[tokio::test]
    async fn keywords_are_frequent_long_words() {
        let engine = SinglePassEngine::new();
        let content = engine
            .derive(&doc("escalate escalate escalate the incident to oncall"))
            .await
            .unwrap();

        assert!(content.keywords.contains("escalate"));
        assert!(content.keywords.contains("incident"));
        // Short words never qualify.
        assert!(!content.keywords.contains("the"));
    }

    #[tokio::test]
    async fn empty_body_fails_with_derivation_error() {
        let engine = SinglePassEngine::new();
        let result = engine.derive(&doc("   ")).await;
        assert!(matches!(result, Err(PortalError::Derivation { .. })));
    }

    #[tokio::test]
    async fn keyword_count_is_bounded() {
        let body = "alpha bravo charlie delta echo foxtrot golfing hotels indigo juliet kilos limas";
        let engine = SinglePassEngine::new();
        let content = engine.derive(&doc(body)).await.unwrap();
        assert!(content.keywords.len() <= MAX_KEYWORDS);
    }
}
