use super::fields::{FieldKind, FieldUpdate, SessionFields};
use anyhow::Result;
use async_trait::async_trait;

/// Output of one extraction attempt over a finalized utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    /// Optional translation of the utterance
    pub translation: Option<String>,

    /// Optional short summary of the utterance
    pub summary: Option<String>,

    /// Structured field values detected in the text
    pub fields: Vec<FieldUpdate>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.translation.is_none() && self.summary.is_none() && self.fields.is_empty()
    }
}

/// Pluggable extraction strategy for finalized agent utterances
///
/// Implementations receive the finalized text plus the currently known
/// field values, so a strategy may choose to fill only unset fields or to
/// confirm/override existing ones. Extraction is best effort: returning
/// an empty `Enrichment` or an error both leave the timeline untouched.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, text: &str, known: &SessionFields) -> Result<Enrichment>;
}

/// Extractor that never detects anything
///
/// Used by deployments that only need the pipeline contract exercised.
pub struct NoopExtractor;

#[async_trait]
impl FieldExtractor for NoopExtractor {
    async fn extract(&self, _text: &str, _known: &SessionFields) -> Result<Enrichment> {
        Ok(Enrichment::default())
    }
}

/// Simple phrase-based extractor
///
/// Fills only fields that are still unset. Deliberately crude: intended
/// as a working default, not a serious NLU replacement.
pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Phrases whose remainder (up to sentence punctuation) names the client
    const NAME_MARKERS: [&'static str; 3] = ["my name is ", "this is ", "i am "];

    /// Phrases whose remainder states an address
    const ADDRESS_MARKERS: [&'static str; 3] = ["my address is ", "i live at ", "located at "];

    /// Incident keyword table, checked in order
    const EMERGENCY_KEYWORDS: [(&'static str, &'static str); 7] = [
        ("fire", "fire"),
        ("accident", "traffic accident"),
        ("crash", "traffic accident"),
        ("ambulance", "medical"),
        ("bleeding", "medical"),
        ("robbery", "police"),
        ("break-in", "police"),
    ];

    fn capture_after<'a>(text: &'a str, lowered: &str, marker: &str) -> Option<&'a str> {
        let start = lowered.find(marker)? + marker.len();
        // lowercasing can shift byte offsets for non-ASCII text; give up
        // rather than slice off a char boundary
        let rest = text.get(start..)?;
        let end = rest
            .find(&['.', ',', '?', '!'][..])
            .unwrap_or(rest.len());
        let captured = rest[..end].trim();
        if captured.is_empty() {
            None
        } else {
            Some(captured)
        }
    }

    /// Crude script-based language guess
    fn guess_language(text: &str) -> Option<&'static str> {
        let mut letters = 0usize;
        let mut arabic = 0usize;
        for c in text.chars() {
            if c.is_alphabetic() {
                letters += 1;
                if ('\u{0600}'..='\u{06FF}').contains(&c) {
                    arabic += 1;
                }
            }
        }
        if letters == 0 {
            return None;
        }
        if arabic * 2 > letters {
            Some("ar")
        } else {
            Some("en")
        }
    }
}

#[async_trait]
impl FieldExtractor for KeywordExtractor {
    async fn extract(&self, text: &str, known: &SessionFields) -> Result<Enrichment> {
        let lowered = text.to_lowercase();
        let mut fields = Vec::new();

        if known.language.is_none() {
            if let Some(lang) = Self::guess_language(text) {
                fields.push(FieldUpdate::new(FieldKind::Language, lang));
            }
        }

        if known.client_name.is_none() {
            for marker in Self::NAME_MARKERS {
                if let Some(name) = Self::capture_after(text, &lowered, marker) {
                    fields.push(FieldUpdate::new(FieldKind::ClientName, name));
                    break;
                }
            }
        }

        if known.address.is_none() {
            for marker in Self::ADDRESS_MARKERS {
                if let Some(address) = Self::capture_after(text, &lowered, marker) {
                    fields.push(FieldUpdate::new(FieldKind::Address, address));
                    break;
                }
            }
        }

        if known.emergency.is_none() {
            for (keyword, category) in Self::EMERGENCY_KEYWORDS {
                if lowered.contains(keyword) {
                    fields.push(FieldUpdate::new(FieldKind::Emergency, category));
                    break;
                }
            }
        }

        Ok(Enrichment {
            translation: None,
            summary: None,
            fields,
        })
    }
}
