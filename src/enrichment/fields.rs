use serde::{Deserialize, Serialize};

/// Which structured session field an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Language,
    ClientName,
    Address,
    Emergency,
}

/// One detected field value, emitted on the session's update channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub kind: FieldKind,
    pub value: String,
}

impl FieldUpdate {
    pub fn new(kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Session-scoped structured fields detected from agent speech
///
/// Owned by the session and reset whenever the session leaves the
/// connected state; never global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFields {
    pub language: Option<String>,
    pub client_name: Option<String>,
    pub address: Option<String>,
    pub emergency: Option<String>,
}

impl SessionFields {
    pub fn get(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::Language => self.language.as_deref(),
            FieldKind::ClientName => self.client_name.as_deref(),
            FieldKind::Address => self.address.as_deref(),
            FieldKind::Emergency => self.emergency.as_deref(),
        }
    }

    /// Apply a detected value; repeated identical updates are no-ops
    pub fn apply(&mut self, update: &FieldUpdate) {
        let slot = match update.kind {
            FieldKind::Language => &mut self.language,
            FieldKind::ClientName => &mut self.client_name,
            FieldKind::Address => &mut self.address,
            FieldKind::Emergency => &mut self.emergency,
        };
        *slot = Some(update.value.clone());
    }

    /// Clear all four fields (session disconnect)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
