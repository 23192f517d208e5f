/// Summary of one document's text. Ephemeral, never cached.
///
/// Either the model's reply or the fixed fallback text used when no summary could be
/// produced; callers can tell the two apart without comparing strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    text: String,
    fallback: bool,
}

impl Summary {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: false,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fallback: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
