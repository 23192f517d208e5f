/// Rendered preview of a converted document: ordered page or chapter fragments.
///
/// Images are already inlined as data URIs, so the HTML is self-contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewDocument {
    pub fragments: Vec<String>,
}

impl PreviewDocument {
    pub fn new(fragments: Vec<String>) -> Self {
        Self { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Concatenate the fragments in order.
    pub fn into_html(self) -> String {
        self.fragments.concat()
    }
}
