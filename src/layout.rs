//! Named header/footer pairs wrapping rendered content.

/// Header and footer template names. Both are registered as ordinary templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBinding {
    header: String,
    footer: String,
}

impl LayoutBinding {
    pub(crate) fn new(header: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}
