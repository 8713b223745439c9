use crate::error::DiffpostError;

/// Token replaced by the aggregated diff when a prompt is built.
pub const DIFF_PLACEHOLDER: &str = "{{DIFF}}";

/// A prompt template known to contain [`DIFF_PLACEHOLDER`].
///
/// Construction is the only validation point, so holding a `PromptTemplate`
/// means rendering can never silently drop the diff.
///
/// # Examples
///
/// ```
/// use diffpost_core::PromptTemplate;
///
/// let template = PromptTemplate::parse("Review this:\n{{DIFF}}").unwrap();
/// assert_eq!(template.render("+x"), "Review this:\n+x");
///
/// assert!(PromptTemplate::parse("no placeholder here").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
}

impl PromptTemplate {
    /// Validate `raw` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`DiffpostError::Config`] if the placeholder does not occur.
    pub fn parse(raw: &str) -> Result<Self, DiffpostError> {
        if !raw.contains(DIFF_PLACEHOLDER) {
            return Err(DiffpostError::Config(format!(
                "prompt template must contain the {DIFF_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Substitute `diff` into every placeholder occurrence.
    ///
    /// Substitution is a single left-to-right pass: placeholder text that
    /// appears inside `diff` is kept literally.
    pub fn render(&self, diff: &str) -> String {
        self.raw.replace(DIFF_PLACEHOLDER, diff)
    }

    /// The template as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}
