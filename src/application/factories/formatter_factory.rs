use crate::adapters::outbound::formatters::{CloudFormationFormatter, MarkdownFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::PlanFormatter;

/// Factory for plan formatters
///
/// Selects the formatter adapter for an [`OutputFormat`].
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter for `format`
    ///
    /// # Examples
    /// ```
    /// use collector_deploy::application::dto::OutputFormat;
    /// use collector_deploy::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Markdown);
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn PlanFormatter> {
        match format {
            OutputFormat::Json => Box::new(CloudFormationFormatter::new()),
            OutputFormat::Markdown => Box::new(MarkdownFormatter::new()),
        }
    }

    /// Progress line shown before rendering
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Json => "📝 Rendering CloudFormation template...",
            OutputFormat::Markdown => "📝 Rendering Markdown summary...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_formatters() {
        for format in [OutputFormat::Json, OutputFormat::Markdown] {
            let formatter = FormatterFactory::create(format);
            assert!(std::mem::size_of_val(&formatter) > 0);
        }
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Json),
            "📝 Rendering CloudFormation template..."
        );
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Markdown),
            "📝 Rendering Markdown summary..."
        );
    }
}
