/// Formatter adapters for the composed deployment plan
mod cloudformation_formatter;
mod markdown_formatter;

pub use cloudformation_formatter::CloudFormationFormatter;
pub use markdown_formatter::MarkdownFormatter;
