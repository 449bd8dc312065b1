//! Positional templates such as `Nom : {0}` or `内存总量: {0:n}`.

use crate::locale::LocaleTag;
use crate::number::NumberFormatter;
use thiserror::Error;

/// Format hint selecting grouped-number output.
pub const NUMBER_HINT: &str = "n";

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormatError {
    #[error("Template '{template}' references argument {index} which was not supplied")]
    MissingFormatArgument { template: String, index: usize },
    #[error("Argument {index} ('{value}') is not numeric but is formatted with ':n'")]
    NonNumericArgument { index: usize, value: String },
    #[error("Placeholder for argument {index} uses unsupported format hint '{hint}'")]
    UnsupportedFormatHint { index: usize, hint: String },
}

/// A positional argument substituted into a template.
#[derive(Clone, Debug, derive_more::Display, derive_more::From, PartialEq)]
pub enum FormatArg {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i32> for FormatArg {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FormatArg {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder { index: usize, hint: Option<String> },
}

/// A parsed template.
///
/// Parsing cannot fail: anything between braces that is not `{digits}` or
/// `{digits:hint}` stays literal text, and markup is never interpreted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse_segments(&source);
        Self { source, segments }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Argument indices referenced by placeholders, in template order.
    pub fn referenced_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder { index, .. } => Some(*index),
            Segment::Literal(_) => None,
        })
    }

    /// Number of arguments a caller has to supply.
    pub fn arity(&self) -> usize {
        self.referenced_indices().max().map_or(0, |max| max + 1)
    }

    /// Substitutes `args` into the template.
    ///
    /// `locale` is the locale the template was authored in; it decides digit
    /// grouping for `{i:n}` placeholders.
    pub fn render(&self, args: &[FormatArg], locale: &LocaleTag) -> Result<String, FormatError> {
        let mut out = String::with_capacity(self.source.len());
        let mut numbers: Option<NumberFormatter> = None;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { index, hint } => {
                    let arg = args
                        .get(*index)
                        .ok_or_else(|| FormatError::MissingFormatArgument {
                            template: self.source.clone(),
                            index: *index,
                        })?;

                    match hint.as_deref() {
                        None => out.push_str(&arg.to_string()),
                        Some(NUMBER_HINT) => {
                            let numbers =
                                numbers.get_or_insert_with(|| NumberFormatter::for_locale(locale));
                            out.push_str(&format_number(numbers, *index, arg)?);
                        },
                        Some(other) => {
                            return Err(FormatError::UnsupportedFormatHint {
                                index: *index,
                                hint: other.to_string(),
                            });
                        },
                    }
                },
            }
        }

        Ok(out)
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

/// Parses and renders `template` in one step.
pub fn render(template: &str, args: &[FormatArg], locale: &LocaleTag) -> Result<String, FormatError> {
    Template::parse(template).render(args, locale)
}

fn format_number(
    numbers: &NumberFormatter,
    index: usize,
    arg: &FormatArg,
) -> Result<String, FormatError> {
    let formatted = match arg {
        FormatArg::Integer(value) => Some(numbers.format_integer(*value)),
        FormatArg::Float(value) => numbers.format_float(*value),
        FormatArg::Text(value) => numbers.format_text(value),
    };

    formatted.ok_or_else(|| FormatError::NonNumericArgument {
        index,
        value: arg.to_string(),
    })
}

fn parse_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let placeholder = after_open
            .find('}')
            .and_then(|close| parse_placeholder(&after_open[..close]).map(|p| (p, close)));

        match placeholder {
            Some(((index, hint), close)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder { index, hint });
                rest = &after_open[close + 1..];
            },
            None => {
                literal.push('{');
                rest = after_open;
            },
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// `0`, `12` or `0:n`; anything else is not a placeholder.
fn parse_placeholder(inner: &str) -> Option<(usize, Option<String>)> {
    let (index, hint) = match inner.split_once(':') {
        Some((index, hint)) => (index, Some(hint)),
        None => (inner, None),
    };

    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = index.parse::<usize>().ok()?;

    match hint {
        None => Some((index, None)),
        Some(hint) if !hint.is_empty() && hint.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            Some((index, Some(hint.to_string())))
        },
        Some(_) => None,
    }
}
