//! Display templates for numbers
//!
//! Skin files describe how a number is printed with a small composite-format
//! template: literal text around a single `{0}` placeholder, optionally with a
//! `D<n>` specifier that zero-pads to `n` digits. `{{` and `}}` escape braces.
//!
//! | Template      | 7       | 1234     |
//! |---------------|---------|----------|
//! | `{0}`         | `7`     | `1234`   |
//! | `{0:D3}`      | `007`   | `1234`   |
//! | `No.{0:D2}`   | `No.07` | `No.1234`|

use std::fmt;

/// Largest supported zero-padding width
pub const MAX_PAD_WIDTH: usize = 32;

/// Template parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// No `{0}` placeholder in the template
    #[error("template has no {{0}} placeholder")]
    MissingPlaceholder,

    /// More than one placeholder
    #[error("template has more than one placeholder")]
    MultiplePlaceholders,

    /// A `{` without a matching `}`, or a lone `}`
    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),

    /// Placeholder argument other than `0`
    #[error("unsupported argument index '{0}'")]
    UnsupportedArgument(String),

    /// Specifier other than `D`/`Dn`
    #[error("unsupported format specifier '{0}'")]
    UnsupportedSpecifier(String),
}

/// Parsed number template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    template: String,
    prefix: String,
    suffix: String,
    min_digits: usize,
}

impl NumberFormat {
    /// Template used when a font does not specify one
    pub const DEFAULT_TEMPLATE: &'static str = "{0:D1}";

    /// Parse a template string
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut min_digits = None;

        let mut chars = template.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            let literal = match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    '{'
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    '}'
                }
                '}' => return Err(FormatError::UnbalancedBrace(pos)),
                '{' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err(FormatError::UnbalancedBrace(pos));
                    }
                    if min_digits.is_some() {
                        return Err(FormatError::MultiplePlaceholders);
                    }
                    min_digits = Some(Self::parse_placeholder(&inner)?);
                    continue;
                }
                other => other,
            };

            if min_digits.is_some() {
                suffix.push(literal);
            } else {
                prefix.push(literal);
            }
        }

        let min_digits = min_digits.ok_or(FormatError::MissingPlaceholder)?;
        Ok(Self {
            template: template.to_string(),
            prefix,
            suffix,
            min_digits,
        })
    }

    fn parse_placeholder(inner: &str) -> Result<usize, FormatError> {
        let (arg, spec) = match inner.split_once(':') {
            Some((arg, spec)) => (arg.trim(), Some(spec.trim())),
            None => (inner.trim(), None),
        };
        if arg != "0" {
            return Err(FormatError::UnsupportedArgument(arg.to_string()));
        }

        let Some(spec) = spec else {
            return Ok(1);
        };
        let digits = spec
            .strip_prefix('D')
            .or_else(|| spec.strip_prefix('d'))
            .ok_or_else(|| FormatError::UnsupportedSpecifier(spec.to_string()))?;
        if digits.is_empty() {
            return Ok(1);
        }
        match digits.parse::<usize>() {
            Ok(n) if n <= MAX_PAD_WIDTH => Ok(n.max(1)),
            _ => Err(FormatError::UnsupportedSpecifier(spec.to_string())),
        }
    }

    /// Render a number through the template
    pub fn apply(&self, number: i64) -> String {
        let width = self.min_digits;
        let body = if number < 0 {
            format!("-{:0width$}", number.unsigned_abs())
        } else {
            format!("{number:0width$}")
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }

    /// The template text as written in the configuration
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Minimum number of digits the placeholder prints
    pub const fn min_digits(&self) -> usize {
        self.min_digits
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT_TEMPLATE.to_string(),
            prefix: String::new(),
            suffix: String::new(),
            min_digits: 1,
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
