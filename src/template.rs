//! Placeholder templates for generated config text.
//!
//! Templates are plain text with `{{ .Field }}` actions. Everything outside
//! an action is copied through byte for byte, so whitespace and quoting in
//! the template are exactly what ends up in the output.
//!
//! # Example
//!
//! ```
//! use bastionctl::template::{Template, TemplateData};
//!
//! struct Host<'a> {
//!     user: &'a str,
//!     ip: &'a str,
//! }
//!
//! impl TemplateData for Host<'_> {
//!     fn field(&self, name: &str) -> Option<&str> {
//!         match name {
//!             "User" => Some(self.user),
//!             "IP" => Some(self.ip),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let t = Template::parse("ssh", "ssh {{ .User }}@{{.IP}}").unwrap();
//! let mut out = String::new();
//! t.execute(&mut out, &Host { user: "root", ip: "10.0.0.1" }).unwrap();
//! assert_eq!(out, "ssh root@10.0.0.1");
//! ```

use crate::error::{BastionError, Result};
use std::fmt::Write;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A value whose named fields can be substituted into a [`Template`].
pub trait TemplateData {
    /// Look up a field by its template name, e.g. `ClusterName`.
    ///
    /// Returns `None` for names the type does not define.
    fn field(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Field(String),
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template source.
    ///
    /// `name` only appears in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Template`] if an action is unterminated or is
    /// not of the form `.Identifier`.
    pub fn parse(name: &str, src: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = src;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }

            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or_else(|| {
                let line = line_of(src, src.len() - rest.len() + start);
                BastionError::Template(format!("{name}:{line}: unclosed action"))
            })?;

            let action = after_open[..end].trim();
            let field = action
                .strip_prefix('.')
                .filter(|f| is_identifier(f))
                .ok_or_else(|| {
                    let line = line_of(src, src.len() - rest.len() + start);
                    BastionError::Template(format!(
                        "{name}:{line}: unsupported action {action:?}"
                    ))
                })?;
            segments.push(Segment::Field(field.to_string()));

            rest = &after_open[end + CLOSE.len()..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Template {
            name: name.to_string(),
            segments,
        })
    }

    /// Render the template against `data`, appending to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Template`] if a field is not defined by `data`
    /// or if writing to `out` fails.
    pub fn execute<W, D>(&self, out: &mut W, data: &D) -> Result<()>
    where
        W: Write + ?Sized,
        D: TemplateData + ?Sized,
    {
        for segment in &self.segments {
            let text = match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Field(field) => data.field(field).ok_or_else(|| {
                    BastionError::Template(format!(
                        "{}: can't evaluate field {}",
                        self.name, field
                    ))
                })?,
            };
            out.write_str(text).map_err(|_| {
                BastionError::Template(format!(
                    "{}: error generating SSH configuration from template",
                    self.name
                ))
            })?;
        }
        Ok(())
    }

    /// Names of the fields referenced by this template, in order of use.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(f) => Some(f.as_str()),
            Segment::Text(_) => None,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn line_of(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}
