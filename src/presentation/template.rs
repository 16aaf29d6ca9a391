//! Template decks: `${...}` expressions in slide text rendered against bindings.

use crate::common::Result;
use crate::ooxml::pptx::Package;
use crate::ooxml::pptx::text::{EXPRESSION_CLOSE, EXPRESSION_OPEN, render_text_runs};
use crate::presentation::deck::open_deck;
use std::collections::HashMap;

/// Renders the text of one expression span.
///
/// The input is the full text of the runs holding the expression, including
/// any literal text around it, and the output replaces that text.
pub trait ExpressionRenderer {
    fn render(&self, text: &str) -> Result<String>;
}

impl<F> ExpressionRenderer for F
where
    F: Fn(&str) -> Result<String>,
{
    fn render(&self, text: &str) -> Result<String> {
        self(text)
    }
}

/// Substitutes `${key}` from a map. Unknown keys are left as written.
#[derive(Debug, Clone, Default)]
pub struct MapRenderer {
    values: HashMap<String, String>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapRenderer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ExpressionRenderer for MapRenderer {
    fn render(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(EXPRESSION_OPEN) {
            let body = &rest[start + EXPRESSION_OPEN.len()..];
            let Some(end) = body.find(EXPRESSION_CLOSE) else {
                break;
            };
            out.push_str(&rest[..start]);
            let expression = &rest[start..start + EXPRESSION_OPEN.len() + end + 1];
            match self.values.get(body[..end].trim()) {
                Some(value) => out.push_str(value),
                None => out.push_str(expression),
            }
            rest = &body[end + 1..];
        }
        // An unterminated expression stays verbatim with the rest
        out.push_str(rest);
        Ok(out)
    }
}

/// Render every slide of a template deck.
pub fn render_template<R: ExpressionRenderer + ?Sized>(deck: &[u8], renderer: &R) -> Result<Package> {
    let mut package = open_deck(deck)?;
    let slide_names: Vec<_> = package
        .presentation()?
        .slides()?
        .iter()
        .map(|slide| slide.partname().clone())
        .collect();

    let mut rendered = 0;
    for name in &slide_names {
        let part = package.opc_mut().get_part_mut(name)?;
        let updated = render_text_runs(part.blob(), |text: &str| renderer.render(text))?;
        if let Some(xml) = updated {
            part.set_blob(xml);
            rendered += 1;
        }
    }
    log::debug!("Rendered template expressions on {} of {} slides", rendered, slide_names.len());
    Ok(package)
}

/// Output name: the caller's, else the template's, else `fallback`; always `.pptx`.
pub fn template_file_name(requested: Option<&str>, template: Option<&str>, fallback: &str) -> String {
    let pick = [requested, template]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(fallback);
    crate::presentation::artifact::with_pptx_extension(pick)
}
