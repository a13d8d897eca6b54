//! Template rendering with Tera

use super::card::format_inr;
use anyhow::Result;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template renderer
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Create a new template renderer with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("search.html", include_str!("../templates/search.html")),
            (
                "components/gym_card.html",
                include_str!("../templates/components/gym_card.html"),
            ),
        ])?;

        tera.register_filter("inr", inr_filter);

        Ok(Self { tera })
    }

    /// Render a template with a Tera Context
    pub fn render_with_context(&self, template: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }
}

/// `{{ 1500 | inr }}` → `₹1,500`
fn inr_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("inr expects a number, got {}", value)))?;
    Ok(Value::String(format_inr(amount)))
}
