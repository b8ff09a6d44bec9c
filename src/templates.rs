// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{Environment, Value, default_auto_escape_callback};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        "home.html" => Some(include_str!("web/templates/home.html")),
        "login.html" => Some(include_str!("web/templates/login.html")),
        "registration.html" => Some(include_str!("web/templates/registration.html")),
        "customers.html" => Some(include_str!("web/templates/customers.html")),
        "create_customer.html" => Some(include_str!("web/templates/create_customer.html")),
        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_embedded_templates_render() {
        let engine = MiniJinjaEngine::new();
        for name in [
            "home.html",
            "login.html",
            "registration.html",
            "customers.html",
            "create_customer.html",
        ] {
            engine
                .render(name, context! { authenticated => false })
                .unwrap_or_else(|err| panic!("template {} failed: {}", name, err));
        }
    }

    #[test]
    fn unknown_template_is_an_error() {
        let engine = MiniJinjaEngine::new();
        assert!(engine.render("missing.html", Value::UNDEFINED).is_err());
    }

    #[test]
    fn html_values_are_escaped() {
        let engine = MiniJinjaEngine::new();
        let html = engine
            .render(
                "login.html",
                context! { error => "<script>alert(1)</script>" },
            )
            .expect("render");
        assert!(!html.contains("<script>alert(1)</script>"));
    }
}
