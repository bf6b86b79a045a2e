//! Handlebars-based rendering of derived names.
//!
//! Artifact file names, the include guard and the paired header name are small
//! templates over the caller's parameter mapping, e.g. `__{{upper name}}_BACKEND_H__`.
//! The registry runs in **strict mode** so a template referring to a parameter the
//! mapping does not carry fails instead of producing an empty name, and HTML
//! escaping is disabled because the output is file names and C++ tokens.
//!
//! Helpers: `upper`, `lower`, `title` (see [`crate::casing`]).

use handlebars::{handlebars_helper, no_escape, Handlebars};

use crate::casing;
use crate::error::{Result, TegelError};
use crate::params::Params;

handlebars_helper!(upper_helper: |s: str| casing::upper(s));
handlebars_helper!(lower_helper: |s: str| casing::lower(s));
handlebars_helper!(title_helper: |s: str| casing::title(s));

/// Renders name templates against a parameter mapping.
pub struct ArtifactNaming {
    hbs: Handlebars<'static>,
}

impl ArtifactNaming {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(no_escape);
        hbs.register_helper("upper", Box::new(upper_helper));
        hbs.register_helper("lower", Box::new(lower_helper));
        hbs.register_helper("title", Box::new(title_helper));
        Self { hbs }
    }

    pub fn render(&self, template: &str, params: &Params) -> Result<String> {
        self.hbs
            .render_template(template, &params.to_json())
            .map_err(|e| TegelError::TemplateRender(e.to_string()))
    }
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self::new()
    }
}
