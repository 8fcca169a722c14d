use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::context::Context;
use crate::error::{RenderError, TemplateRenderError};
use crate::helpers::{HelperDef, ENCODE_HELPER, RAW_HELPER};
use crate::output::StringOutput;
use crate::render::Renderable;
use crate::support::str::strip_blank_lines;
use crate::template::Template;

/// The single entry point of this library
///
/// A registry owns named templates and helpers. The two built-in helpers
/// `raw` and `encode` are registered up front and can be shadowed by
/// user helpers of the same name.
pub struct Registry {
    templates: HashMap<String, Template>,
    helpers: HashMap<String, Box<dyn HelperDef + 'static>>,
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}

fn setup_builtins(registry: &mut Registry) {
    registry
        .register_helper("raw", Box::new(RAW_HELPER))
        .register_helper("encode", Box::new(ENCODE_HELPER));
}

impl Registry {
    pub fn new() -> Registry {
        let mut registry = Registry {
            templates: HashMap::new(),
            helpers: HashMap::new(),
        };
        setup_builtins(&mut registry);
        registry
    }

    /// Register a template, compiled from its string form
    pub fn register_template_string(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<(), TemplateRenderError> {
        let template = Template::compile_with_name(source, name.to_owned())?;
        self.templates.insert(name.to_owned(), template);
        Ok(())
    }

    /// Register a compiled template under a name
    pub fn register_template(&mut self, name: &str, template: Template) {
        self.templates.insert(name.to_owned(), template);
    }

    /// Remove a template from the registry
    pub fn unregister_template(&mut self, name: &str) {
        self.templates.remove(name);
    }

    /// Register a helper. Returns the registry so registrations chain.
    pub fn register_helper(
        &mut self,
        name: &str,
        def: Box<dyn HelperDef + 'static>,
    ) -> &mut Registry {
        self.helpers.insert(name.to_owned(), def);
        self
    }

    /// Remove all templates, keeping helpers
    pub fn clear_templates(&mut self) {
        self.templates.clear();
    }

    pub fn get_template(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn get_helper(&self, name: &str) -> Option<&dyn HelperDef> {
        self.helpers.get(name).map(|h| h.as_ref())
    }

    pub fn get_templates(&self) -> &HashMap<String, Template> {
        &self.templates
    }

    /// Render a registered template with the payload
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::new(format!("Template not found: {}", name)))?;
        let ctx = Context::wraps(data)?;

        let mut out = StringOutput::new();
        template.render(self, &ctx, &mut out)?;
        out.into_string()
            .map(|s| strip_blank_lines(&s))
            .map_err(RenderError::with)
    }

    /// Render a registered template into a writer
    pub fn render_to_write<T: Serialize, W: Write>(
        &self,
        name: &str,
        data: &T,
        writer: &mut W,
    ) -> Result<(), RenderError> {
        // buffered so blank lines can be stripped before anything is written
        let rendered = self.render(name, data)?;
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Compile and render a one-off template string
    pub fn render_template<T: Serialize>(
        &self,
        source: &str,
        data: &T,
    ) -> Result<String, TemplateRenderError> {
        let template = Template::compile(source)?;
        let ctx = Context::wraps(data)?;

        let mut out = StringOutput::new();
        template.render(self, &ctx, &mut out)?;
        let rendered = out.into_string().map_err(RenderError::with)?;
        Ok(strip_blank_lines(&rendered))
    }
}
