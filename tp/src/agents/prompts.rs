//! Prompt templates for the LLM agents
//!
//! Template loading chain:
//! 1. `{override_dir}/{name}.pmt` (user override, e.g. `.tripcrew/prompts/`)
//! 2. Embedded copy of `prompts/{name}.pmt`
//!
//! Templates use Handlebars syntax. HTML escaping is disabled: the output is
//! a prompt, not a web page.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::llm::LlmError;

pub const PARSE: &str = include_str!("../../prompts/parse.pmt");
pub const DESTINATION: &str = include_str!("../../prompts/destination.pmt");
pub const LOGISTICS: &str = include_str!("../../prompts/logistics.pmt");
pub const CURATE: &str = include_str!("../../prompts/curate.pmt");
pub const ASSEMBLE: &str = include_str!("../../prompts/assemble.pmt");

/// Default user override directory, relative to the working directory
pub const OVERRIDE_DIR: &str = ".tripcrew/prompts";

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "parse" => Some(PARSE),
        "destination" => Some(DESTINATION),
        "logistics" => Some(LOGISTICS),
        "curate" => Some(CURATE),
        "assemble" => Some(ASSEMBLE),
        _ => {
            debug!(%name, "get_embedded: unknown prompt name");
            None
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Loader that prefers `{dir}/{name}.pmt` when the directory exists
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let exists = dir.is_dir();
        debug!(?dir, %exists, "PromptLoader::new: called");
        Self {
            hbs: Self::engine(),
            override_dir: exists.then(|| dir.to_path_buf()),
        }
    }

    /// Loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    fn load_template(&self, name: &str) -> Result<String, LlmError> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| LlmError::Template(format!("Failed to read prompt {}: {}", path.display(), e)));
            }
            debug!(?path, "PromptLoader::load_template: no override");
        }

        get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| LlmError::Template(format!("Prompt template not found: {}", name)))
    }

    /// Render a template with any serializable context
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String, LlmError> {
        debug!(%name, "PromptLoader::render: called");
        let template = self.load_template(name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| LlmError::Template(format!("Failed to render template {}: {}", name, e)))
    }
}

impl Default for PromptLoader {
    fn default() -> Self {
        Self::new(OVERRIDE_DIR)
    }
}
