//! Template System - read once, transform many

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A master object file, split into lines.
///
/// Every line keeps its terminator, so lines that pass through a transform
/// untouched come out byte-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub source: PathBuf,
    lines: Vec<String>,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(path.to_path_buf()),
            _ => TemplateError::Io { path: path.to_path_buf(), source: e },
        })?;
        tracing::debug!(path = %path.display(), "loaded template");
        Ok(Self::from_text(path, &text))
    }

    pub fn from_text(source: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            source: source.into(),
            lines: text.split_inclusive('\n').map(str::to_owned).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-build cache so each template file is read at most once
pub struct TemplateCache {
    templates: HashMap<PathBuf, Template>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    pub fn load(&mut self, path: &Path) -> Result<&Template, TemplateError> {
        if !self.templates.contains_key(path) {
            let template = Template::load(path)?;
            self.templates.insert(path.to_path_buf(), template);
        }
        Ok(&self.templates[path])
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.source.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}
