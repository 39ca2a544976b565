//! `.prompty` prompt templates: YAML front matter plus role-sectioned
//! handlebars body.
//!
//! ```text
//! ---
//! name: Example
//! model:
//!   parameters:
//!     temperature: 0.0
//! ---
//! system:
//! You are terse.
//!
//! user:
//! {{question}}
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FoundryError;
use crate::inference::{ChatMessage, ChatRole};

#[derive(Debug, Default, Deserialize)]
struct PromptyFrontmatter {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    model: PromptyModel,
    #[serde(default)]
    inputs: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptyModel {
    #[serde(default)]
    parameters: Map<String, Value>,
}

#[derive(Debug, Clone)]
struct Section {
    role: ChatRole,
    template: String,
}

/// A parsed prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: Option<String>,
    description: Option<String>,
    parameters: Map<String, Value>,
    inputs: Map<String, Value>,
    sections: Vec<Section>,
    registry: Handlebars<'static>,
    path: Option<PathBuf>,
}

fn split_frontmatter(source: &str) -> (Option<String>, String) {
    let mut lines = source.lines();
    if lines.next().map(str::trim) != Some("---") {
        return (None, source.to_string());
    }

    let mut frontmatter = Vec::new();
    let mut rest = lines.clone();
    for line in lines.by_ref() {
        rest.next();
        if line.trim() == "---" {
            let body: Vec<&str> = rest.collect();
            return (Some(frontmatter.join("\n")), body.join("\n"));
        }
        frontmatter.push(line);
    }

    // Unterminated front matter: treat the whole file as body.
    (None, source.to_string())
}

fn role_marker(line: &str) -> Option<ChatRole> {
    let name = line.trim().strip_suffix(':')?;
    name.trim().parse::<ChatRole>().ok()
}

fn split_sections(body: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut role = ChatRole::System;
    let mut lines: Vec<&str> = Vec::new();

    for line in body.lines() {
        if let Some(next) = role_marker(line) {
            sections.push(Section {
                role,
                template: lines.join("\n"),
            });
            lines.clear();
            role = next;
        } else {
            lines.push(line);
        }
    }
    sections.push(Section {
        role,
        template: lines.join("\n"),
    });

    sections
        .into_iter()
        .filter(|s| !s.template.trim().is_empty())
        .collect()
}

impl PromptTemplate {
    /// Load and parse a `.prompty` file.
    pub fn from_prompty(path: impl AsRef<Path>) -> Result<Self, FoundryError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            FoundryError::Template(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut template = Self::parse(&source)?;
        template.path = Some(path.to_path_buf());
        Ok(template)
    }

    /// Parse prompty source text.
    pub fn parse(source: &str) -> Result<Self, FoundryError> {
        let (frontmatter_text, body) = split_frontmatter(source);
        let frontmatter = match frontmatter_text {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str::<PromptyFrontmatter>(&text)
                .map_err(|e| FoundryError::Template(format!("invalid front matter: {e}")))?,
            _ => PromptyFrontmatter::default(),
        };

        let sections = split_sections(&body);
        if sections.is_empty() {
            return Err(FoundryError::Template("prompt template has no content".into()));
        }

        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        for (i, section) in sections.iter().enumerate() {
            registry
                .register_template_string(&section_name(i), section.template.trim())
                .map_err(|e| FoundryError::Template(e.to_string()))?;
        }

        Ok(Self {
            name: frontmatter.name,
            description: frontmatter.description,
            parameters: frontmatter.model.parameters,
            inputs: frontmatter.inputs,
            sections,
            registry,
            path: None,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Model parameters declared by the template (temperature, max_tokens, ...).
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Declared input names.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Render every section against `inputs`, in order. Sections that
    /// render to blank text are dropped.
    pub fn render(&self, inputs: &Value) -> Result<Vec<ChatMessage>, FoundryError> {
        let Some(provided) = inputs.as_object() else {
            return Err(FoundryError::Template("template inputs must be an object".into()));
        };
        if let Some(missing) = self.input_names().find(|name| !provided.contains_key(*name)) {
            return Err(FoundryError::Template(format!("missing template input '{missing}'")));
        }

        let mut messages = Vec::with_capacity(self.sections.len());
        for (i, section) in self.sections.iter().enumerate() {
            let text = self
                .registry
                .render(&section_name(i), inputs)
                .map_err(|e| FoundryError::Template(e.to_string()))?;
            let text = text.trim();
            if !text.is_empty() {
                messages.push(ChatMessage::new(section.role, text));
            }
        }
        Ok(messages)
    }
}

fn section_name(index: usize) -> String {
    format!("section-{index}")
}
