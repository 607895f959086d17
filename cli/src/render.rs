use std::fmt;

use clap::ValueEnum;
use cooklang::{Component, Document};
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Pretty-printed JSON of the whole document
    Json,
    /// Human-readable recipe
    #[default]
    Text,
    /// Rust debug representation
    Debug,
}

pub fn render(document: &Document, format: Format) -> Result<String, CliError> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(document)?),
        Format::Text => Ok(TextRecipe(document).to_string()),
        Format::Debug => Ok(format!("{:#?}", document)),
    }
}

/// Plain-text rendering: metadata, sections with numbered steps, then the
/// ingredient list.
struct TextRecipe<'a>(&'a Document);

impl fmt::Display for TextRecipe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;
        let mut blocks: Vec<String> = Vec::new();

        if !doc.metadata.is_empty() {
            let lines: Vec<String> = doc
                .metadata
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect();
            blocks.push(lines.join("\n"));
        }

        for section in &doc.sections {
            let mut lines = Vec::new();
            match section.name.as_deref() {
                Some("") => lines.push("====".to_string()),
                Some(name) => lines.push(format!("== {} ==", name)),
                None => {}
            }
            for note in &section.notes {
                lines.push(format!("> {}", note));
            }
            for (i, step) in section.steps.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, step));
            }
            if !lines.is_empty() {
                blocks.push(lines.join("\n"));
            }
        }

        let ingredients: Vec<String> = doc.ingredients().filter_map(ingredient_line).collect();
        if !ingredients.is_empty() {
            blocks.push(format!("Ingredients:\n{}", ingredients.join("\n")));
        }

        write!(f, "{}", blocks.join("\n\n"))
    }
}

fn ingredient_line(component: &Component) -> Option<String> {
    let Component::Ingredient {
        name,
        quantity,
        unit,
        optional,
    } = component
    else {
        return None;
    };
    let amount = [quantity.as_str(), unit.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut line = format!("- {}", name);
    if !amount.is_empty() {
        line.push_str(": ");
        line.push_str(&amount);
    }
    if *optional {
        line.push_str(" (optional)");
    }
    Some(line)
}
