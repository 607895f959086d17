use std::fmt;

use serde::Serialize;

use crate::metadata::Metadata;

/// A parsed recipe.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    /// Sections in source order. Steps before the first header live in an
    /// unnamed section.
    pub sections: Vec<Section>,
    pub metadata: Metadata,
    /// The `spec` key of the front matter, if any.
    pub spec_version: Option<String>,
}

impl Document {
    /// Every step of every section, in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.sections.iter().flat_map(|s| s.steps.iter())
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.steps().flat_map(|s| s.components.iter())
    }

    pub fn ingredients(&self) -> impl Iterator<Item = &Component> {
        self.components()
            .filter(|c| matches!(c, Component::Ingredient { .. }))
    }

    pub fn cookware(&self) -> impl Iterator<Item = &Component> {
        self.components()
            .filter(|c| matches!(c, Component::Cookware { .. }))
    }

    pub fn timers(&self) -> impl Iterator<Item = &Component> {
        self.components()
            .filter(|c| matches!(c, Component::Timer { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Section {
    /// `None` for the implicit leading section; `Some("")` for an
    /// anonymous `=` header.
    pub name: Option<String>,
    pub steps: Vec<Step>,
    /// Merged `>` notes, in source order.
    pub notes: Vec<String>,
}

impl Section {
    pub fn named(name: impl Into<String>) -> Self {
        Section {
            name: Some(name.into()),
            ..Section::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.notes.is_empty()
    }
}

/// One instruction unit. Never empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Step {
    pub components: Vec<Component>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

/// A typed fragment of a step. Absent fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Text {
        value: String,
    },
    Ingredient {
        name: String,
        /// Raw quantity text: `2`, `1/2`, `10-15`, or empty.
        quantity: String,
        unit: String,
        optional: bool,
    },
    Cookware {
        name: String,
        quantity: String,
    },
    Timer {
        name: String,
        duration: String,
        unit: String,
    },
}

impl Component {
    pub fn text(value: impl Into<String>) -> Self {
        Component::Text {
            value: value.into(),
        }
    }

    pub fn ingredient(
        name: impl Into<String>,
        quantity: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Component::Ingredient {
            name: name.into(),
            quantity: quantity.into(),
            unit: unit.into(),
            optional: false,
        }
    }

    pub fn cookware(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Component::Cookware {
            name: name.into(),
            quantity: quantity.into(),
        }
    }

    pub fn timer(
        name: impl Into<String>,
        duration: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Component::Timer {
            name: name.into(),
            duration: duration.into(),
            unit: unit.into(),
        }
    }

    /// Lowercase variant name, as used by the conformance corpus.
    pub fn kind(&self) -> &'static str {
        match self {
            Component::Text { .. } => "text",
            Component::Ingredient { .. } => "ingredient",
            Component::Cookware { .. } => "cookware",
            Component::Timer { .. } => "timer",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Text { value } => f.write_str(value),
            Component::Ingredient { name, .. } => f.write_str(name),
            Component::Cookware { name, .. } => f.write_str(name),
            // duration + unit > duration > name; never name and duration
            Component::Timer {
                name,
                duration,
                unit,
            } => match (duration.is_empty(), unit.is_empty()) {
                (false, false) => write!(f, "{} {}", duration, unit),
                (false, true) => f.write_str(duration),
                (true, _) => f.write_str(name),
            },
        }
    }
}
