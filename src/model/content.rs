//! Page content tree as delivered by the content collaborator

use std::path::Path;

use serde::Deserialize;

use crate::error::NarratorError;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];
const NAVIGATION_CLASSES: [&str; 2] = ["nav", "navigation"];
const EXPLAIN_SIMPLY_CLASSES: [&str; 2] = ["eli5-section", "explain-simply"];
const EXPLAIN_SIMPLY_ID_PREFIX: &str = "sectioneli5-";

/// Containers whose content always keeps its baseline narration.
pub const EASY_READ_EXCLUDED_CLASSES: [&str; 4] =
    ["word-card", "activity-item", "nav-list", "activity-text"];

/// One element of the page, in document order through `children`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    pub tag: String,
    /// Stable data identifier used to look up text and audio
    #[serde(default)]
    pub id: Option<String>,
    /// Alternate identifier carried by inputs with a placeholder
    #[serde(default)]
    pub placeholder_id: Option<String>,
    /// Alias identifier carried by images
    #[serde(default)]
    pub aria_id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub children: Vec<PageNode>,
}

impl PageNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_heading(&self) -> bool {
        HEADING_TAGS.contains(&self.tag.as_str())
    }

    pub fn is_image(&self) -> bool {
        self.tag == "img"
    }

    pub fn is_input(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea")
    }

    /// Navigation chrome (menus, page switchers) is never narrated
    pub fn is_navigation(&self) -> bool {
        self.tag == "nav" || NAVIGATION_CLASSES.iter().any(|c| self.has_class(c))
    }

    pub fn is_explain_simply(&self) -> bool {
        EXPLAIN_SIMPLY_CLASSES.iter().any(|c| self.has_class(c))
            || self
                .id
                .as_deref()
                .is_some_and(|id| id.starts_with(EXPLAIN_SIMPLY_ID_PREFIX))
    }

    pub fn is_easy_read_excluded_container(&self) -> bool {
        EASY_READ_EXCLUDED_CLASSES.iter().any(|c| self.has_class(c))
    }
}

/// A page document: optional title plus the content root
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<PageNode>,
}

impl Page {
    pub fn load(path: &Path) -> Result<Self, NarratorError> {
        let raw = std::fs::read_to_string(path)?;
        let page: Page = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), has_content = page.content.is_some(), "Page document loaded");
        Ok(page)
    }

    pub fn root(&self) -> Result<&PageNode, NarratorError> {
        self.content.as_ref().ok_or(NarratorError::MissingContentRoot)
    }
}
