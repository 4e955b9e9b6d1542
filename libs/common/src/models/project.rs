//! Project model

use serde::{Deserialize, Serialize};

use crate::tags::TagList;
use crate::validation::{Validate, require};

/// Portfolio project as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub demo: Option<String>,
}

impl Project {
    pub fn has_demo(&self) -> bool {
        self.demo.as_deref().is_some_and(|demo| !demo.trim().is_empty())
    }

    pub fn has_github(&self) -> bool {
        !self.github.trim().is_empty()
    }

    /// Editable copy of this project
    pub fn to_draft(&self) -> ProjectDraft {
        ProjectDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            technologies: TagList::from(self.technologies.as_slice()),
            github: self.github.clone(),
            demo: self.demo.clone(),
        }
    }
}

/// Create/update payload for a project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub technologies: TagList,
    pub github: String,
    pub demo: Option<String>,
}

impl Validate for ProjectDraft {
    fn validate(&self) -> Result<(), String> {
        require("Name", &self.name)?;
        require("Description", &self.description)?;
        require("GitHub link", &self.github)?;
        Ok(())
    }
}
