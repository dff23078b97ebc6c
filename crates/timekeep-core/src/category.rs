//! Timer categories, managed from the settings surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. "#3b82f6".
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        }
    }
}
