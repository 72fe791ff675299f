use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Color given to people created without one.
pub const DEFAULT_PERSON_COLOR: &str = "#6366f1";

/// A household member who can be assigned chores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub color: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Person {
    /// Create a person with a fresh id.
    ///
    /// # Errors
    /// Fails for an empty name or a color that is not `#rgb` / `#rrggbb`.
    pub fn new(
        name: &str,
        color: Option<&str>,
        avatar: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let mut person = Self {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            color: DEFAULT_PERSON_COLOR.to_string(),
            avatar: avatar.filter(|a| !a.trim().is_empty()),
            created_at: now,
        };
        person.set_name(name)?;
        if let Some(color) = color {
            person.set_color(color)?;
        }
        Ok(person)
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name".to_string()));
        }
        self.name = name.to_string();
        Ok(())
    }

    pub fn set_color(&mut self, color: &str) -> Result<(), ValidationError> {
        let color = color.trim();
        let hex = color.strip_prefix('#').unwrap_or("");
        let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ValidationError::InvalidValue {
                field: "color".to_string(),
                message: format!("expected #rgb or #rrggbb, got '{color}'"),
            });
        }
        self.color = color.to_ascii_lowercase();
        Ok(())
    }
}
