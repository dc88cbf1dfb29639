use chrono::{DateTime, Utc};

use super::{TemplateId, UserId};

/// A user-owned formatting template. `format` is a markdown skeleton with
/// `{placeholder}` tokens; it describes layout only, never content.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: String,
    pub format: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: String,
    pub format: String,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: Option<String>,
    pub format: Option<String>,
}

impl TemplateChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.instruction.is_none()
            && self.icon_name.is_none()
            && self.format.is_none()
    }
}

impl Template {
    pub fn new(user_id: UserId, new: NewTemplate) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            user_id,
            title: new.title,
            description: new.description,
            instruction: new.instruction,
            icon_name: new.icon_name,
            format: new.format,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: TemplateChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(instruction) = changes.instruction {
            self.instruction = Some(instruction);
        }
        if let Some(icon_name) = changes.icon_name {
            self.icon_name = icon_name;
        }
        if let Some(format) = changes.format {
            self.format = format;
        }
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
