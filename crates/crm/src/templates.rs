//! Catalog of reusable message templates, channel-scoped.

use dashmap::DashMap;
use propreach_core::types::{Channel, MessageTemplate, TemplateStatus};
use uuid::Uuid;

/// Thread-safe in-memory template catalog backed by DashMap.
#[derive(Default)]
pub struct TemplateCatalog {
    templates: DashMap<Uuid, MessageTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    pub fn add(&self, channel: Channel, name: &str, body: &str) -> MessageTemplate {
        let template = MessageTemplate {
            id: Uuid::new_v4(),
            channel,
            name: name.to_string(),
            body: body.to_string(),
            status: TemplateStatus::Active,
        };
        self.templates.insert(template.id, template.clone());
        template
    }

    pub fn get(&self, id: Uuid) -> Option<MessageTemplate> {
        self.templates.get(&id).map(|r| r.value().clone())
    }

    /// Active templates, optionally narrowed to one channel. Archived and
    /// draft templates are not offered to the wizard.
    pub fn list(&self, channel: Option<Channel>) -> Vec<MessageTemplate> {
        let mut templates: Vec<MessageTemplate> = self
            .templates
            .iter()
            .filter(|r| {
                let t = r.value();
                t.status == TemplateStatus::Active && channel.map_or(true, |ch| t.channel == ch)
            })
            .map(|r| r.value().clone())
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    }
}
