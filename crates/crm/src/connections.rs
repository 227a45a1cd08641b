//! Directory of provider accounts a tenant has connected per channel.

use chrono::Utc;
use dashmap::DashMap;
use propreach_core::types::{Channel, ChannelConnection, ConnectionStatus};
use uuid::Uuid;

/// Thread-safe in-memory connection directory backed by DashMap.
#[derive(Default)]
pub struct ConnectionDirectory {
    connections: DashMap<Uuid, ChannelConnection>,
}

impl ConnectionDirectory {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    pub fn add(
        &self,
        tenant_id: Uuid,
        channel: Channel,
        name: &str,
        provider: &str,
    ) -> ChannelConnection {
        let connection = ChannelConnection {
            id: Uuid::new_v4(),
            tenant_id,
            channel,
            name: name.to_string(),
            provider: provider.to_string(),
            status: ConnectionStatus::Active,
            created_at: Utc::now(),
        };
        self.connections.insert(connection.id, connection.clone());
        connection
    }

    pub fn get(&self, id: Uuid) -> Option<ChannelConnection> {
        self.connections.get(&id).map(|r| r.value().clone())
    }

    /// Connections of the tenant, optionally narrowed to one channel.
    /// Only active connections are offered to the wizard.
    pub fn list(&self, tenant_id: Uuid, channel: Option<Channel>) -> Vec<ChannelConnection> {
        let mut connections: Vec<ChannelConnection> = self
            .connections
            .iter()
            .filter(|r| {
                let c = r.value();
                c.tenant_id == tenant_id
                    && c.status == ConnectionStatus::Active
                    && channel.map_or(true, |ch| c.channel == ch)
            })
            .map(|r| r.value().clone())
            .collect();
        connections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_filters_by_channel() {
        let dir = ConnectionDirectory::new();
        let tenant = Uuid::new_v4();
        dir.add(tenant, Channel::Whatsapp, "Sales WA", "meta_cloud");
        dir.add(tenant, Channel::Email, "Newsletter", "smtp");

        assert_eq!(dir.list(tenant, None).len(), 2);
        let whatsapp = dir.list(tenant, Some(Channel::Whatsapp));
        assert_eq!(whatsapp.len(), 1);
        assert_eq!(whatsapp[0].name, "Sales WA");
        assert!(dir.list(tenant, Some(Channel::Sms)).is_empty());
    }

    #[test]
    fn test_list_is_tenant_scoped() {
        let dir = ConnectionDirectory::new();
        let tenant = Uuid::new_v4();
        dir.add(Uuid::new_v4(), Channel::Sms, "Other tenant", "twilio");

        assert!(dir.list(tenant, None).is_empty());
    }
}
