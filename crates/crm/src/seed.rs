//! Development seed data: one demo tenant with a small lead book,
//! connected accounts per channel, and a handful of active templates.

use crate::connections::ConnectionDirectory;
use crate::leads::{make_lead, MemoryLeadStore};
use crate::templates::TemplateCatalog;
use propreach_core::types::Channel;
use tracing::info;
use uuid::Uuid;

/// Fixed tenant id used by the seed so clients can omit the tenant header
/// against a fresh development instance.
pub fn demo_tenant_id() -> Uuid {
    Uuid::from_u128(0x1001)
}

pub fn seed_demo_data(
    leads: &MemoryLeadStore,
    connections: &ConnectionDirectory,
    templates: &TemplateCatalog,
) -> Uuid {
    let tenant = demo_tenant_id();

    // Demo leads; a couple without phone numbers on purpose so the
    // audience flows exercise the phone filter.
    let book = vec![
        ("Amina Khalid", Some("+971501234001"), Some("amina.k@example.com")),
        ("Bilal Haddad", Some("+971501234002"), None),
        ("Carla Mansour", Some("+971501234003"), Some("carla.m@example.com")),
        ("Dana Farsi", None, Some("dana.f@example.com")),
        ("Elias Toubia", Some("+971501234005"), None),
        ("Farah Aziz", Some("  "), Some("farah.a@example.com")),
        ("Ghassan Nader", Some("+971501234007"), Some("ghassan.n@example.com")),
        ("Hala Samaha", Some("+971501234008"), None),
    ];
    for (name, phone, email) in book {
        leads.insert(make_lead(tenant, name, phone, email));
    }

    connections.add(tenant, Channel::Whatsapp, "Sales WhatsApp", "meta_cloud");
    connections.add(tenant, Channel::Email, "Listings Mailbox", "smtp");
    connections.add(tenant, Channel::Sms, "SMS Gateway", "twilio");

    templates.add(
        Channel::Whatsapp,
        "New listing alert",
        "Hi {{name}}, a new property matching your search just listed: {{link}}",
    );
    templates.add(
        Channel::Whatsapp,
        "Open house invite",
        "You're invited to our open house this weekend at {{address}}. Reply YES to RSVP.",
    );
    templates.add(
        Channel::Email,
        "Monthly market digest",
        "Dear {{name}},\n\nHere is what moved in your area this month.",
    );
    templates.add(
        Channel::Sms,
        "Price drop",
        "{{name}}: price drop on {{address}}. Call us to view.",
    );

    info!(tenant_id = %tenant, "Seeded demo CRM data");
    tenant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::LeadStore;

    #[tokio::test]
    async fn test_seed_populates_all_directories() {
        let leads = MemoryLeadStore::new();
        let connections = ConnectionDirectory::new();
        let templates = TemplateCatalog::new();

        let tenant = seed_demo_data(&leads, &connections, &templates);

        assert_eq!(leads.list(tenant).await.unwrap().len(), 8);
        // Two leads have no usable phone
        assert_eq!(leads.count_with_phone(tenant).await.unwrap(), 6);
        assert_eq!(connections.list(tenant, None).len(), 3);
        assert!(!templates.list(Some(Channel::Whatsapp)).is_empty());
    }
}
