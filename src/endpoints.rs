//! Endpoint profiles for the supported HubSpot object types
//!
//! Every per-object-type fact lives here: API paths, pagination parameter
//! names, and the response envelope fields each endpoint uses. The rest of
//! the crate branches on this data instead of matching on the object type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Object Type
// ============================================================================

/// A HubSpot object type addressable by the connector.
///
/// Serialized forms are the UI display names, e.g. "Contact Lists".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "Contact Lists")]
    ContactLists,
    #[serde(rename = "Contacts")]
    Contacts,
    #[serde(rename = "Email Events")]
    EmailEvents,
    #[serde(rename = "Email Subscription")]
    EmailSubscription,
    #[serde(rename = "Recent Companies")]
    RecentCompanies,
    #[serde(rename = "Companies")]
    Companies,
    #[serde(rename = "Deals")]
    Deals,
    #[serde(rename = "Deal Pipelines")]
    DealPipelines,
    #[serde(rename = "Marketing Email")]
    MarketingEmail,
    #[serde(rename = "Products")]
    Products,
    #[serde(rename = "Tickets")]
    Tickets,
    #[serde(rename = "Analytics")]
    Analytics,
}

impl ObjectType {
    /// All supported object types
    pub const ALL: [ObjectType; 12] = [
        ObjectType::ContactLists,
        ObjectType::Contacts,
        ObjectType::EmailEvents,
        ObjectType::EmailSubscription,
        ObjectType::RecentCompanies,
        ObjectType::Companies,
        ObjectType::Deals,
        ObjectType::DealPipelines,
        ObjectType::MarketingEmail,
        ObjectType::Products,
        ObjectType::Tickets,
        ObjectType::Analytics,
    ];

    /// The display name used in config and in emitted records
    pub fn display_name(&self) -> &'static str {
        match self {
            ObjectType::ContactLists => "Contact Lists",
            ObjectType::Contacts => "Contacts",
            ObjectType::EmailEvents => "Email Events",
            ObjectType::EmailSubscription => "Email Subscription",
            ObjectType::RecentCompanies => "Recent Companies",
            ObjectType::Companies => "Companies",
            ObjectType::Deals => "Deals",
            ObjectType::DealPipelines => "Deal Pipelines",
            ObjectType::MarketingEmail => "Marketing Email",
            ObjectType::Products => "Products",
            ObjectType::Tickets => "Tickets",
            ObjectType::Analytics => "Analytics",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.display_name() == s)
            .ok_or_else(|| Error::invalid_value("objectType", format!("unknown object type '{s}'")))
    }
}

// ============================================================================
// Endpoint Profile
// ============================================================================

/// Everything the connector needs to know about one object type's API.
///
/// `None` request params are omitted from requests; `None` response fields
/// switch off the corresponding envelope handling (see the pagination
/// module for the exact rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointProfile {
    pub object_type: ObjectType,
    /// Read path relative to the API server URL
    pub path: &'static str,
    /// Query parameter carrying the page size, if the endpoint takes one
    pub limit_param: Option<&'static str>,
    /// Query parameter carrying the page offset, if the endpoint takes one
    pub offset_param: Option<&'static str>,
    /// Response field holding the next-page offset
    pub offset_field: Option<&'static str>,
    /// Response field holding the has-more flag
    pub more_field: Option<&'static str>,
    /// Response field holding the page's item array; `None` means the
    /// whole body is a single item
    pub items_field: Option<&'static str>,
    /// Write path relative to the API server URL; `None` means the
    /// object type is read-only
    pub write_path: Option<&'static str>,
}

// ============================================================================
// Endpoint Table
// ============================================================================

/// Immutable lookup table from object type to endpoint profile.
///
/// Built once at startup and passed by reference wherever per-type
/// behavior is needed.
#[derive(Debug, Clone)]
pub struct EndpointTable {
    profiles: HashMap<ObjectType, EndpointProfile>,
}

impl EndpointTable {
    /// Build the table covering every supported object type.
    pub fn new() -> Self {
        let mut profiles = HashMap::new();
        for profile in [
            EndpointProfile {
                object_type: ObjectType::ContactLists,
                path: "/contacts/v1/lists",
                limit_param: Some("count"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("has-more"),
                items_field: Some("lists"),
                write_path: Some("/contacts/v1/lists"),
            },
            EndpointProfile {
                object_type: ObjectType::Contacts,
                path: "/contacts/v1/lists/all/contacts/all",
                limit_param: Some("count"),
                offset_param: Some("vidOffset"),
                offset_field: Some("vid-offset"),
                more_field: Some("has-more"),
                items_field: Some("contacts"),
                write_path: Some("/contacts/v1/contact"),
            },
            EndpointProfile {
                object_type: ObjectType::EmailEvents,
                path: "/email/public/v1/events",
                limit_param: Some("limit"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("events"),
                write_path: None,
            },
            EndpointProfile {
                object_type: ObjectType::EmailSubscription,
                path: "/email/public/v1/subscriptions/timeline",
                limit_param: Some("limit"),
                offset_param: None,
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("timeline"),
                write_path: None,
            },
            EndpointProfile {
                object_type: ObjectType::RecentCompanies,
                path: "/companies/v2/companies/recent/modified",
                limit_param: Some("count"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("results"),
                write_path: None,
            },
            EndpointProfile {
                object_type: ObjectType::Companies,
                path: "/companies/v2/companies/paged",
                limit_param: Some("count"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("has-more"),
                items_field: Some("companies"),
                write_path: Some("/companies/v2/companies"),
            },
            EndpointProfile {
                object_type: ObjectType::Deals,
                path: "/deals/v1/deal/paged",
                limit_param: Some("limit"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("deals"),
                write_path: Some("/deals/v1/deal"),
            },
            EndpointProfile {
                object_type: ObjectType::DealPipelines,
                path: "/crm-pipelines/v1/pipelines/deals",
                limit_param: None,
                offset_param: None,
                offset_field: None,
                more_field: None,
                items_field: Some("results"),
                write_path: Some("/crm-pipelines/v1/pipelines/deals"),
            },
            EndpointProfile {
                object_type: ObjectType::MarketingEmail,
                path: "/marketing-emails/v1/emails",
                limit_param: Some("limit"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: None,
                items_field: Some("objects"),
                write_path: Some("/marketing-emails/v1/emails"),
            },
            EndpointProfile {
                object_type: ObjectType::Products,
                path: "/crm-objects/v1/objects/products/paged",
                limit_param: None,
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("objects"),
                write_path: Some("/crm-objects/v1/objects/products"),
            },
            EndpointProfile {
                object_type: ObjectType::Tickets,
                path: "/crm-objects/v1/objects/tickets/paged",
                limit_param: None,
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: Some("hasMore"),
                items_field: Some("objects"),
                write_path: Some("/crm-objects/v1/objects/tickets"),
            },
            EndpointProfile {
                object_type: ObjectType::Analytics,
                path: "/analytics/v2/reports",
                limit_param: Some("limit"),
                offset_param: Some("offset"),
                offset_field: Some("offset"),
                more_field: None,
                items_field: Some("breakdowns"),
                write_path: None,
            },
        ] {
            profiles.insert(profile.object_type, profile);
        }
        Self { profiles }
    }

    /// Look up the profile for an object type.
    pub fn get(&self, object_type: ObjectType) -> Option<&EndpointProfile> {
        self.profiles.get(&object_type)
    }

    /// Look up the profile, failing with a config error when absent.
    pub fn profile(&self, object_type: ObjectType) -> crate::Result<&EndpointProfile> {
        self.get(object_type)
            .ok_or_else(|| Error::config(format!("no endpoint profile for '{object_type}'")))
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::new()
    }
}
