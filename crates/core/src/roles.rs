//! Roles and the capabilities they grant.
//!
//! The installer upserts [`ROLE_CAPABILITIES`] into the `roles` table; request
//! authorization checks the same map so a fresh install and a running server
//! agree.

pub const ROLE_ADMINISTRATOR: &str = "administrator";
pub const ROLE_CAMPAIGN_MANAGER: &str = "campaign_manager";
pub const ROLE_DONOR: &str = "donor";

/// Full access to plugin settings and reports.
pub const CAP_MANAGE_OPTIONS: &str = "manage_options";
pub const CAP_VIEW_CHARITABLE_SENSITIVE_DATA: &str = "view_charitable_sensitive_data";
pub const CAP_EXPORT_CHARITABLE_REPORTS: &str = "export_charitable_reports";
pub const CAP_EDIT_CAMPAIGNS: &str = "edit_campaigns";
pub const CAP_EDIT_DONATIONS: &str = "edit_donations";
pub const CAP_READ: &str = "read";

pub const ROLE_CAPABILITIES: &[(&str, &[&str])] = &[
    (
        ROLE_ADMINISTRATOR,
        &[
            CAP_MANAGE_OPTIONS,
            CAP_VIEW_CHARITABLE_SENSITIVE_DATA,
            CAP_EXPORT_CHARITABLE_REPORTS,
            CAP_EDIT_CAMPAIGNS,
            CAP_EDIT_DONATIONS,
            CAP_READ,
        ],
    ),
    (
        ROLE_CAMPAIGN_MANAGER,
        &[
            CAP_VIEW_CHARITABLE_SENSITIVE_DATA,
            CAP_EXPORT_CHARITABLE_REPORTS,
            CAP_EDIT_CAMPAIGNS,
            CAP_EDIT_DONATIONS,
            CAP_READ,
        ],
    ),
    (ROLE_DONOR, &[CAP_READ]),
];

/// Capabilities granted to `role`. Unknown roles have none.
pub fn capabilities_for(role: &str) -> &'static [&'static str] {
    ROLE_CAPABILITIES
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, caps)| *caps)
        .unwrap_or(&[])
}

pub fn has_capability(role: &str, capability: &str) -> bool {
    capabilities_for(role).contains(&capability)
}
