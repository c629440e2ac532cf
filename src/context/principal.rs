//! Authenticated caller identity.

/// The authenticated identity and its tenant/role claims for one caller.
///
/// Immutable once constructed by the auth gateway; shared by reference
/// inside the request context; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub tenant_id: String,
    pub roles: Vec<String>,
    pub display_name: Option<String>,
}
