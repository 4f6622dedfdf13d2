//! Settings keys consumed by the catalog.

/// Group used when a caller passes no group.
pub const GLOBAL_GROUP: &str = "catalog";

/// Per-backend groups are named `io-provider <backend id>`.
pub const BACKEND_GROUP_PREFIX: &str = "io-provider ";

/// Ordered list of backend ids; decides merge order and the default write target.
pub const WRITE_ORDER: &str = "io-providers-write-order";

/// Ordered list of top-level item ids.
pub const LEVEL_ZERO_ORDER: &str = "items-level-zero-order";

/// `ascending`, `descending` or `manual`.
pub const ORDER_MODE: &str = "items-list-order-mode";

/// When `true`, every backend is locked down by the administrator.
pub const ADMIN_LOCKED: &str = "io-providers-locked";

/// Per-backend: whether its items are loaded. Defaults to `true`.
pub const READABLE: &str = "readable";

/// Per-backend: whether it may be written to. Defaults to `true`.
pub const WRITABLE: &str = "writable";

#[must_use]
pub fn backend_group(backend_id: &str) -> String {
    format!("{BACKEND_GROUP_PREFIX}{backend_id}")
}

/// Extracts the backend id from a per-backend group name.
#[must_use]
pub fn backend_id(group: &str) -> Option<&str> {
    group.strip_prefix(BACKEND_GROUP_PREFIX).map(str::trim).filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_group_roundtrip() {
        let group = backend_group("desktop");
        assert_eq!(group, "io-provider desktop");
        assert_eq!(backend_id(&group), Some("desktop"));
    }

    #[test]
    fn backend_id_rejects_foreign_groups() {
        assert_eq!(backend_id(GLOBAL_GROUP), None);
        assert_eq!(backend_id("io-provider   "), None);
    }
}
