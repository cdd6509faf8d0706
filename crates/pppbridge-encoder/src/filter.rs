//! Environment filtering and list-value splitting.

use pppbridge_common::config::FilterPolicy;
use pppbridge_common::constants::PPP_ENV_PREFIXES;

/// Returns `true` if a variable named `name` is reported under `policy`.
#[must_use]
pub fn is_allowed(policy: FilterPolicy, name: &[u8]) -> bool {
    match policy {
        FilterPolicy::PassThrough => true,
        FilterPolicy::AllowList => PPP_ENV_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix.as_bytes())),
    }
}

/// Splits a value on single spaces.
///
/// An empty value yields no elements. Otherwise `k` spaces yield `k + 1`
/// elements, empty ones included; nothing is trimmed or unescaped.
#[must_use]
pub fn split_list(value: &[u8]) -> Vec<&[u8]> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(|&b| b == b' ').collect()
}
