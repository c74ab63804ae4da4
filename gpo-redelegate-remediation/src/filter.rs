//! Display-name filtering for the target set.

use crate::types::Gpo;

/// Optional prefix and substring constraints on GPO display names.
///
/// Both legs match case-insensitively and compose conjunctively. Matching is
/// literal containment: no regex, and characters that look special to other
/// matchers pass through as-is.
#[derive(Debug, Clone, Default)]
pub struct GpoFilter {
    pub prefix: Option<String>,
    pub substring: Option<String>,
}

impl GpoFilter {
    pub fn new(prefix: Option<String>, substring: Option<String>) -> Self {
        Self { prefix, substring }
    }

    /// True when neither leg was supplied and every GPO in the domain is on
    /// the table.
    pub fn is_unrestricted(&self) -> bool {
        self.prefix.is_none() && self.substring.is_none()
    }

    pub fn matches(&self, display_name: &str) -> bool {
        let name = display_name.to_lowercase();
        if let Some(prefix) = &self.prefix {
            if !name.starts_with(&prefix.to_lowercase()) {
                return false;
            }
        }
        if let Some(fragment) = &self.substring {
            if !name.contains(&fragment.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, gpos: Vec<Gpo>) -> Vec<Gpo> {
        gpos.into_iter()
            .filter(|gpo| self.matches(&gpo.display_name))
            .collect()
    }
}
