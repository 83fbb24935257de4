//! Built-in quick links shown on the home screen.

use serde::{Deserialize, Serialize};

/// Icon hint for a quick link. The TUI maps each to a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkIcon {
    #[default]
    Globe,
    Apple,
    Search,
    Code,
    Swift,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuickLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: LinkIcon,
}

impl QuickLink {
    pub fn new(name: &str, url: &str, icon: LinkIcon) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            icon,
        }
    }
}

pub fn default_quick_links() -> Vec<QuickLink> {
    vec![
        QuickLink::new("Apple", "https://www.apple.com", LinkIcon::Apple),
        QuickLink::new("Google", "https://www.google.com", LinkIcon::Search),
        QuickLink::new("GitHub", "https://github.com", LinkIcon::Code),
        QuickLink::new("SwiftUI", "https://developer.apple.com/xcode/swiftui", LinkIcon::Swift),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::address::validate;

    #[test]
    fn test_default_links_all_validate() {
        for link in default_quick_links() {
            let target = validate(&link.url).unwrap();
            assert_eq!(target.as_str(), link.url);
        }
    }

    #[test]
    fn test_icon_defaults_to_globe() {
        let link: QuickLink = toml::from_str("name = \"Docs\"\nurl = \"https://docs.rs\"").unwrap();
        assert_eq!(link.icon, LinkIcon::Globe);
    }
}
