use serde::Serialize;

/// Published posts below this count turn the badge red.
pub const DEFAULT_BADGE_THRESHOLD: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
    Danger,
    Primary,
}

impl BadgeColor {
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeColor::Danger => "danger",
            BadgeColor::Primary => "primary",
        }
    }
}

/// Count shown next to the resource in the navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationBadge {
    pub value: u64,
    pub color: BadgeColor,
}

impl NavigationBadge {
    pub fn new(published: u64, threshold: u64) -> Self {
        let color = if published < threshold {
            BadgeColor::Danger
        } else {
            BadgeColor::Primary
        };
        Self {
            value: published,
            color,
        }
    }
}
