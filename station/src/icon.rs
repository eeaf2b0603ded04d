//! Mapping from forecast summary tokens to weather icons.

use std::fmt::Display;

/// A class of weather, each drawn with its own icon.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IconCategory {
    Snow,
    Rain,
    Cloud,
    Sun,
    Storm,
    Wind,
}

/// Summary tokens for each category. The first category listing a token wins.
///
/// The forecast page documents hail, thunderstorm and tornado as possible
/// future tokens; they are filed under storm, which otherwise has no tokens.
const ICON_MAP: [(IconCategory, &[&str]); 6] = [
    (IconCategory::Snow, &["snow", "sleet"]),
    (IconCategory::Rain, &["rain"]),
    (
        IconCategory::Cloud,
        &["fog", "cloudy", "partly-cloudy-day", "partly-cloudy-night"],
    ),
    (IconCategory::Sun, &["clear-day", "clear-night"]),
    (IconCategory::Storm, &["thunderstorm", "hail", "tornado"]),
    (IconCategory::Wind, &["wind"]),
];

impl IconCategory {
    pub const ALL: [IconCategory; 6] = [
        IconCategory::Snow,
        IconCategory::Rain,
        IconCategory::Cloud,
        IconCategory::Sun,
        IconCategory::Storm,
        IconCategory::Wind,
    ];

    /// Name used for this category's icon file, `icon-<name>.png`.
    pub fn name(self) -> &'static str {
        match self {
            IconCategory::Snow => "snow",
            IconCategory::Rain => "rain",
            IconCategory::Cloud => "cloud",
            IconCategory::Sun => "sun",
            IconCategory::Storm => "storm",
            IconCategory::Wind => "wind",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Summary tokens that resolve to this category.
    pub fn tokens(self) -> &'static [&'static str] {
        match ICON_MAP.iter().find(|(c, _)| *c == self) {
            Some((_, tokens)) => *tokens,
            None => &[],
        }
    }
}

impl Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a summary token to its icon. None if no category lists the token.
pub fn resolve(token: &str) -> Option<IconCategory> {
    ICON_MAP
        .iter()
        .find(|(_, tokens)| tokens.contains(&token))
        .map(|(category, _)| *category)
}
