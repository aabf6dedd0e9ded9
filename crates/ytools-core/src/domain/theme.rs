//! Theme modes and the static palette tables derived from them.
//!
//! A [`ThemeMode`] is what the user picks in the settings page.  Two things
//! are derived from it, both pure functions of the mode and the host's
//! current light/dark preference:
//!
//! - the **base theme** ([`BaseTheme`]): whether the UI library renders its
//!   light or dark component set;
//! - the **palette** ([`ThemeOverrides`]): the colour, radius, and shadow
//!   tokens layered on top of the base theme.
//!
//! | Mode        | Prefers dark | Base  | Palette    |
//! |-------------|--------------|-------|------------|
//! | `light`     | any          | light | light      |
//! | `dark`      | any          | dark  | dark       |
//! | `system`    | no           | light | light      |
//! | `system`    | yes          | dark  | dark       |
//! | `cyberpunk` | any          | dark  | cyberpunk  |

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Name of the cross-window event that carries a [`ThemeMode`] payload.
pub const THEME_CHANGED_EVENT: &str = "theme-changed";

// ── Theme mode ────────────────────────────────────────────────────────────────

/// User-selected theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the operating system's light/dark preference.
    #[default]
    System,
    /// Neon-on-navy custom palette, rendered on the dark base theme.
    Cyberpunk,
}

/// Error returned when a string does not name a [`ThemeMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme mode: {0:?}")]
pub struct ParseThemeModeError(pub String);

impl ThemeMode {
    /// Every supported mode, in settings-page order.
    pub const ALL: [ThemeMode; 4] = [
        ThemeMode::Light,
        ThemeMode::Dark,
        ThemeMode::System,
        ThemeMode::Cyberpunk,
    ];

    /// Lowercase wire name, identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
            ThemeMode::Cyberpunk => "cyberpunk",
        }
    }

    /// Whether the UI renders dark for this mode.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark | ThemeMode::Cyberpunk => true,
            ThemeMode::System => system_prefers_dark,
        }
    }

    /// Component set the UI library should render.
    pub fn base_theme(self, system_prefers_dark: bool) -> BaseTheme {
        if self.is_dark(system_prefers_dark) {
            BaseTheme::Dark
        } else {
            BaseTheme::Light
        }
    }

    /// Which static palette applies.
    pub fn palette_kind(self, system_prefers_dark: bool) -> PaletteKind {
        match self {
            ThemeMode::Cyberpunk => PaletteKind::Cyberpunk,
            mode if mode.is_dark(system_prefers_dark) => PaletteKind::Dark,
            _ => PaletteKind::Light,
        }
    }

    /// Palette overrides for this mode.
    pub fn palette(self, system_prefers_dark: bool) -> &'static ThemeOverrides {
        self.palette_kind(system_prefers_dark).overrides()
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ParseThemeModeError(s.to_string()))
    }
}

/// Base component set of the UI library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseTheme {
    Light,
    Dark,
}

/// Identifies one of the static palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    Light,
    Dark,
    Cyberpunk,
}

impl PaletteKind {
    pub fn overrides(self) -> &'static ThemeOverrides {
        match self {
            PaletteKind::Light => &LIGHT_OVERRIDES,
            PaletteKind::Dark => &DARK_OVERRIDES,
            PaletteKind::Cyberpunk => &CYBERPUNK_OVERRIDES,
        }
    }
}

// ── Palette representation ────────────────────────────────────────────────────

/// A list of `(token, value)` pairs, e.g. `("primaryColor", "#a78bfa")`.
pub type TokenTable = &'static [(&'static str, &'static str)];

/// Token overrides for one UI component, optionally with nested peers.
#[derive(Debug, PartialEq, Eq)]
pub struct ComponentOverrides {
    pub name: &'static str,
    pub tokens: TokenTable,
    pub peers: &'static [ComponentOverrides],
}

impl ComponentOverrides {
    pub fn token(&self, name: &str) -> Option<&'static str> {
        lookup(self.tokens, name)
    }

    pub fn peer(&self, name: &str) -> Option<&ComponentOverrides> {
        self.peers.iter().find(|peer| peer.name == name)
    }
}

/// Global and per-component overrides layered on a base theme.
///
/// Serialises to the object shape the webview UI library consumes:
/// `{"common": {..}, "Button": {..}, "Select": {"peers": {..}}}`.
#[derive(Debug, PartialEq, Eq)]
pub struct ThemeOverrides {
    pub common: TokenTable,
    pub components: &'static [ComponentOverrides],
}

impl ThemeOverrides {
    pub fn common_token(&self, name: &str) -> Option<&'static str> {
        lookup(self.common, name)
    }

    pub fn component(&self, name: &str) -> Option<&ComponentOverrides> {
        self.components.iter().find(|c| c.name == name)
    }
}

fn lookup(table: TokenTable, name: &str) -> Option<&'static str> {
    table.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
}

struct Tokens(TokenTable);

impl Serialize for Tokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, *v)))
    }
}

struct Peers(&'static [ComponentOverrides]);

impl Serialize for Peers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|peer| (peer.name, peer)))
    }
}

impl Serialize for ComponentOverrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.tokens.len() + usize::from(!self.peers.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in self.tokens {
            map.serialize_entry(key, value)?;
        }
        if !self.peers.is_empty() {
            map.serialize_entry("peers", &Peers(self.peers))?;
        }
        map.end()
    }
}

impl Serialize for ThemeOverrides {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.components.len()))?;
        map.serialize_entry("common", &Tokens(self.common))?;
        for component in self.components {
            map.serialize_entry(component.name, component)?;
        }
        map.end()
    }
}

// ── Palette tables ────────────────────────────────────────────────────────────

const UI_FONT_FAMILY: &str =
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif";

/// Violet accents on warm stone surfaces.
pub static LIGHT_OVERRIDES: ThemeOverrides = ThemeOverrides {
    common: &[
        ("primaryColor", "#a78bfa"),
        ("primaryColorHover", "#8b5cf6"),
        ("primaryColorPressed", "#7c3aed"),
        ("primaryColorSuppl", "#c4b5fd"),
        ("borderRadius", "8px"),
        ("fontFamily", UI_FONT_FAMILY),
        ("bodyColor", "#f5f5f4"),
        ("cardColor", "#fafaf9"),
        ("modalColor", "#fafaf9"),
        ("popoverColor", "#fafaf9"),
        ("tableHeaderColor", "#e7e5e4"),
        ("hoverColor", "#e7e5e4"),
        ("inputColor", "#fafaf9"),
        ("tableColor", "#fafaf9"),
    ],
    components: &[],
};

/// Violet accents; surfaces come from the UI library's dark theme.
pub static DARK_OVERRIDES: ThemeOverrides = ThemeOverrides {
    common: &[
        ("primaryColor", "#a78bfa"),
        ("primaryColorHover", "#8b5cf6"),
        ("primaryColorPressed", "#7c3aed"),
        ("primaryColorSuppl", "#c4b5fd"),
        ("borderRadius", "8px"),
        ("fontFamily", UI_FONT_FAMILY),
    ],
    components: &[],
};

/// Cyan/yellow neon on deep navy, with glow shadows.
pub static CYBERPUNK_OVERRIDES: ThemeOverrides = ThemeOverrides {
    common: &[
        ("primaryColor", "#5ccfe6"),
        ("primaryColorHover", "#6fdbf0"),
        ("primaryColorPressed", "#4fb3c9"),
        ("primaryColorSuppl", "#7ee3f5"),
        ("infoColor", "#5ccfe6"),
        ("infoColorHover", "#6fdbf0"),
        ("infoColorPressed", "#3ab8d9"),
        ("successColor", "#bae67e"),
        ("successColorHover", "#c8f090"),
        ("successColorPressed", "#a8d46b"),
        ("warningColor", "#ffcc66"),
        ("warningColorHover", "#ffd580"),
        ("warningColorPressed", "#ffae57"),
        ("errorColor", "#ef6b73"),
        ("errorColorHover", "#f58289"),
        ("errorColorPressed", "#e35961"),
        ("bodyColor", "#0f1419"),
        ("cardColor", "#171c28"),
        ("modalColor", "#171c28"),
        ("popoverColor", "#1d2433"),
        ("tableColor", "#1d2433"),
        ("tableHeaderColor", "#242b3d"),
        ("inputColor", "#1d2433"),
        ("codeColor", "#171c28"),
        ("borderColor", "rgba(92, 207, 230, 0.2)"),
        ("dividerColor", "rgba(92, 207, 230, 0.15)"),
        ("textColorBase", "#d7dce2"),
        ("textColor1", "#d7dce2"),
        ("textColor2", "#c3cad8"),
        ("textColor3", "#a2aabc"),
        ("textColorDisabled", "#6679a4"),
        ("placeholderColor", "#8695b7"),
        ("hoverColor", "rgba(92, 207, 230, 0.12)"),
        ("pressedColor", "rgba(92, 207, 230, 0.2)"),
        ("opacityDisabled", "0.4"),
        ("borderRadius", "8px"),
        ("borderRadiusSmall", "6px"),
        (
            "boxShadow1",
            "0 2px 12px rgba(92, 207, 230, 0.15), 0 1px 4px rgba(195, 166, 255, 0.1)",
        ),
        (
            "boxShadow2",
            "0 4px 20px rgba(92, 207, 230, 0.2), 0 2px 8px rgba(195, 166, 255, 0.15)",
        ),
        (
            "boxShadow3",
            "0 8px 40px rgba(92, 207, 230, 0.25), 0 4px 16px rgba(195, 166, 255, 0.2)",
        ),
        ("scrollbarColor", "rgba(92, 207, 230, 0.5)"),
        ("scrollbarColorHover", "rgba(92, 207, 230, 0.8)"),
        ("fontFamily", UI_FONT_FAMILY),
    ],
    components: &[
        ComponentOverrides {
            name: "Button",
            tokens: &[
                ("colorPrimary", "#5ccfe6"),
                ("colorHoverPrimary", "#6fdbf0"),
                ("colorPressedPrimary", "#4fb3c9"),
                ("colorFocusPrimary", "#5ccfe6"),
                ("borderPrimary", "1px solid #5ccfe6"),
                ("borderHoverPrimary", "1px solid #6fdbf0"),
                ("borderPressedPrimary", "1px solid #4fb3c9"),
                ("borderFocusPrimary", "1px solid #5ccfe6"),
                ("textColorPrimary", "#0f1419"),
                ("textColorHoverPrimary", "#0f1419"),
                ("textColorPressedPrimary", "#0f1419"),
                ("textColorFocusPrimary", "#0f1419"),
                (
                    "boxShadowFocus",
                    "0 0 0 3px rgba(92, 207, 230, 0.3), 0 0 20px rgba(92, 207, 230, 0.6)",
                ),
                ("color", "rgba(92, 207, 230, 0.08)"),
                ("colorHover", "rgba(92, 207, 230, 0.15)"),
                ("colorPressed", "rgba(92, 207, 230, 0.22)"),
                ("textColor", "#d7dce2"),
                ("textColorHover", "#e6edf3"),
                ("textColorPressed", "#c3cad8"),
                ("border", "1px solid rgba(92, 207, 230, 0.4)"),
                ("borderHover", "1px solid rgba(92, 207, 230, 0.6)"),
                ("borderPressed", "1px solid rgba(92, 207, 230, 0.8)"),
                ("colorError", "#ff6b73"),
                ("colorHoverError", "#ff8a91"),
                ("colorPressedError", "#f55a63"),
                ("textColorError", "#e6edf3"),
                ("textColorHoverError", "#ffffff"),
                ("borderError", "1px solid rgba(255, 107, 115, 0.6)"),
                ("borderHoverError", "1px solid rgba(255, 107, 115, 1)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Input",
            tokens: &[
                ("color", "#1d2433"),
                ("colorFocus", "#1d2433"),
                ("border", "1px solid rgba(92, 207, 230, 0.3)"),
                ("borderHover", "1px solid rgba(92, 207, 230, 0.5)"),
                ("borderFocus", "1px solid #5ccfe6"),
                (
                    "boxShadowFocus",
                    "0 0 0 3px rgba(92, 207, 230, 0.2), 0 0 16px rgba(92, 207, 230, 0.4)",
                ),
                ("caretColor", "#ffcc66"),
                ("textColor", "#e6edf3"),
                ("placeholderColor", "#8695b7"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Select",
            tokens: &[],
            peers: &[ComponentOverrides {
                name: "InternalSelection",
                tokens: &[
                    ("color", "#1d2433"),
                    ("colorActive", "#1d2433"),
                    ("border", "1px solid rgba(92, 207, 230, 0.3)"),
                    ("borderHover", "1px solid rgba(92, 207, 230, 0.5)"),
                    ("borderActive", "1px solid #5ccfe6"),
                    ("borderFocus", "1px solid #5ccfe6"),
                    (
                        "boxShadowActive",
                        "0 0 0 3px rgba(92, 207, 230, 0.2), 0 0 16px rgba(92, 207, 230, 0.3)",
                    ),
                    (
                        "boxShadowFocus",
                        "0 0 0 3px rgba(92, 207, 230, 0.2), 0 0 16px rgba(92, 207, 230, 0.3)",
                    ),
                    ("textColor", "#e6edf3"),
                    ("placeholderColor", "#8695b7"),
                ],
                peers: &[],
            }],
        },
        ComponentOverrides {
            name: "Tabs",
            tokens: &[
                ("tabTextColorLine", "#a2aabc"),
                ("tabTextColorActiveLine", "#5ccfe6"),
                ("tabTextColorHoverLine", "#d7dce2"),
                ("barColor", "#5ccfe6"),
                ("tabColorSegment", "rgba(92, 207, 230, 0.08)"),
                ("tabBorderColor", "rgba(92, 207, 230, 0.2)"),
                ("boxShadow", "0 0 12px rgba(92, 207, 230, 0.3)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Radio",
            tokens: &[
                ("buttonColorActive", "#5ccfe6"),
                ("buttonTextColorActive", "#0f1419"),
                ("buttonBorderColorActive", "#5ccfe6"),
                (
                    "boxShadowFocus",
                    "0 0 0 3px rgba(92, 207, 230, 0.25), 0 0 12px rgba(92, 207, 230, 0.4)",
                ),
                ("dotColorActive", "#ffcc66"),
                ("color", "rgba(92, 207, 230, 0.1)"),
                ("colorHover", "rgba(92, 207, 230, 0.15)"),
                ("textColor", "#e6edf3"),
                ("border", "1px solid rgba(92, 207, 230, 0.3)"),
                ("borderHover", "1px solid rgba(92, 207, 230, 0.5)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Switch",
            tokens: &[
                ("railColorActive", "#ffcc66"),
                ("loadingColor", "#5ccfe6"),
                (
                    "boxShadowFocus",
                    "0 0 0 3px rgba(255, 204, 102, 0.25), 0 0 12px rgba(255, 204, 102, 0.5)",
                ),
                ("railColor", "rgba(92, 207, 230, 0.2)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Scrollbar",
            tokens: &[
                ("color", "rgba(92, 207, 230, 0.5)"),
                ("colorHover", "rgba(92, 207, 230, 0.8)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "List",
            tokens: &[
                ("color", "transparent"),
                ("colorHover", "rgba(92, 207, 230, 0.08)"),
                ("colorModal", "#171c28"),
                ("colorHoverModal", "rgba(92, 207, 230, 0.12)"),
                ("borderColor", "rgba(92, 207, 230, 0.2)"),
                ("borderColorModal", "rgba(92, 207, 230, 0.2)"),
            ],
            peers: &[],
        },
        ComponentOverrides {
            name: "Divider",
            tokens: &[
                ("color", "rgba(92, 207, 230, 0.2)"),
                ("textColor", "#d7dce2"),
            ],
            peers: &[],
        },
    ],
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dark_matches_derivation_table_for_every_mode() {
        // (mode, prefers_dark, expected)
        let table = [
            (ThemeMode::Light, false, false),
            (ThemeMode::Light, true, false),
            (ThemeMode::Dark, false, true),
            (ThemeMode::Dark, true, true),
            (ThemeMode::System, false, false),
            (ThemeMode::System, true, true),
            (ThemeMode::Cyberpunk, false, true),
            (ThemeMode::Cyberpunk, true, true),
        ];

        for (mode, prefers_dark, expected) in table {
            assert_eq!(
                mode.is_dark(prefers_dark),
                expected,
                "{mode} with prefers_dark={prefers_dark}"
            );
        }
    }

    #[test]
    fn test_base_theme_follows_darkness() {
        assert_eq!(ThemeMode::Light.base_theme(true), BaseTheme::Light);
        assert_eq!(ThemeMode::System.base_theme(true), BaseTheme::Dark);
        assert_eq!(ThemeMode::System.base_theme(false), BaseTheme::Light);
        assert_eq!(ThemeMode::Cyberpunk.base_theme(false), BaseTheme::Dark);
    }

    #[test]
    fn test_palette_kind_for_system_mode_follows_preference() {
        assert_eq!(ThemeMode::System.palette_kind(false), PaletteKind::Light);
        assert_eq!(ThemeMode::System.palette_kind(true), PaletteKind::Dark);
    }

    #[test]
    fn test_cyberpunk_uses_its_own_palette_not_the_dark_one() {
        // Arrange / Act
        let palette = ThemeMode::Cyberpunk.palette(false);

        // Assert
        assert_eq!(ThemeMode::Cyberpunk.palette_kind(true), PaletteKind::Cyberpunk);
        assert_ne!(palette, &DARK_OVERRIDES);
        assert_eq!(palette.common_token("primaryColor"), Some("#5ccfe6"));
    }

    #[test]
    fn test_light_palette_sets_stone_body_color() {
        let palette = ThemeMode::Light.palette(true);
        assert_eq!(palette.common_token("bodyColor"), Some("#f5f5f4"));
        assert_eq!(palette.common_token("borderRadius"), Some("8px"));
    }

    #[test]
    fn test_dark_palette_leaves_surfaces_to_base_theme() {
        let palette = ThemeMode::Dark.palette(false);
        assert_eq!(palette.common_token("bodyColor"), None);
        assert!(palette.components.is_empty());
    }

    #[test]
    fn test_cyberpunk_select_has_internal_selection_peer() {
        let select = CYBERPUNK_OVERRIDES.component("Select").expect("Select overrides");
        let peer = select.peer("InternalSelection").expect("peer");
        assert_eq!(peer.token("borderFocus"), Some("1px solid #5ccfe6"));
    }

    #[test]
    fn test_palette_serializes_to_ui_library_shape() {
        // Act
        let value = serde_json::to_value(&CYBERPUNK_OVERRIDES).expect("serialize");

        // Assert
        assert_eq!(value["common"]["bodyColor"], "#0f1419");
        assert_eq!(value["Button"]["textColorPrimary"], "#0f1419");
        assert_eq!(
            value["Select"]["peers"]["InternalSelection"]["borderFocus"],
            "1px solid #5ccfe6"
        );
        assert_eq!(value["Input"]["caretColor"], "#ffcc66");
    }

    #[test]
    fn test_light_palette_serializes_only_common_section() {
        let value = serde_json::to_value(&LIGHT_OVERRIDES).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("common"));
    }

    #[test]
    fn test_theme_mode_parses_every_wire_name() {
        for mode in ThemeMode::ALL {
            assert_eq!(mode.as_str().parse::<ThemeMode>(), Ok(mode));
            assert_eq!(mode.to_string(), mode.as_str());
        }
    }

    #[test]
    fn test_theme_mode_rejects_unknown_name() {
        let err = "solarized".parse::<ThemeMode>().unwrap_err();
        assert_eq!(err, ParseThemeModeError("solarized".to_string()));
    }

    #[test]
    fn test_theme_mode_serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_value(ThemeMode::Cyberpunk).expect("serialize"),
            "cyberpunk"
        );
        let mode: ThemeMode = serde_json::from_str("\"dark\"").expect("deserialize");
        assert_eq!(mode, ThemeMode::Dark);
    }

    #[test]
    fn test_default_theme_mode_is_system() {
        assert_eq!(ThemeMode::default(), ThemeMode::System);
    }
}
