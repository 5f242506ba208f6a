//! Window chrome selection.
//!
//! Maps the decoration and titlebar settings onto the concrete window variant
//! the host must build. A change of variant cannot be applied in place: the
//! coordinator rebuilds the window instead.

use crate::config::DerivedConfig;
use quickterm_config::TitlebarStyle;

/// Concrete window-host object variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromeVariant {
    /// No titlebar and no border
    Borderless,
    /// System titlebar
    Titled,
    /// Titlebar painted with the terminal background
    TransparentTitlebar,
    /// Tab strip merged into the titlebar
    TabsTitlebar,
    /// Titlebar removed, resize border kept
    HiddenTitlebar,
}

impl ChromeVariant {
    /// Whether windows of this variant can show a tab strip
    pub fn supports_tabs(&self) -> bool {
        matches!(
            self,
            ChromeVariant::Titled | ChromeVariant::TransparentTitlebar | ChromeVariant::TabsTitlebar
        )
    }
}

/// Stateless adapter from configuration to chrome variant
pub struct WindowChromeAdapter;

impl WindowChromeAdapter {
    pub fn variant(decoration: bool, style: TitlebarStyle) -> ChromeVariant {
        if !decoration {
            return ChromeVariant::Borderless;
        }
        match style {
            TitlebarStyle::Native => ChromeVariant::Titled,
            TitlebarStyle::Transparent => ChromeVariant::TransparentTitlebar,
            TitlebarStyle::Tabs => ChromeVariant::TabsTitlebar,
            TitlebarStyle::Hidden => ChromeVariant::HiddenTitlebar,
        }
    }

    pub fn for_config(config: &DerivedConfig) -> ChromeVariant {
        Self::variant(config.window_decoration, config.titlebar_style)
    }

    /// True when moving from `old` to `new` requires tearing windows down
    pub fn needs_rebuild(old: &DerivedConfig, new: &DerivedConfig) -> bool {
        Self::for_config(old) != Self::for_config(new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickterm_config::Config;

    #[test]
    fn test_decoration_off_wins_over_style() {
        for style in [
            TitlebarStyle::Native,
            TitlebarStyle::Transparent,
            TitlebarStyle::Tabs,
            TitlebarStyle::Hidden,
        ] {
            assert_eq!(
                WindowChromeAdapter::variant(false, style),
                ChromeVariant::Borderless
            );
        }
    }

    #[test]
    fn test_tab_support_by_variant() {
        assert!(ChromeVariant::TabsTitlebar.supports_tabs());
        assert!(!ChromeVariant::Borderless.supports_tabs());
        assert!(!ChromeVariant::HiddenTitlebar.supports_tabs());
    }

    #[test]
    fn test_rebuild_only_on_variant_change() {
        let base = DerivedConfig::from(&Config::default());
        let opacity_only = DerivedConfig::from(&Config {
            background_opacity: 0.5,
            ..Config::default()
        });
        let native =
            DerivedConfig::from(&Config::default().with_titlebar_style(TitlebarStyle::Native));

        assert!(!WindowChromeAdapter::needs_rebuild(&base, &opacity_only));
        assert!(WindowChromeAdapter::needs_rebuild(&base, &native));
    }
}
