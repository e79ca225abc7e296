use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

/// Card chrome colours. Ring and label colours come from the band table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub panel: Srgba<f64>,
    pub text: Srgba<f64>,
    pub muted: Srgba<f64>,
    pub track: Srgba<f64>,
    pub fresh: Srgba<f64>,
    pub stale: Srgba<f64>,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            panel: Srgba::new(0.11, 0.11, 0.12, 0.92),
            text: Srgba::new(0.93, 0.93, 0.93, 1.0),
            muted: Srgba::new(0.93, 0.93, 0.93, 0.6),
            track: Srgba::new(1.0, 1.0, 1.0, 0.12),
            fresh: Srgba::new(0.0, 0.75, 0.75, 1.0),
            stale: Srgba::new(1.0, 0.5, 0.0, 1.0),
        }
    }
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let fallback = Self::default();
        Self {
            panel: Self::lookup_color(context, "theme_bg_color", fallback.panel, Some(0.92)),
            text: Self::lookup_color(context, "theme_fg_color", fallback.text, None),
            muted: Self::lookup_color(context, "theme_fg_color", fallback.muted, Some(0.6)),
            track: Self::lookup_color(context, "theme_fg_color", fallback.track, Some(0.12)),
            ..fallback
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                Srgba::new(
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    alpha_override.unwrap_or(c.alpha() as f64),
                )
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.ratering-window, .ratering-drawing-area {
    background: none;
    background-color: transparent;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
