//! Colour-parameterised stylesheets for the campaign builder themes.
//!
//! Each theme has four palette slots (primary, secondary, tertiary, button)
//! supplied as `p`, `s`, `t` and `b` query parameters, plus a mobile
//! breakpoint `mw`. The theme decides which slot drives which part of the
//! campaign layout.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Mobile breakpoint when `mw` is missing or not a positive integer.
pub const DEFAULT_MOBILE_WIDTH: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    ClubOrganization,
    AnimalSanctuary,
    DisasterRelief,
    Education,
    Environmental,
    Medical,
}

/// Default colours, in `p`, `s`, `t`, `b` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub tertiary: String,
    pub button: String,
}

/// Where each palette slot is applied.
#[derive(Debug, Clone, Copy)]
struct Layout {
    row_background: Slot,
    heading: Slot,
    text_background: Slot,
    accent: Slot,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Primary,
    Secondary,
    Tertiary,
    Button,
}

impl Palette {
    fn get(&self, slot: Slot) -> &str {
        match slot {
            Slot::Primary => &self.primary,
            Slot::Secondary => &self.secondary,
            Slot::Tertiary => &self.tertiary,
            Slot::Button => &self.button,
        }
    }
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::ClubOrganization,
        Theme::AnimalSanctuary,
        Theme::DisasterRelief,
        Theme::Education,
        Theme::Environmental,
        Theme::Medical,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::ClubOrganization => "club-organization-colors",
            Self::AnimalSanctuary => "animal-sanctuary",
            Self::DisasterRelief => "disaster-relief",
            Self::Education => "education",
            Self::Environmental => "environmental",
            Self::Medical => "medical",
        }
    }

    /// Accepts the slug with or without a `.css` or `.php` suffix.
    pub fn from_slug(input: &str) -> Option<Self> {
        let slug = input
            .trim()
            .trim_end_matches(".css")
            .trim_end_matches(".php");
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    pub fn defaults(self) -> Palette {
        let (p, s, t, b) = match self {
            Self::ClubOrganization => ("#1D3444", "#2B4E64", "#F4F0EE", "#B49A5F"),
            Self::AnimalSanctuary => ("#805F93", "#364657", "#F9F6F2", "#DE8C2E"),
            Self::DisasterRelief => ("#BF1E2E", "#1F2A44", "#F5F5F5", "#F2A900"),
            Self::Education => ("#2E5C8A", "#1B3048", "#FFFFFF", "#F2B134"),
            Self::Environmental => ("#2F6B3B", "#1E3A24", "#F3F7EE", "#D98E04"),
            Self::Medical => ("#0B6E99", "#0A3D55", "#F4FAFB", "#E4572E"),
        };
        Palette {
            primary: p.to_string(),
            secondary: s.to_string(),
            tertiary: t.to_string(),
            button: b.to_string(),
        }
    }

    fn layout(self) -> Layout {
        match self {
            Self::ClubOrganization => Layout {
                row_background: Slot::Primary,
                heading: Slot::Secondary,
                text_background: Slot::Tertiary,
                accent: Slot::Button,
            },
            _ => Layout {
                row_background: Slot::Tertiary,
                heading: Slot::Primary,
                text_background: Slot::Tertiary,
                accent: Slot::Secondary,
            },
        }
    }
}

/// Raw query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeParams {
    pub p: Option<String>,
    pub s: Option<String>,
    pub t: Option<String>,
    pub b: Option<String>,
    pub mw: Option<String>,
}

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 ]").expect("valid regex"));

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Fa-f0-9]{3}){1,2}$").expect("valid regex"));

/// Strip everything outside `[A-Za-z0-9 ]` and prefix `#`.
///
/// The result is not guaranteed to be a valid hex colour: `<script>` becomes
/// `#script`. Spaces pass through untouched. Returns `None` when nothing
/// survives.
pub fn sanitize_color(raw: &str) -> Option<String> {
    let cleaned = DISALLOWED_RE.replace_all(raw, "");
    if cleaned.is_empty() {
        None
    } else {
        Some(format!("#{cleaned}"))
    }
}

/// Strict `#rgb` / `#rrggbb` check.
pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

fn resolve(param: Option<&str>, default: &str, name: &str) -> String {
    match param.and_then(sanitize_color) {
        Some(color) => {
            if !is_hex_color(&color) {
                tracing::debug!(param = name, color = %color, "Theme colour is not a hex value");
            }
            color
        }
        None => default.to_string(),
    }
}

/// Apply supplied colours over the theme defaults.
pub fn resolve_palette(theme: Theme, params: &ThemeParams) -> Palette {
    let defaults = theme.defaults();
    Palette {
        primary: resolve(params.p.as_deref(), &defaults.primary, "p"),
        secondary: resolve(params.s.as_deref(), &defaults.secondary, "s"),
        tertiary: resolve(params.t.as_deref(), &defaults.tertiary, "t"),
        button: resolve(params.b.as_deref(), &defaults.button, "b"),
    }
}

pub fn mobile_width(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_MOBILE_WIDTH)
}

/// Render the stylesheet for `theme`.
pub fn render(theme: Theme, params: &ThemeParams) -> String {
    let palette = resolve_palette(theme, params);
    let layout = theme.layout();
    let mw = mobile_width(params.mw.as_deref());

    let row = palette.get(layout.row_background);
    let heading = palette.get(layout.heading);
    let text_bg = palette.get(layout.text_background);
    let accent = palette.get(layout.accent);
    let button = &palette.button;
    let class = format!(".charitable-campaign-theme-{}", theme.slug());

    format!(
        "/* Charitable campaign theme: {slug} */\n\
{class} .charitable-campaign-row {{\n  background-color: {row};\n}}\n\
{class} h1,\n{class} h2,\n{class} h3,\n{class} h4,\n{class} h5 {{\n  color: {heading};\n}}\n\
{class} .charitable-campaign-title {{\n  color: {heading};\n}}\n\
{class} .charitable-campaign-field_text {{\n  background-color: {text_bg};\n}}\n\
{class} .charitable-campaign-progress-bar .progress {{\n  background-color: {text_bg};\n}}\n\
{class} .charitable-campaign-progress-bar .progress-bar {{\n  background-color: {accent};\n}}\n\
{class} .charitable-campaign-goal,\n{class} .charitable-campaign-donor-count,\n{class} .charitable-campaign-time-left {{\n  border-color: {accent};\n  color: {heading};\n}}\n\
{class} .charitable-campaign-social-link a {{\n  color: {accent};\n}}\n\
{class} .charitable-button,\n{class} .donate-button,\n{class} button[type=\"submit\"] {{\n  background-color: {button};\n  border-color: {button};\n  color: #ffffff;\n}}\n\
{class} .charitable-button:hover,\n{class} .donate-button:hover {{\n  opacity: 0.85;\n}}\n\
{class} .charitable-tab-nav li.active a {{\n  border-bottom-color: {button};\n  color: {heading};\n}}\n\
@media screen and (max-width: {mw}px) {{\n\
  {class} .charitable-campaign-row {{\n    display: block;\n    background-color: {row};\n  }}\n\
  {class} .charitable-campaign-column {{\n    width: 100%;\n  }}\n\
  {class} h1 {{\n    color: {heading};\n    font-size: 1.6em;\n  }}\n\
}}\n",
        slug = theme.slug(),
    )
}
