//! Brand file (`brand.yml`) and the stylesheet generated from it

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::errors::{LimsError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(default)]
    pub color: BrandColors,
    #[serde(default)]
    pub typography: Typography,
    #[serde(default)]
    pub defaults: BrandDefaults,
    /// Image shown in the navbar; a URL or a path under `/assets`
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandColors {
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
    #[serde(default = "default_foreground")]
    pub foreground: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default)]
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    #[serde(default)]
    pub base: FontSpec,
    #[serde(default = "default_headings")]
    pub headings: FontSpec,
    #[serde(default)]
    pub link: LinkSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_weight", deserialize_with = "css_value")]
    pub weight: String,
    #[serde(default = "default_size", deserialize_with = "css_value")]
    pub size: String,
    #[serde(rename = "line-height", default = "default_line_height", deserialize_with = "css_value")]
    pub line_height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    #[serde(default = "default_link_weight", deserialize_with = "css_value")]
    pub weight: String,
    #[serde(default = "default_link_decoration")]
    pub decoration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandDefaults {
    #[serde(default)]
    pub bootstrap: BootstrapDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BootstrapDefaults {
    /// Extra CSS appended verbatim
    #[serde(default)]
    pub rules: String,
}

/// YAML numbers and strings both become CSS text
fn css_value<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(i) => i.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Text(s) => s,
    })
}

fn default_foreground() -> String {
    "#091A3E".to_string()
}

fn default_background() -> String {
    "#F7FDFF".to_string()
}

fn default_primary() -> String {
    "#1C4FB9".to_string()
}

fn default_family() -> String {
    "Hanken Grotesk, sans-serif".to_string()
}

fn default_weight() -> String {
    "400".to_string()
}

fn default_size() -> String {
    "16px".to_string()
}

fn default_line_height() -> String {
    "1.5".to_string()
}

fn default_link_weight() -> String {
    "600".to_string()
}

fn default_link_decoration() -> String {
    "underline".to_string()
}

fn default_headings() -> FontSpec {
    FontSpec {
        weight: "600".to_string(),
        ..FontSpec::default()
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: default_family(),
            weight: default_weight(),
            size: default_size(),
            line_height: default_line_height(),
        }
    }
}

impl Default for LinkSpec {
    fn default() -> Self {
        Self {
            weight: default_link_weight(),
            decoration: default_link_decoration(),
        }
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            base: FontSpec::default(),
            headings: default_headings(),
            link: LinkSpec::default(),
        }
    }
}

impl Default for BrandColors {
    fn default() -> Self {
        let palette = [
            ("black", "#091A3E"),
            ("white", "#F7FDFF"),
            ("air", "#D7F4FF"),
            ("water", "#1C4FB9"),
            ("earth", "#59CD88"),
            ("light_water", "#C7D9FF"),
            ("dark_food", "#FF5447"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            palette,
            foreground: default_foreground(),
            background: default_background(),
            primary: default_primary(),
            secondary: None,
        }
    }
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            color: BrandColors::default(),
            typography: Typography::default(),
            defaults: BrandDefaults::default(),
            logo: None,
        }
    }
}

impl Brand {
    /// Parse a brand document and resolve palette references
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut brand: Brand = serde_yaml::from_str(text)
            .map_err(|e| LimsError::serialization(format!("Invalid brand file: {}", e)))?;
        brand.resolve_palette();
        Ok(brand)
    }

    /// Load the brand file, falling back to the built-in brand
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = std::fs::read_to_string(path)
            .map_err(LimsError::from)
            .and_then(|text| Self::from_yaml(&text));

        match loaded {
            Ok(brand) => {
                debug!("Brand loaded from {}", path.display());
                brand
            }
            Err(e) => {
                warn!("Error loading brand config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Replace color names that refer to palette keys with their values
    pub fn resolve_palette(&mut self) {
        let palette = &self.color.palette;
        let resolve = |value: &mut String| {
            if let Some(hex) = palette.get(value.as_str()) {
                *value = hex.clone();
            }
        };
        resolve(&mut self.color.foreground);
        resolve(&mut self.color.background);
        resolve(&mut self.color.primary);
        if let Some(secondary) = self.color.secondary.as_mut() {
            resolve(secondary);
        }
    }

    fn palette_or(&self, key: &str, fallback: &str) -> String {
        self.color
            .palette
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Stylesheet served as `/assets/brand.css`
    pub fn generate_css(&self) -> String {
        let c = &self.color;
        let t = &self.typography;
        let air = self.palette_or("air", &c.background);
        let dark_air = self.palette_or("dark_air", &air);
        let light_water = self.palette_or("light_water", &air);
        let air_rgb = hex_to_rgb(&air).unwrap_or_else(|| "215, 244, 255".to_string());

        format!(
            r#"/* Base styles */
body {{
    font-family: '{base_family}';
    font-weight: {base_weight};
    font-size: {base_size};
    line-height: {base_line_height};
    color: {fg};
    background-color: {bg};
}}

h1, h2, h3, h4, h5, h6 {{
    font-family: '{head_family}';
    font-weight: {head_weight};
    color: {primary};
    margin-bottom: 1.5rem;
}}

a {{
    color: {primary};
    font-weight: {link_weight};
    text-decoration: {link_decoration};
}}

.navbar {{
    background-color: {dark_air};
}}

.navbar .nav-link {{
    color: {fg};
}}

.navbar .nav-link:hover,
.navbar .nav-link.active {{
    color: {primary};
    border-bottom-color: {primary};
}}

.btn-primary,
.btn-success {{
    background-color: {primary};
    border-color: {primary};
}}

.btn-primary:hover,
.btn-success:hover {{
    background-color: {primary};
    filter: brightness(1.1);
}}

table.data-table thead th {{
    background-color: {air};
    color: {fg};
    border-bottom-color: {primary};
}}

table.data-table tbody tr:nth-child(even) {{
    background-color: rgba({air_rgb}, 0.3);
}}

table.data-table tbody tr:hover {{
    background-color: {light_water};
    transition: background-color 0.2s ease;
}}

.card {{
    border-color: {light_water};
}}

.card-header {{
    background-color: {air};
    color: {fg};
}}

{rules}
"#,
            base_family = t.base.family,
            base_weight = t.base.weight,
            base_size = t.base.size,
            base_line_height = t.base.line_height,
            fg = c.foreground,
            bg = c.background,
            head_family = t.headings.family,
            head_weight = t.headings.weight,
            primary = c.primary,
            link_weight = t.link.weight,
            link_decoration = t.link.decoration,
            dark_air = dark_air,
            air = air,
            air_rgb = air_rgb,
            light_water = light_water,
            rules = self.defaults.bootstrap.rules,
        )
    }
}

/// `#RRGGBB` (an alpha suffix is ignored) to `r, g, b`
pub fn hex_to_rgb(hex: &str) -> Option<String> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() < 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(format!(
        "{}, {}, {}",
        channel(0..2)?,
        channel(2..4)?,
        channel(4..6)?
    ))
}
