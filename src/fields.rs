//! Signature fields – the snapshot a caller hands to the renderer.
//!
//! The snapshot is serialised with the same camelCase keys the UI persists
//! in its settings store, so a saved blob can be loaded straight into
//! [`SignatureFields::from_json`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One of the nine fixed signature layouts.
///
/// Unknown tags never fail: they collapse to [`Variant::Classic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Variant {
    #[default]
    Classic,
    Dark,
    Gradient,
    Vertical,
    Quadrant,
    HorizontalLogo,
    GradientBlue,
    HorizontalSimple,
    VerticalSimple,
}

impl Variant {
    /// Every variant, in the order the UI lists them.
    pub const ALL: [Variant; 9] = [
        Variant::Classic,
        Variant::Dark,
        Variant::Gradient,
        Variant::Vertical,
        Variant::Quadrant,
        Variant::HorizontalLogo,
        Variant::GradientBlue,
        Variant::HorizontalSimple,
        Variant::VerticalSimple,
    ];

    /// Parse a variant tag. Matching ignores ASCII case and surrounding
    /// whitespace; anything unrecognised yields `Classic`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "classic" => Variant::Classic,
            "dark" => Variant::Dark,
            "gradient" => Variant::Gradient,
            "vertical" => Variant::Vertical,
            "quadrant" => Variant::Quadrant,
            "horizontal-logo" => Variant::HorizontalLogo,
            "gradient-blue" => Variant::GradientBlue,
            "horizontal-simple" => Variant::HorizontalSimple,
            "vertical-simple" => Variant::VerticalSimple,
            other => {
                if !other.is_empty() {
                    log::debug!("unknown variant tag {other:?}, using classic");
                }
                Variant::Classic
            }
        }
    }

    /// The kebab-case tag used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Dark => "dark",
            Variant::Gradient => "gradient",
            Variant::Vertical => "vertical",
            Variant::Quadrant => "quadrant",
            Variant::HorizontalLogo => "horizontal-logo",
            Variant::GradientBlue => "gradient-blue",
            Variant::HorizontalSimple => "horizontal-simple",
            Variant::VerticalSimple => "vertical-simple",
        }
    }

    /// Human-readable name, e.g. `horizontal-logo` → `Horizontal Logo`.
    pub fn display_name(self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The two "simple" layouts drop the LinkedIn line and the social row.
    pub fn is_simple(self) -> bool {
        matches!(self, Variant::HorizontalSimple | Variant::VerticalSimple)
    }
}

impl From<String> for Variant {
    fn from(tag: String) -> Self {
        Variant::from_tag(&tag)
    }
}

impl From<&str> for Variant {
    fn from(tag: &str) -> Self {
        Variant::from_tag(tag)
    }
}

impl From<Variant> for String {
    fn from(variant: Variant) -> Self {
        variant.as_str().to_string()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact data rendered into a signature.
///
/// Every field is a plain `String`; absent keys and JSON `null` both
/// deserialise to the empty string, so nothing downstream ever has to deal
/// with a missing value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureFields {
    #[serde(deserialize_with = "empty_if_null")]
    pub name: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub title: String,
    #[serde(rename = "linkedInUrl", deserialize_with = "empty_if_null")]
    pub linkedin_url: String,
    #[serde(rename = "linkedInText", deserialize_with = "empty_if_null")]
    pub linkedin_text: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub website_url: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub website_text: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub facebook_url: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub youtube_url: String,
    #[serde(rename = "linkedInSocialUrl", deserialize_with = "empty_if_null")]
    pub linkedin_social_url: String,
    /// Portrait reference: empty, relative path, absolute URL or data URI.
    #[serde(deserialize_with = "empty_if_null")]
    pub image_url: String,
    /// Qualifies relative asset paths; a trailing slash is ignored.
    #[serde(deserialize_with = "empty_if_null")]
    pub base_url: String,
    #[serde(deserialize_with = "classic_if_null")]
    pub variant: Variant,
}

fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn classic_if_null<'de, D>(deserializer: D) -> Result<Variant, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Variant::from)
        .unwrap_or_default())
}

impl SignatureFields {
    /// Minimal snapshot with just the two required display strings.
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Builder-style variant selection.
    pub fn with_variant(mut self, variant: impl Into<Variant>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Overlay organisation-owned links onto this snapshot.
    ///
    /// Only non-empty overlay values replace the snapshot's own.
    pub fn with_organization(mut self, links: &OrganizationLinks) -> Self {
        let overlay = [
            (&mut self.website_url, &links.website_url),
            (&mut self.website_text, &links.website_text),
            (&mut self.facebook_url, &links.facebook_url),
            (&mut self.youtube_url, &links.youtube_url),
            (&mut self.linkedin_social_url, &links.linkedin_social_url),
        ];
        for (field, value) in overlay {
            if !value.is_empty() {
                *field = value.clone();
            }
        }
        self
    }

    /// Replace `linkedin_text` with "<first name> on LinkedIn" when a name
    /// is present.
    pub fn with_derived_linkedin_text(mut self) -> Self {
        if let Some(text) = Self::linkedin_text_for(&self.name) {
            self.linkedin_text = text;
        }
        self
    }

    /// "<first name> on LinkedIn", or `None` for a blank name.
    pub fn linkedin_text_for(name: &str) -> Option<String> {
        name.split_whitespace()
            .next()
            .map(|first| format!("{first} on LinkedIn"))
    }

    /// Load a persisted snapshot.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Serialise for the settings store.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Organisation-frozen social links a caller may force onto every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationLinks {
    pub website_url: String,
    pub website_text: String,
    pub facebook_url: String,
    pub youtube_url: String,
    #[serde(rename = "linkedInSocialUrl")]
    pub linkedin_social_url: String,
}
