//! Layout descriptors – one row per [`Variant`].
//!
//! A descriptor says everything that differs between layouts: colours,
//! background treatment, how the blocks are arranged and which optional
//! rows appear. [`crate::templates`] turns a descriptor plus field values
//! into markup; it never branches on the variant itself.

use crate::fields::Variant;

/// Brand colours shared by the palettes below.
pub mod brand {
    pub const BLUE: &str = "#0072DA";
    pub const TURQUOISE: &str = "#64CCC9";
    pub const YELLOW: &str = "#F2EDA8";
    pub const BLACK: &str = "#231F20";
    pub const WHITE: &str = "#FFFFFF";
    pub const LIGHT_GREY: &str = "#E6E7E8";
    pub const BLUE_LIGHT: &str = "#e6f2ff";

    /// Multi-stop brand gradient, blue through turquoise to yellow.
    pub const GRADIENT_DEFAULT: &str =
        "linear-gradient(163deg, #006BE5 6.89%, #7AD0CB 51.29%, #E0EEB5 86.54%, #FAF6AF 105.16%, #FFF 181.75%)";
    /// Blue-dominant variant of the brand gradient.
    pub const GRADIENT_BLUE: &str =
        "linear-gradient(300deg, #FAF6AF -91.29%, #7AD0CB -15.73%, #006BE5 75.91%)";
}

/// How a panel is filled.
///
/// Gradients always carry a flat fallback colour: Outlook's Word engine
/// ignores `background-image`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Flat(&'static str),
    Gradient {
        css: &'static str,
        fallback: &'static str,
    },
}

impl Background {
    /// Inline CSS declarations for this background.
    pub fn css(&self) -> String {
        match self {
            Background::Flat(color) => format!("background-color: {color};"),
            Background::Gradient { css, fallback } => {
                format!("background-color: {fallback}; background-image: {css};")
            }
        }
    }

    /// The flat colour a client without gradient support will paint.
    pub fn base_color(&self) -> &'static str {
        match self {
            Background::Flat(color) => *color,
            Background::Gradient { fallback, .. } => *fallback,
        }
    }
}

/// Colour tokens for one layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Outer container and document body.
    pub page: Background,
    /// Panel behind the portrait/logo column.
    pub card: Background,
    /// Panel behind the name/title block.
    pub contact: Background,
    /// Strip behind the social icons and website link.
    pub social: Background,
    pub name: &'static str,
    pub title: &'static str,
    pub link: &'static str,
    pub website: &'static str,
    /// Thin rule used by the horizontal layouts.
    pub divider: &'static str,
}

/// How the portrait, logo and contact blocks are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// Portrait + logo on the left, contact block and social strip on the right.
    TwoColumn,
    /// Two-by-two grid: portrait | name+title over logo | links.
    Quadrant,
    /// Everything stacked and centred.
    CenteredVertical,
    /// Large left visual, vertical divider, contact block on the right.
    Horizontal,
}

/// Everything that distinguishes one layout from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub variant: Variant,
    pub arrangement: Arrangement,
    pub palette: Palette,
    /// Outer table width in px (400–600).
    pub width: u32,
    /// Square portrait edge in px; 0 hides the portrait.
    pub portrait_size: u32,
    /// Logo box in px; a zero width hides the logo.
    pub logo_width: u32,
    pub logo_height: u32,
    pub show_linkedin_line: bool,
    pub show_social_icons: bool,
    pub show_website: bool,
}

impl LayoutDescriptor {
    pub fn show_portrait(&self) -> bool {
        self.portrait_size > 0
    }

    pub fn show_logo(&self) -> bool {
        self.logo_width > 0 && self.logo_height > 0
    }

    /// Does the layout have a social strip at all?
    pub fn show_social_row(&self) -> bool {
        self.show_social_icons || self.show_website
    }
}

const CLASSIC_PALETTE: Palette = Palette {
    page: Background::Flat("#fbfbfb"),
    card: Background::Flat("#ffffff"),
    contact: Background::Flat("#fbfbfb"),
    social: Background::Flat("#cbcbcb"),
    name: "#101828",
    title: "#000000",
    link: "#6b7280",
    website: "#000000",
    divider: "#cbcbcb",
};

const DARK_PALETTE: Palette = Palette {
    page: Background::Flat(brand::BLACK),
    card: Background::Flat(brand::BLACK),
    contact: Background::Flat("#2d2a2b"),
    social: Background::Flat("#3a3637"),
    name: brand::WHITE,
    title: brand::LIGHT_GREY,
    link: brand::TURQUOISE,
    website: brand::WHITE,
    divider: "#3a3637",
};

const GRADIENT_PALETTE: Palette = Palette {
    page: Background::Flat(brand::WHITE),
    card: Background::Flat(brand::WHITE),
    contact: Background::Gradient {
        css: brand::GRADIENT_DEFAULT,
        fallback: "#7AD0CB",
    },
    social: Background::Flat(brand::YELLOW),
    name: brand::WHITE,
    title: brand::WHITE,
    link: brand::BLACK,
    website: brand::BLACK,
    divider: brand::TURQUOISE,
};

const GRADIENT_BLUE_PALETTE: Palette = Palette {
    page: Background::Flat(brand::WHITE),
    card: Background::Flat(brand::WHITE),
    contact: Background::Gradient {
        css: brand::GRADIENT_BLUE,
        fallback: "#006BE5",
    },
    social: Background::Flat(brand::BLUE_LIGHT),
    name: brand::WHITE,
    title: brand::WHITE,
    link: brand::YELLOW,
    website: brand::BLUE,
    divider: brand::BLUE,
};

const LIGHT_PALETTE: Palette = Palette {
    page: Background::Flat(brand::WHITE),
    card: Background::Flat(brand::WHITE),
    contact: Background::Flat(brand::WHITE),
    social: Background::Flat(brand::WHITE),
    name: brand::BLACK,
    title: "#4b5563",
    link: brand::BLUE,
    website: brand::BLUE,
    divider: brand::LIGHT_GREY,
};

const QUADRANT_PALETTE: Palette = Palette {
    page: Background::Flat(brand::LIGHT_GREY),
    card: Background::Flat(brand::BLUE),
    contact: Background::Flat(brand::WHITE),
    social: Background::Flat(brand::TURQUOISE),
    name: brand::BLACK,
    title: brand::BLUE,
    link: brand::BLACK,
    website: brand::BLACK,
    divider: brand::LIGHT_GREY,
};

static LAYOUTS: [LayoutDescriptor; 9] = [
    LayoutDescriptor {
        variant: Variant::Classic,
        arrangement: Arrangement::TwoColumn,
        palette: CLASSIC_PALETTE,
        width: 600,
        portrait_size: 160,
        logo_width: 160,
        logo_height: 40,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::Dark,
        arrangement: Arrangement::TwoColumn,
        palette: DARK_PALETTE,
        width: 600,
        portrait_size: 160,
        logo_width: 160,
        logo_height: 40,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::Gradient,
        arrangement: Arrangement::TwoColumn,
        palette: GRADIENT_PALETTE,
        width: 600,
        portrait_size: 160,
        logo_width: 160,
        logo_height: 40,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::Vertical,
        arrangement: Arrangement::CenteredVertical,
        palette: LIGHT_PALETTE,
        width: 400,
        portrait_size: 120,
        logo_width: 140,
        logo_height: 35,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::Quadrant,
        arrangement: Arrangement::Quadrant,
        palette: QUADRANT_PALETTE,
        width: 560,
        portrait_size: 140,
        logo_width: 140,
        logo_height: 35,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::HorizontalLogo,
        arrangement: Arrangement::Horizontal,
        palette: LIGHT_PALETTE,
        width: 600,
        portrait_size: 0,
        logo_width: 200,
        logo_height: 50,
        show_linkedin_line: true,
        show_social_icons: false,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::GradientBlue,
        arrangement: Arrangement::TwoColumn,
        palette: GRADIENT_BLUE_PALETTE,
        width: 600,
        portrait_size: 160,
        logo_width: 160,
        logo_height: 40,
        show_linkedin_line: true,
        show_social_icons: true,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::HorizontalSimple,
        arrangement: Arrangement::Horizontal,
        palette: LIGHT_PALETTE,
        width: 500,
        portrait_size: 100,
        logo_width: 0,
        logo_height: 0,
        show_linkedin_line: false,
        show_social_icons: false,
        show_website: true,
    },
    LayoutDescriptor {
        variant: Variant::VerticalSimple,
        arrangement: Arrangement::CenteredVertical,
        palette: LIGHT_PALETTE,
        width: 400,
        portrait_size: 100,
        logo_width: 120,
        logo_height: 30,
        show_linkedin_line: false,
        show_social_icons: false,
        show_website: true,
    },
];

/// Descriptor for `variant`.
pub fn descriptor(variant: Variant) -> &'static LayoutDescriptor {
    LAYOUTS
        .iter()
        .find(|d| d.variant == variant)
        .unwrap_or(&LAYOUTS[0])
}
