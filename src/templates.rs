//! Signature templates – one generic renderer driven by [`LayoutDescriptor`].
//!
//! Output is a self-contained, table-based fragment with inline styles only,
//! the lowest common denominator every mail composer accepts. All
//! interpolated values are HTML-escaped; empty fields render as empty text,
//! never as a placeholder.

use crate::fields::SignatureFields;
use crate::variants::{descriptor, Arrangement, LayoutDescriptor};

const FONT: &str = "'Montserrat', Arial, sans-serif";
const TABLE: &str = r#"role="presentation" cellspacing="0" cellpadding="0" border="0""#;
const IMG_RESET: &str = "border: 0; outline: none; text-decoration: none;";
const ICON_SIZE: u32 = 24;
const ICON_CELL: u32 = 40;

/// Final `src` values for every image a template may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    pub portrait: String,
    pub logo: String,
    pub facebook_icon: String,
    pub youtube_icon: String,
    pub linkedin_icon: String,
    /// Alt text for the logo image.
    pub logo_alt: String,
}

/// Render the fragment for `fields.variant`.
pub fn render(fields: &SignatureFields, assets: &ResolvedAssets) -> String {
    render_layout(descriptor(fields.variant), fields, assets)
}

/// Render a fragment for an explicit layout descriptor.
pub fn render_layout(
    layout: &LayoutDescriptor,
    fields: &SignatureFields,
    assets: &ResolvedAssets,
) -> String {
    let parts = Parts {
        layout,
        fields,
        assets,
    };
    match layout.arrangement {
        Arrangement::TwoColumn => parts.two_column(),
        Arrangement::Quadrant => parts.quadrant(),
        Arrangement::CenteredVertical => parts.centered_vertical(),
        Arrangement::Horizontal => parts.horizontal(),
    }
}

/// Wrap a fragment in a minimal standalone document.
///
/// The conditional comment gives Outlook's Word renderer collapsed table
/// borders and zero cell padding.
pub fn document(fragment: &str, title: &str, body_background: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <meta http-equiv="X-UA-Compatible" content="IE=edge">
  <title>{title}</title>
  <!--[if mso]>
  <style type="text/css">
    table {{border-collapse:collapse;border-spacing:0;margin:0;}}
    div, td {{padding:0;}}
    div {{margin:0 !important;}}
  </style>
  <![endif]-->
</head>
<body style="margin: 0; padding: 0; background-color: {body_background};">
{fragment}
</body>
</html>"#,
        title = escape(title),
    )
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape text for use in element content and double- or single-quoted
/// attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

impl Align {
    fn css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
        }
    }
}

struct Parts<'a> {
    layout: &'a LayoutDescriptor,
    fields: &'a SignatureFields,
    assets: &'a ResolvedAssets,
}

impl Parts<'_> {
    /// Outer container shared by every arrangement.
    fn container(&self, inner: &str) -> String {
        format!(
            r#"<table {TABLE} width="{w}" style="{bg} padding: 4px 3px; margin: 0 auto;">
  <tr>
    <td>
{inner}
    </td>
  </tr>
</table>"#,
            w = self.layout.width,
            bg = self.layout.palette.page.css(),
        )
    }

    fn two_column(&self) -> String {
        let l = self.layout;
        let p = &l.palette;
        let mut row = String::new();

        if l.show_portrait() || l.show_logo() {
            let col = l.portrait_size.max(l.logo_width);
            let mut visuals = String::new();
            if l.show_portrait() {
                visuals.push_str(&format!(
                    "<tr><td style=\"padding: 0;\">{}</td></tr>\n",
                    self.portrait()
                ));
            }
            if l.show_logo() {
                visuals.push_str(&format!(
                    "<tr><td style=\"padding: 0;\">{}</td></tr>\n",
                    self.logo()
                ));
            }
            row.push_str(&format!(
                r#"<td valign="top" width="{col}" style="width: {col}px; padding: 0; vertical-align: top;">
<table {TABLE} width="100%">
{visuals}</table>
</td>
"#
            ));
        }

        let mut right = format!(
            r#"<tr>
<td style="{bg} padding: 20px;">
<table {TABLE} width="100%">
{contact}</table>
</td>
</tr>
"#,
            bg = p.contact.css(),
            contact = self.contact_rows(Align::Left, 40),
        );
        if l.show_social_row() {
            right.push_str(&format!(
                "<tr>\n<td style=\"{bg} padding: 0;\">\n{strip}\n</td>\n</tr>\n",
                bg = p.social.css(),
                strip = self.social_strip(Align::Left),
            ));
        }
        row.push_str(&format!(
            r#"<td valign="top" style="{bg} padding: 0; vertical-align: top;">
<table {TABLE} width="100%">
{right}</table>
</td>
"#,
            bg = p.social.css(),
        ));

        self.container(&format!(
            r#"<table {TABLE} width="100%" style="{bg}">
<tr>
{row}</tr>
</table>"#,
            bg = p.card.css(),
        ))
    }

    fn quadrant(&self) -> String {
        let l = self.layout;
        let p = &l.palette;
        let col = l.portrait_size.max(l.logo_width);

        let portrait = if l.show_portrait() {
            self.portrait()
        } else {
            "&nbsp;".to_string()
        };
        let logo = if l.show_logo() {
            self.logo()
        } else {
            "&nbsp;".to_string()
        };

        let mut links = String::new();
        if l.show_linkedin_line {
            links.push_str(&format!(
                "<tr><td style=\"padding: 0 0 8px 0;\">{}</td></tr>\n",
                self.linkedin_line(Align::Left)
            ));
        }
        if l.show_social_row() {
            links.push_str(&format!(
                "<tr><td style=\"padding: 0;\">{}</td></tr>\n",
                self.social_strip(Align::Left)
            ));
        }

        self.container(&format!(
            r#"<table {TABLE} width="100%">
<tr>
<td valign="top" width="{col}" style="width: {col}px; {card} padding: 0; vertical-align: top;">{portrait}</td>
<td valign="middle" style="{contact} padding: 20px; vertical-align: middle;">
<table {TABLE} width="100%">
{name}{title}</table>
</td>
</tr>
<tr>
<td valign="middle" width="{col}" align="center" style="width: {col}px; {card} padding: 8px 0; text-align: center; vertical-align: middle;">{logo}</td>
<td valign="middle" style="{social} padding: 8px 20px; vertical-align: middle;">
<table {TABLE} width="100%">
{links}</table>
</td>
</tr>
</table>"#,
            card = p.card.css(),
            contact = p.contact.css(),
            social = p.social.css(),
            name = self.name_row(Align::Left),
            title = self.title_row(Align::Left),
        ))
    }

    fn centered_vertical(&self) -> String {
        let l = self.layout;
        let p = &l.palette;
        let mut rows = String::new();

        if l.show_portrait() {
            rows.push_str(&format!(
                "<tr><td align=\"center\" style=\"padding: 0 0 12px 0; text-align: center;\">{}</td></tr>\n",
                self.centered(&self.portrait())
            ));
        }
        rows.push_str(&self.contact_rows(Align::Center, 12));
        if l.show_logo() {
            rows.push_str(&format!(
                "<tr><td align=\"center\" style=\"padding: 12px 0 0 0; text-align: center;\">{}</td></tr>\n",
                self.centered(&self.logo())
            ));
        }
        if l.show_social_row() {
            rows.push_str(&format!(
                "<tr><td align=\"center\" style=\"{bg} padding: 12px 0 0 0; text-align: center;\">{strip}</td></tr>\n",
                bg = p.social.css(),
                strip = self.social_strip(Align::Center),
            ));
        }

        self.container(&format!(
            r#"<table {TABLE} width="100%" style="{bg}">
<tr>
<td align="center" style="padding: 20px; text-align: center;">
<table {TABLE} width="100%">
{rows}</table>
</td>
</tr>
</table>"#,
            bg = p.contact.css(),
        ))
    }

    fn horizontal(&self) -> String {
        let l = self.layout;
        let p = &l.palette;
        let col = l.portrait_size.max(l.logo_width);

        let mut visuals = String::new();
        if l.show_portrait() {
            visuals.push_str(&format!(
                "<tr><td style=\"padding: 0;\">{}</td></tr>\n",
                self.portrait()
            ));
        }
        if l.show_logo() {
            let pad = if l.show_portrait() { "8px 0 0 0" } else { "0" };
            visuals.push_str(&format!(
                "<tr><td style=\"padding: {pad};\">{}</td></tr>\n",
                self.logo()
            ));
        }

        let mut contact = self.contact_rows(Align::Left, 12);
        if l.show_social_row() {
            contact.push_str(&format!(
                "<tr><td style=\"{bg} padding: 8px 0 0 0;\">{strip}</td></tr>\n",
                bg = p.social.css(),
                strip = self.social_strip(Align::Left),
            ));
        }

        self.container(&format!(
            r#"<table {TABLE} width="100%" style="{card}">
<tr>
<td valign="middle" width="{col}" style="width: {col}px; padding: 16px 20px 16px 0; vertical-align: middle;">
<table {TABLE}>
{visuals}</table>
</td>
<td width="1" style="width: 1px; background-color: {divider}; font-size: 1px; line-height: 1px;">&nbsp;</td>
<td valign="middle" style="{contact_bg} padding: 16px 0 16px 20px; vertical-align: middle;">
<table {TABLE} width="100%">
{contact}</table>
</td>
</tr>
</table>"#,
            card = p.card.css(),
            divider = p.divider,
            contact_bg = p.contact.css(),
        ))
    }

    // -- shared rows --------------------------------------------------------

    /// Name, title, spacer and (when enabled) the LinkedIn line.
    fn contact_rows(&self, align: Align, spacer: u32) -> String {
        let mut rows = self.name_row(align);
        rows.push_str(&self.title_row(align));
        if self.layout.show_linkedin_line {
            rows.push_str(&format!(
                "<tr><td style=\"padding: 0; height: {spacer}px; line-height: 4px; font-size: 4px;\">&nbsp;</td></tr>\n"
            ));
            rows.push_str(&format!(
                "<tr><td style=\"padding: 0; text-align: {a};\">{line}</td></tr>\n",
                a = align.css(),
                line = self.linkedin_line(align),
            ));
        }
        rows
    }

    fn name_row(&self, align: Align) -> String {
        format!(
            "<tr><td style=\"padding: 0 0 4px 0; text-align: {a};\"><p style=\"margin: 0; padding: 0; font-family: {FONT}; font-size: 20px; font-weight: 600; line-height: 28px; color: {c};\">{name}</p></td></tr>\n",
            a = align.css(),
            c = self.layout.palette.name,
            name = escape(&self.fields.name),
        )
    }

    fn title_row(&self, align: Align) -> String {
        format!(
            "<tr><td style=\"padding: 0; text-align: {a};\"><p style=\"margin: 0; padding: 0; font-family: {FONT}; font-size: 15px; font-weight: 400; line-height: 24px; color: {c};\">{title}</p></td></tr>\n",
            a = align.css(),
            c = self.layout.palette.title,
            title = escape(&self.fields.title),
        )
    }

    fn linkedin_line(&self, align: Align) -> String {
        let text = format!(
            "<span style=\"font-family: {FONT}; font-size: 15px; font-weight: 600; line-height: 24px; color: {c};\">{t}</span>",
            c = self.layout.palette.link,
            t = escape(&self.fields.linkedin_text),
        );
        anchor(
            &self.fields.linkedin_url,
            &format!(
                "display: block; text-decoration: none; color: {c}; text-align: {a}; line-height: 24px;",
                c = self.layout.palette.link,
                a = align.css(),
            ),
            &text,
        )
    }

    fn portrait(&self) -> String {
        let size = self.layout.portrait_size;
        if self.assets.portrait.is_empty() {
            return format!(
                "<div style=\"width: {size}px; height: {size}px; line-height: {size}px; font-size: 1px; {bg}\">&nbsp;</div>",
                bg = self.layout.palette.card.css(),
            );
        }
        format!(
            "<img src=\"{src}\" alt=\"{alt}\" width=\"{size}\" height=\"{size}\" style=\"display: block; width: {size}px; height: {size}px; object-fit: cover; {IMG_RESET}\" />",
            src = escape(&self.assets.portrait),
            alt = escape(&self.fields.name),
        )
    }

    fn logo(&self) -> String {
        let (w, h) = (self.layout.logo_width, self.layout.logo_height);
        if self.assets.logo.is_empty() {
            return "&nbsp;".to_string();
        }
        format!(
            "<img src=\"{src}\" alt=\"{alt}\" width=\"{w}\" height=\"{h}\" style=\"display: block; width: {w}px; height: {h}px; {IMG_RESET}\" />",
            src = escape(&self.assets.logo),
            alt = escape(&self.assets.logo_alt),
        )
    }

    /// Centre a block-level image inside its cell.
    fn centered(&self, inner: &str) -> String {
        format!("<table {TABLE} align=\"center\" style=\"margin: 0 auto;\"><tr><td>{inner}</td></tr></table>")
    }

    /// Social icons (Facebook, YouTube, LinkedIn) and the website link.
    fn social_strip(&self, align: Align) -> String {
        let l = self.layout;
        let f = self.fields;
        let spacer = "<td style=\"padding: 0; width: 14px; font-size: 14px; line-height: 14px;\">&nbsp;</td>\n";
        let mut cells = String::new();

        if l.show_social_icons {
            let icons = [
                (&f.facebook_url, &self.assets.facebook_icon, "Facebook"),
                (&f.youtube_url, &self.assets.youtube_icon, "YouTube"),
                (&f.linkedin_social_url, &self.assets.linkedin_icon, "LinkedIn"),
            ];
            for (i, (href, icon, label)) in icons.into_iter().enumerate() {
                if i > 0 {
                    cells.push_str(spacer);
                }
                cells.push_str(&social_icon(href, icon, label));
            }
            if l.show_website {
                cells.push_str(spacer);
            }
        }

        if l.show_website {
            let link = anchor_blank(
                &f.website_url,
                &format!(
                    "display: inline-block; text-decoration: underline; color: {c}; font-family: {FONT}; font-size: 15px; font-weight: 600; line-height: 24px;",
                    c = l.palette.website,
                ),
                &escape(&f.website_text),
            );
            cells.push_str(&format!(
                "<td style=\"padding: 0 8px; height: {ICON_CELL}px; text-align: {a}; vertical-align: middle;\">{link}</td>\n",
                a = align.css(),
            ));
        }

        let table_align = match align {
            Align::Center => " align=\"center\"",
            Align::Left => "",
        };
        format!("<table {TABLE}{table_align} style=\"margin: 0;\">\n<tr>\n{cells}</tr>\n</table>")
    }
}

fn social_icon(href: &str, icon: &str, label: &str) -> String {
    let img = if icon.is_empty() {
        escape(label)
    } else {
        format!(
            "<img src=\"{src}\" alt=\"{label}\" width=\"{ICON_SIZE}\" height=\"{ICON_SIZE}\" style=\"display: block; width: {ICON_SIZE}px; height: {ICON_SIZE}px; {IMG_RESET}\" />",
            src = escape(icon),
        )
    };
    format!(
        "<td style=\"padding: 0; width: {ICON_CELL}px; height: {ICON_CELL}px; text-align: center; vertical-align: middle;\">{}</td>\n",
        anchor_blank(href, "display: inline-block; text-decoration: none;", &img)
    )
}

/// `<a>` around `inner`, or a `<span>` when there is nowhere to link to.
fn anchor(href: &str, style: &str, inner: &str) -> String {
    if href.is_empty() {
        format!("<span style=\"{style}\">{inner}</span>")
    } else {
        format!("<a href=\"{}\" style=\"{style}\">{inner}</a>", escape(href))
    }
}

/// Like [`anchor`] but opens in a new tab.
fn anchor_blank(href: &str, style: &str, inner: &str) -> String {
    if href.is_empty() {
        format!("<span style=\"{style}\">{inner}</span>")
    } else {
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" style=\"{style}\">{inner}</a>",
            escape(href)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Variant;

    fn assets() -> ResolvedAssets {
        ResolvedAssets {
            portrait: "https://cdn.example.com/me.png".into(),
            logo: "https://cdn.example.com/logo.svg".into(),
            facebook_icon: "https://cdn.example.com/fb.svg".into(),
            youtube_icon: "https://cdn.example.com/yt.svg".into(),
            linkedin_icon: "https://cdn.example.com/li.svg".into(),
            logo_alt: "Acme logo".into(),
        }
    }

    fn full_fields() -> SignatureFields {
        SignatureFields {
            name: "Jane Roe".into(),
            title: "VP of Engineering".into(),
            linkedin_url: "https://www.linkedin.com/in/janeroe".into(),
            linkedin_text: "Jane on LinkedIn".into(),
            website_url: "https://example.com".into(),
            website_text: "example.com".into(),
            facebook_url: "https://www.facebook.com/acme".into(),
            youtube_url: "https://www.youtube.com/@acme".into(),
            linkedin_social_url: "https://www.linkedin.com/company/acme".into(),
            ..SignatureFields::default()
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a & "b" 'c'>"#), "&lt;a &amp; &quot;b&quot; &#39;c&#39;&gt;");
    }

    #[test]
    fn classic_matches_the_reference_layout() {
        let html = render(&full_fields(), &assets());
        assert!(html.starts_with("<table role=\"presentation\""));
        assert!(html.contains("width=\"600\""));
        assert!(html.contains("background-color: #fbfbfb;"));
        assert!(html.contains("background-color: #cbcbcb;"));
        assert!(html.contains("color: #101828;\">Jane Roe</p>"));
        assert!(html.contains("alt=\"Jane Roe\" width=\"160\" height=\"160\""));
        assert!(html.contains("href=\"https://www.linkedin.com/company/acme\" target=\"_blank\""));
    }

    #[test]
    fn simple_variants_omit_linkedin_and_icons() {
        for variant in [Variant::HorizontalSimple, Variant::VerticalSimple] {
            let fields = full_fields().with_variant(variant);
            let html = render(&fields, &assets());
            assert!(!html.contains("Jane on LinkedIn"), "{variant}");
            assert!(!html.contains("fb.svg"), "{variant}");
            assert!(html.contains("example.com</a>"), "{variant}");
        }
    }

    #[test]
    fn horizontal_logo_shows_large_logo_without_portrait() {
        let fields = full_fields().with_variant(Variant::HorizontalLogo);
        let html = render(&fields, &assets());
        assert!(html.contains("alt=\"Acme logo\" width=\"200\" height=\"50\""));
        assert!(!html.contains("me.png"));
        assert!(!html.contains("yt.svg"));
    }

    #[test]
    fn empty_links_render_as_spans() {
        let fields = SignatureFields::new("Jane Roe", "CTO");
        let html = render(&fields, &assets());
        assert!(!html.contains("href=\"\""));
        assert!(html.contains("<span style=\"display: inline-block; text-decoration: none;\"><img"));
    }

    #[test]
    fn empty_portrait_renders_a_placeholder_cell() {
        let mut a = assets();
        a.portrait.clear();
        let html = render(&full_fields(), &a);
        assert!(!html.contains("src=\"\""));
        assert!(html.contains("width: 160px; height: 160px; line-height: 160px;"));
    }

    #[test]
    fn hostile_names_are_escaped() {
        let fields = SignatureFields::new("<script>alert(1)</script>", "A \"quoted\" title");
        let html = render(&fields, &assets());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &quot;quoted&quot; title"));
    }

    #[test]
    fn document_wraps_fragment_once() {
        let doc = document("<table></table>", "Email Signature", "#fbfbfb");
        assert_eq!(doc.matches("<!DOCTYPE html>").count(), 1);
        assert!(doc.contains("<meta charset=\"UTF-8\">"));
        assert!(doc.contains("<!--[if mso]>"));
        assert!(doc.contains("background-color: #fbfbfb;\">\n<table></table>\n</body>"));
    }
}
