//! Public page renderer.
//!
//! Turns a [`ContentDocument`] into the static HTML of the public page. When
//! the document carries a non-empty `blocks` list the page is assembled from
//! those blocks in order; otherwise the fixed hero, packages and gallery
//! sections are rendered.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::constants::{APP_NAME, HOME_GALLERY_LIMIT};
use crate::models::{Block, ContentDocument, GalleryItem, Hero, LayoutBlock, Package};

// ============================================================================
// Escaping
// ============================================================================

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Escapes HTML special characters for text and attribute values.
///
/// # Examples
///
/// ```
/// use lodge::render::escape;
///
/// assert_eq!(escape("<b>\"Lodge\"</b>"), "&lt;b&gt;&quot;Lodge&quot;&lt;/b&gt;");
/// assert_eq!(escape("plain"), "plain");
/// ```
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

// ============================================================================
// Sections
// ============================================================================

fn render_hero(out: &mut String, hero: &Hero) {
    let _ = writeln!(out, r#"<section class="hero">"#);
    if let Some(bg) = hero.bg_image.as_deref().filter(|bg| !bg.is_empty()) {
        let _ = writeln!(
            out,
            r#"  <div class="bg-layer" style="background-image: url(&quot;{}&quot;)"></div>"#,
            escape(bg)
        );
    }
    let _ = writeln!(out, "  <h1>{}</h1>", escape(&hero.title));
    let _ = writeln!(out, "  <p>{}</p>", escape(&hero.subtitle));
    for (class, cta) in [
        ("btn-primary", &hero.cta_primary),
        ("btn-secondary", &hero.cta_secondary),
    ] {
        let _ = writeln!(
            out,
            r#"  <a class="btn {class}" href="{}">{}</a>"#,
            escape(&cta.href),
            escape(&cta.label)
        );
    }
    let _ = writeln!(out, "</section>");
}

fn render_package(out: &mut String, package: &Package) {
    let class = if package.featured {
        "pkg-card featured"
    } else {
        "pkg-card"
    };
    let _ = writeln!(out, r#"    <div class="{class}">"#);
    if !package.badge.is_empty() {
        let _ = writeln!(out, r#"      <div class="pkg-badge">{}</div>"#, escape(&package.badge));
    }
    let _ = writeln!(out, r#"      <div class="pkg-name">{}</div>"#, escape(&package.name));
    let _ = writeln!(out, r#"      <div class="pkg-price">{}</div>"#, escape(&package.price));
    let _ = writeln!(out, r#"      <div class="pkg-detail">{}</div>"#, escape(&package.detail));
    if !package.features.is_empty() {
        let _ = writeln!(out, r#"      <ul class="pkg-features">"#);
        for feature in &package.features {
            let _ = writeln!(out, "        <li>{}</li>", escape(feature));
        }
        let _ = writeln!(out, "      </ul>");
    }
    let _ = writeln!(out, "    </div>");
}

fn render_packages(out: &mut String, packages: &[Package]) {
    let _ = writeln!(out, r#"<section id="packages">"#);
    let _ = writeln!(out, r#"  <div class="pkg-grid">"#);
    for package in packages {
        render_package(out, package);
    }
    let _ = writeln!(out, "  </div>");
    let _ = writeln!(out, "</section>");
}

fn render_image(out: &mut String, indent: &str, src: &str, alt: &str) {
    let src = escape(src);
    let _ = writeln!(
        out,
        r#"{indent}<a class="g-item" href="{src}" target="_blank" rel="noopener"><img src="{src}" alt="{}" loading="lazy"></a>"#,
        escape(alt)
    );
}

fn render_gallery(out: &mut String, items: &[GalleryItem], limit: usize) {
    let _ = writeln!(out, r#"<section id="work">"#);
    let _ = writeln!(out, r#"  <div class="gallery-grid">"#);
    for item in items.iter().take(limit) {
        render_image(out, "    ", &item.src, &item.alt);
    }
    let _ = writeln!(out, "  </div>");
    let _ = writeln!(out, "</section>");
}

fn render_block(out: &mut String, doc: &ContentDocument, block: &LayoutBlock) {
    match block {
        LayoutBlock::Hero => render_hero(out, &doc.hero),
        LayoutBlock::Packages => render_packages(out, &doc.packages),
        LayoutBlock::Gallery { limit } => render_gallery(
            out,
            &doc.gallery.items,
            limit.unwrap_or(doc.gallery.items.len()),
        ),
        LayoutBlock::Text { title, body } => {
            let _ = writeln!(out, r#"<section class="text-block">"#);
            if let Some(title) = title.as_deref().filter(|t| !t.is_empty()) {
                let _ = writeln!(out, "  <h2>{}</h2>", escape(title));
            }
            let _ = writeln!(out, "  <p>{}</p>", escape(body));
            let _ = writeln!(out, "</section>");
        }
        LayoutBlock::Image { src, alt } => {
            let _ = writeln!(out, r#"<section class="image-block">"#);
            render_image(out, "  ", src, alt);
            let _ = writeln!(out, "</section>");
        }
    }
}

/// Renders the body sections of the page.
#[must_use]
pub fn render_sections(doc: &ContentDocument) -> String {
    let mut out = String::new();
    match doc.layout_blocks() {
        Some(blocks) => {
            for block in blocks {
                if let Block::Known(block) = block {
                    render_block(&mut out, doc, block);
                }
            }
        }
        None => {
            render_hero(&mut out, &doc.hero);
            render_packages(&mut out, &doc.packages);
            render_gallery(&mut out, &doc.gallery.items, HOME_GALLERY_LIMIT);
        }
    }
    out
}

/// Renders a complete HTML page.
#[must_use]
pub fn render_page(doc: &ContentDocument) -> String {
    let brand = if doc.brand.name.trim().is_empty() {
        APP_NAME.to_uppercase()
    } else {
        doc.brand.name.clone()
    };
    let brand = escape(&brand);

    let mut out = String::new();
    let _ = writeln!(out, "<!doctype html>");
    let _ = writeln!(out, r#"<html lang="en">"#);
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, r#"<meta charset="utf-8">"#);
    let _ = writeln!(out, "<title>{brand}</title>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, r#"<nav><div class="nav-center">{brand}</div></nav>"#);
    out.push_str(&render_sections(doc));
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}
