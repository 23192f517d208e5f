use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static SVG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("svg").expect("valid selector"));

/// Drop every `<svg>` that wraps an `<image>` pointing at one of `cover_names`.
///
/// Calibre emits such a wrapper for the generated cover page. Input without a match is
/// returned unchanged.
pub fn remove_cover_svg(html: &str, cover_names: &[String]) -> String {
    if cover_names.is_empty() || !html.contains("<svg") {
        return html.to_string();
    }

    let mut fragment = Html::parse_fragment(html);
    let doomed: Vec<_> = fragment
        .select(&SVG)
        .filter(|svg| wraps_cover_image(svg, cover_names))
        .map(|svg| svg.id())
        .collect();

    if doomed.is_empty() {
        return html.to_string();
    }

    for id in doomed {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }

    fragment.root_element().inner_html()
}

fn wraps_cover_image(svg: &ElementRef<'_>, cover_names: &[String]) -> bool {
    svg.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "image")
        .any(|image| {
            image
                .value()
                .attrs()
                .filter(|(name, _)| *name == "href" || name.ends_with(":href"))
                .any(|(_, target)| is_cover_target(target, cover_names))
        })
}

fn is_cover_target(target: &str, cover_names: &[String]) -> bool {
    let file_name = target.rsplit('/').next().unwrap_or(target);
    cover_names.iter().any(|name| name == file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["cover_image.jpg".to_string(), "cover_image.png".to_string()]
    }

    #[test]
    fn removes_cover_wrapper() {
        let html = r#"<div><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="cover_image.jpg"></image></svg><p>Chapter One</p></div>"#;
        let cleaned = remove_cover_svg(html, &names());
        assert!(!cleaned.contains("<svg"));
        assert!(cleaned.contains("Chapter One"));
    }

    #[test]
    fn keeps_unrelated_svg() {
        let html = r#"<p>Figure</p><svg><image href="diagram.png"></image></svg>"#;
        assert_eq!(remove_cover_svg(html, &names()), html);
    }

    #[test]
    fn matches_cover_in_subdirectory() {
        let html = r#"<svg><image href="../images/cover_image.png"></image></svg><p>Text</p>"#;
        let cleaned = remove_cover_svg(html, &names());
        assert!(!cleaned.contains("svg"));
        assert!(cleaned.contains("<p>Text</p>"));
    }

    #[test]
    fn no_svg_is_untouched() {
        let html = "<p>Plain &amp; simple</p>";
        assert_eq!(remove_cover_svg(html, &names()), html);
    }
}
