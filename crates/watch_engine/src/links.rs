use scraper::ElementRef;
use url::Url;

/// First anchor under `element` (the element itself included), in document order,
/// whose `href` resolves to an absolute URL against `base`.
pub(crate) fn first_link_under(element: ElementRef<'_>, base: &Url) -> Option<Url> {
    element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name().eq_ignore_ascii_case("a"))
        .filter_map(|el| el.value().attr("href"))
        .find_map(|href| resolve_url(href, base))
}

pub(crate) fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.join(trimmed).ok()
}
