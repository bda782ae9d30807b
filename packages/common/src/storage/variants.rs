//! URL variants served by the image host.
//!
//! The host treats a comma-separated token list placed right after `/upload/`
//! as live transformation directives, so variants are pure string rewrites of
//! the stored asset's URL.

const UPLOAD_MARKER: &str = "/upload/";

/// WebP, quality 80, at most 1920 px wide.
pub const WEB_TRANSFORM: &str = "f_webp,q_80,w_1920,c_limit";

/// WebP, quality 70, at most 300 px wide.
pub const THUMBNAIL_TRANSFORM: &str = "f_webp,q_70,w_300,c_limit";

/// Insert `transform` as a path segment after the first `/upload/` of `base_url`.
///
/// URLs without the marker are returned unchanged.
pub fn derive_variant_url(base_url: &str, transform: &str) -> String {
    match base_url.find(UPLOAD_MARKER) {
        Some(idx) => {
            let split = idx + UPLOAD_MARKER.len();
            format!("{}{}/{}", &base_url[..split], transform, &base_url[split..])
        }
        None => base_url.to_string(),
    }
}

pub fn web_url(base_url: &str) -> String {
    derive_variant_url(base_url, WEB_TRANSFORM)
}

pub fn thumbnail_url(base_url: &str) -> String {
    derive_variant_url(base_url, THUMBNAIL_TRANSFORM)
}
