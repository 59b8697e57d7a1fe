//! Absolute URLs for image paths stored by the backend.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn resolve(&self, path: Option<&str>) -> String {
        resolve_image_url(&self.base_url, path)
    }

    /// Like [`ImageResolver::resolve`] but `None` where the result would be empty.
    pub fn preview(&self, path: Option<&str>) -> Option<String> {
        Some(self.resolve(path)).filter(|url| !url.is_empty())
    }
}

pub fn resolve_image_url(base_url: &str, path: Option<&str>) -> String {
    let Some(path) = path.filter(|path| !path.is_empty()) else {
        return String::new();
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    if path.starts_with("/images") {
        return format!("{}{path}", base_url.trim_end_matches('/'));
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_pass_through() {
        let resolver = ImageResolver::new("http://api.local");
        assert_eq!(
            resolver.resolve(Some("https://a/b.png")),
            "https://a/b.png"
        );
        assert_eq!(resolver.resolve(Some("http://a/b.png")), "http://a/b.png");
    }

    #[test]
    fn missing_path_resolves_empty() {
        let resolver = ImageResolver::new("http://api.local");
        assert_eq!(resolver.resolve(None), "");
        assert_eq!(resolver.resolve(Some("")), "");
        assert_eq!(resolver.preview(None), None);
    }

    #[test]
    fn image_paths_get_base_prefix() {
        let resolver = ImageResolver::new("http://api.local:5005/");
        assert_eq!(
            resolver.resolve(Some("/images/x.png")),
            "http://api.local:5005/images/x.png"
        );
    }

    #[test]
    fn other_relative_forms_are_untouched() {
        assert_eq!(
            resolve_image_url("http://api.local", Some("/skin.png")),
            "/skin.png"
        );
    }
}
