use url::Url;

/// Normalize a user-entered URL. Returns `None` for blank input.
pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Resolve a reference returned by the server against its base URL.
///
/// Absolute references are returned unchanged, relative ones (`/t1.jpg`)
/// are joined onto `base`.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url, url::ParseError> {
    match Url::parse(reference) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(reference),
        Err(e) => Err(e),
    }
}
