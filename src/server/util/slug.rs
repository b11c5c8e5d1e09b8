/// Derives a URL slug from a tenant name.
///
/// Lowercases, turns every run of non-alphanumeric characters into a single `-` and
/// trims dashes from both ends. Names with no usable characters become `tenant`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "tenant".to_string()
    } else {
        slug
    }
}

/// Appends a numeric suffix for the `attempt`-th collision: `acme`, `acme-2`, `acme-3`...
pub fn with_suffix(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}
