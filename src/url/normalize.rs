use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
    "source",
];

/// Normalizes an already-parsed site URL
///
/// # Normalization Steps
///
/// 1. Normalize path:
///    - Remove empty and `.` segments, resolve `..`
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 2. Remove fragment (everything after #)
/// 3. Remove tracking query parameters
/// 4. Sort remaining query parameters alphabetically
/// 5. Remove empty query string (trailing ?)
///
/// Scheme and host are left untouched; the classifier decides whether they
/// belong to the target site.
///
/// # Examples
///
/// ```
/// use tomato_harvest::url::normalize_url;
/// use url::Url;
///
/// let url = Url::parse("https://www.rottentomatoes.com/a//b/?utm_source=x#top").unwrap();
/// assert_eq!(normalize_url(&url).as_str(), "https://www.rottentomatoes.com/a/b");
/// ```
pub fn normalize_url(url: &Url) -> Url {
    let mut url = url.clone();

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let filtered_params = filter_and_sort_query_params(&url);

        if filtered_params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(filtered_params.iter());
        }
    }

    url
}

/// Splits a path into its normalized, non-empty segments
pub fn path_segments(path: &str) -> Vec<String> {
    normalize_path(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes a URL path by removing dot segments and trailing slashes
pub(crate) fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", normalized_segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
