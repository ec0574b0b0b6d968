/// Scheme, host and path only; query and fragment are dropped.
pub fn url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) if parsed.has_host() => format!(
            "{}://{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or(""),
            parsed.path()
        ),
        Ok(parsed) => format!("{}:{}", parsed.scheme(), parsed.path()),
        Err(_) => raw.to_string(),
    }
}

pub fn title(raw: &str, max_chars: usize) -> String {
    if raw.chars().count() > max_chars {
        let mut trimmed: String = raw.chars().take(max_chars).collect();
        trimmed.push('…');
        trimmed
    } else {
        raw.to_string()
    }
}
