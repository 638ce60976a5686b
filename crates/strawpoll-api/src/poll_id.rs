use url::Url;

/// Public site hosting the polls, as opposed to the API host.
pub const SITE_URL: &str = "https://strawpoll.com";

const SITE_HOSTS: [&str; 2] = ["strawpoll.com", "www.strawpoll.com"];

/// Extract a poll ID from a share URL, or pass the input through.
///
/// Accepts `https://strawpoll.com/<id>`, `strawpoll.com/polls/<id>` and
/// similar. Anything that is not a recognisable site URL is returned
/// trimmed but otherwise unchanged, so this never fails.
pub fn resolve_poll_id(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    let raw = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };

    let Ok(url) = Url::parse(&raw) else {
        return input.to_string();
    };

    let on_site = url
        .host_str()
        .map(|host| SITE_HOSTS.contains(&host.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if !on_site {
        return input.to_string();
    }

    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| input.to_string())
}

/// Shareable link for a poll.
pub fn poll_url(id: &str) -> String {
    format!("{SITE_URL}/{id}")
}
