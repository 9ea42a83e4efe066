//! HTTP fetch and HTML parsing for statute pages.
//!
//! The state code site serves a dynamic shell at the canonical section URL;
//! the real content lives on a versioned page whose name is embedded in the
//! shell. Only the versioned page's structured content region is ever parsed;
//! the shell itself is never a content source. The municipal code site
//! serves static pages whose content region is parsed directly.

use regex::Regex;
use reqwest::StatusCode;

use super::ResolveError;
use crate::config::StatuteConfig;
use crate::models::{Citation, Jurisdiction};

/// Content-region container classes/ids seen across both code sites.
const CONTENT_MARKERS: &[&str] = &[
    "sectiontext",
    "statute-content",
    "code-content",
    "ordinance-text",
    "codified-content",
];

/// A fetched candidate: extracted plain text plus the URL it came from.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub text: String,
    pub title: String,
    pub url: String,
}

/// Split a normalized key into (title, chapter, section).
pub fn split_key(citation: &Citation) -> Result<(String, String, String), ResolveError> {
    let mut parts = citation.normalized_key.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(t), Some(c), Some(s)) if !t.is_empty() && !c.is_empty() && !s.is_empty() => {
            Ok((t.to_string(), c.to_string(), s.to_string()))
        }
        _ => Err(ResolveError::Unsupported(format!(
            "malformed citation key '{}'",
            citation.normalized_key
        ))),
    }
}

/// Canonical page URL for a citation.
pub fn primary_url(config: &StatuteConfig, citation: &Citation) -> Result<String, ResolveError> {
    let (title, chapter, section) = split_key(citation)?;
    Ok(match citation.jurisdiction {
        Jurisdiction::Utah => format!(
            "{}/Title{}/Chapter{}/{}-{}-S{}.html",
            config.utah_base_url, title, chapter, title, chapter, section
        ),
        Jurisdiction::WestValley => {
            format!("{}/{}.html", config.wvc_base_url, citation.normalized_key)
        }
    })
}

/// Fetch one page, mapping HTTP status to the resolver taxonomy.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, ResolveError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ResolveError::Network(e.to_string()))?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(ResolveError::NotFound),
        StatusCode::TOO_MANY_REQUESTS => Err(ResolveError::RateLimited),
        status if !status.is_success() => Err(ResolveError::Network(format!(
            "unexpected status {status} from {url}"
        ))),
        _ => response
            .text()
            .await
            .map_err(|e| ResolveError::Network(e.to_string())),
    }
}

/// Extract the current-version token a dynamic shell embeds for a section,
/// e.g. a link to `76-5-S102_2024051320240513.html` yields that suffix.
pub fn extract_version_token(html: &str, citation: &Citation) -> Option<String> {
    let (title, chapter, section) = split_key(citation).ok()?;
    let pattern = Regex::new(&format!(
        r"(?i){}-{}-S{}_(\d{{6,}})\.html",
        regex::escape(&title),
        regex::escape(&chapter),
        regex::escape(&section),
    ))
    .unwrap();
    pattern
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Versioned content-page URL for a shell's version token.
pub fn versioned_url(
    config: &StatuteConfig,
    citation: &Citation,
    version: &str,
) -> Result<String, ResolveError> {
    let (title, chapter, section) = split_key(citation)?;
    Ok(format!(
        "{}/Title{}/Chapter{}/{}-{}-S{}_{}.html",
        config.utah_base_url, title, chapter, title, chapter, section, version
    ))
}

/// Extract the structured content region from a page, as plain text.
/// Returns `None` when no known content container is present.
pub fn extract_content_region(html: &str) -> Option<String> {
    for marker in CONTENT_MARKERS {
        for tag in ["div", "section", "article"] {
            let pattern = Regex::new(&format!(
                r#"(?is)<{tag}[^>]*(?:class|id)\s*=\s*"[^"]*{marker}[^"]*"[^>]*>(.*?)</{tag}>"#
            ))
            .unwrap();
            if let Some(caps) = pattern.captures(html) {
                let text = strip_tags(&caps[1]);
                if !text.trim().is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Reduce HTML to plain text: drop script/style, unwrap tags, decode the
/// handful of entities these sites actually emit.
pub fn strip_tags(html: &str) -> String {
    let no_scripts = Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>")
        .unwrap()
        .replace_all(html, " ");
    let no_tags = Regex::new(r"(?s)<[^>]+>")
        .unwrap()
        .replace_all(&no_scripts, " ");

    let decoded = no_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whole-page text with obvious navigation chrome removed. Last-resort input
/// for the browser fallback; the result still has to pass validation.
pub fn strip_navigation_chrome(text: &str) -> String {
    let nav_line = Regex::new(
        r"(?i)^(home|menu|search|login|sign in|print|share|contact us|about us|accessibility)\s*$",
    )
    .unwrap();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !nav_line.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Best-effort section title: the first reasonably short line mentioning the
/// section number, else a generic fallback.
pub fn extract_title(text: &str, citation: &Citation) -> String {
    let section_tail = citation
        .normalized_key
        .rsplit('-')
        .next()
        .unwrap_or_default();
    text.lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && line.chars().count() <= 120
                && (line.contains(&citation.normalized_key) || line.contains(section_tail))
        })
        .map(str::to_string)
        .unwrap_or_else(|| format!("Section {}", citation.normalized_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utah_citation(key: &str) -> Citation {
        Citation {
            raw: key.into(),
            normalized_key: key.into(),
            jurisdiction: Jurisdiction::Utah,
        }
    }

    #[test]
    fn primary_url_encodes_title_chapter_section() {
        let config = StatuteConfig::default();
        let url = primary_url(&config, &utah_citation("58-37-8")).unwrap();
        assert_eq!(
            url,
            "https://le.utah.gov/xcode/Title58/Chapter37/58-37-S8.html"
        );
    }

    #[test]
    fn malformed_key_is_unsupported() {
        let config = StatuteConfig::default();
        let err = primary_url(&config, &utah_citation("58-37")).unwrap_err();
        assert!(matches!(err, ResolveError::Unsupported(_)));
    }

    #[test]
    fn version_token_is_pulled_from_shell_markup() {
        let shell = r#"<html><body>
            <script>loadSection("/xcode/Title58/Chapter37/58-37-S8_2024051320240513.html");</script>
        </body></html>"#;
        let token = extract_version_token(shell, &utah_citation("58-37-8")).unwrap();
        assert_eq!(token, "2024051320240513");
    }

    #[test]
    fn no_version_token_in_static_page() {
        let html = "<html><body><div class=\"sectiontext\">(1) text</div></body></html>";
        assert!(extract_version_token(html, &utah_citation("58-37-8")).is_none());
    }

    #[test]
    fn content_region_is_extracted_and_tag_stripped() {
        let html = r#"<html><nav>Skip to Content</nav>
            <div class="sectiontext"><p>(1) A person commits assault if&nbsp;the person:</p>
            <p>(a) attempts to do bodily injury;</p></div></html>"#;
        let text = extract_content_region(html).unwrap();
        assert!(text.contains("(1) A person commits assault"));
        assert!(text.contains("(a) attempts"));
        // Navigation outside the content region must not leak in.
        assert!(!text.contains("Skip to Content"));
    }

    #[test]
    fn missing_content_region_yields_none() {
        let html = "<html><body><div class=\"header\">Utah Code</div></body></html>";
        assert!(extract_content_region(html).is_none());
    }

    #[test]
    fn strip_tags_decodes_entities() {
        let html = "<p>Smith &amp; Jones &quot;et al.&quot;</p>";
        assert_eq!(strip_tags(html), "Smith & Jones \"et al.\"");
    }

    #[test]
    fn strip_tags_drops_scripts_entirely() {
        let html = "<p>kept</p><script>var dropped = 1;</script><p>also kept</p>";
        let text = strip_tags(html);
        assert!(text.contains("kept"));
        assert!(!text.contains("dropped"));
    }

    #[test]
    fn navigation_chrome_lines_are_removed() {
        let text = "Home\nMenu\n(1) A person commits assault...\nPrint\nContact Us";
        let stripped = strip_navigation_chrome(text);
        assert_eq!(stripped, "(1) A person commits assault...");
    }

    #[test]
    fn title_prefers_line_naming_the_section() {
        let text = "Utah Code\n76-5-102. Assault -- Penalties.\n(1) A person commits assault...";
        let title = extract_title(text, &utah_citation("76-5-102"));
        assert_eq!(title, "76-5-102. Assault -- Penalties.");
    }

    #[test]
    fn title_falls_back_to_generic() {
        let text = "completely unrelated text\nwith no useful heading";
        let title = extract_title(text, &utah_citation("76-5-999"));
        assert_eq!(title, "Section 76-5-999");
    }
}
