//! Shared HTML page shell used by every page-producing handler.

/// Version string reported in page headers and on the info page.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project link shown in the page header row.
const PROJECT_URL: &str = "https://github.com/MCF/oddjob";

/// Wrap `content` in the standard page layout.
///
/// Produces a complete HTML document: fixed head/style block, a title of the
/// form `OJ <title>`, a header row with the version and project link, then
/// the content fragments joined by newline. Pure function, no side effects.
pub fn page(content: &[String], title: &str) -> String {
    let mut lines: Vec<String> = vec![
        "<!DOCTYPE html>".to_string(),
        "<head>".to_string(),
        format!("  <title>OJ {}</title>", title),
        "  <style>".to_string(),
        "  body {font:100% arial,sans-serif; margin:1.5em 5em 4em 5em;}".to_string(),
        "  a {text-decoration:none; color:rgb(248,157,30)}".to_string(),
        "  a:hover {color:rgb(239,131,0);}".to_string(),
        "  .header {font-size:0.75em; float:right; margin-bottom: 2.0em;}".to_string(),
        "  .fineprint {font-size:0.85em;}".to_string(),
        "  li {margin-bottom:0.4em;}".to_string(),
        "  </style>".to_string(),
        "</head>".to_string(),
        "<html><body>".to_string(),
        "  <div class=\"header\">".to_string(),
        format!("    <em>v{}</em>", VERSION),
        format!("    <a href=\"{}\">OddJob on github</a>", PROJECT_URL),
        "  </div>".to_string(),
        "  <div style=\"clear:both;\"></div>".to_string(),
    ];

    lines.push(content.join("\n"));
    lines.push("</body></html>".to_string());
    lines.join("\n")
}

/// Escape text for safe inclusion in HTML content.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_and_content() {
        let html = page(&["<p>x</p>".to_string()], "T");

        assert!(html.contains("<title>OJ T</title>"));
        assert_eq!(html.matches("<p>x</p>").count(), 1);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_page_joins_fragments_with_newlines() {
        let fragments = vec!["<h2>A</h2>".to_string(), "<p>B</p>".to_string()];
        let html = page(&fragments, "Join");

        assert!(html.contains("<h2>A</h2>\n<p>B</p>"));
    }

    #[test]
    fn test_page_includes_version_header() {
        let html = page(&[String::new()], "Header");

        assert!(html.contains(&format!("<em>v{}</em>", VERSION)));
        assert!(html.contains("OddJob on github"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(html_escape("plain"), "plain");
    }
}
