use once_cell::sync::Lazy;
use regex_lite::Regex;

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());

/// Reduce an HTML body to plain text.
///
/// Drops script and style blocks wholesale, strips the remaining tags,
/// decodes the five common entities and collapses all whitespace runs to a
/// single space. Lossy on purpose: the output feeds a prompt, not a
/// renderer.
pub fn extract_text(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, " ");
    let without_styles = STYLE_RE.replace_all(&without_scripts, " ");
    let without_tags = TAG_RE.replace_all(&without_styles, " ");

    // `&amp;` last, otherwise `&amp;lt;` would decode twice.
    let decoded = without_tags
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<h1>Glossary</h1>\n  <p>A <b>term</b> is\n\n a word.</p>";
        assert_eq!(extract_text(html), "Glossary A term is a word.");
    }

    #[test]
    fn drops_script_and_style_blocks_entirely() {
        let html = concat!(
            "<style type=\"text/css\">p { color: red; }</style>",
            "<p>kept</p>",
            "<script>\nconsole.log('dropped');\n</script>",
            "<p>also kept</p>",
        );
        assert_eq!(extract_text(html), "kept also kept");
    }

    #[test]
    fn decodes_the_common_entities() {
        let html = "<p>a &lt;b&gt; &quot;c&quot; &#39;d&#39; &amp; e</p>";
        assert_eq!(extract_text(html), "a <b> \"c\" 'd' & e");
    }

    #[test]
    fn double_encoded_ampersands_decode_once() {
        assert_eq!(extract_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn empty_and_tag_only_input_yield_empty_text() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<div><br/></div>"), "");
    }
}
