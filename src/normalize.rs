//! Text normalization for comparing page text with search strings.
//!
//! Every scorer compares text after the same pipeline: tags stripped,
//! entities decoded, whitespace removed, decimal commas turned into dots.

use dom_query::Document;

use crate::patterns::HTML_TAG;

/// Limit on strip-and-decode rounds for text that is escaped several times over.
const MAX_DECODE_ROUNDS: usize = 4;

/// Remove anything that looks like an HTML tag. Entities are left encoded.
#[must_use]
pub fn remove_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Decode HTML entities (`&nbsp;`, `&amp;`, `&#8364;`, ...).
///
/// Decoding goes through the HTML parser, so only text containing `&` pays
/// for a parse. Callers strip tags first.
#[must_use]
pub fn replace_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let doc = Document::from(format!("<body>{text}</body>"));
    doc.select("body").text().to_string()
}

/// Remove every whitespace character, including non-breaking spaces.
#[must_use]
pub fn remove_spaces(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Turn `digit,digit` into `digit.digit`.
///
/// A comma not followed by a digit (`"8999,-"`) is left as is.
#[must_use]
pub fn convert_commas_in_numbers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let between_digits = c == ','
                && i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);
            if between_digits {
                '.'
            } else {
                c
            }
        })
        .collect()
}

/// Full normalization pipeline.
///
/// Tag stripping, entity decoding and whitespace removal repeat until the
/// text stops changing, so escaped markup (`&lt;b&gt;`) is stripped as well
/// and normalizing twice gives the same result.
///
/// # Example
///
/// ```rust
/// use rs_page_analyzer::normalize::normalize;
///
/// assert_eq!(normalize("<span>4&nbsp;299,23</span>"), "4299.23");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_DECODE_ROUNDS {
        let next = remove_spaces(&replace_html_entities(&remove_html_tags(&current)));
        if next == current {
            break;
        }
        current = next;
    }
    convert_commas_in_numbers(&current)
}

/// Normalize for searching: the pipeline above, lowercased when requested.
#[must_use]
pub fn normalize_for_search(text: &str, case_insensitive: bool) -> String {
    let normalized = normalize(text);
    if case_insensitive {
        normalized.to_lowercase()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_html_tags() {
        let base = r#"<div class="colValue" contenteditable="false"><span class="bigPrice price_withVat">4&nbsp;299,-</span></div>"#;
        assert_eq!(remove_html_tags(base), "4&nbsp;299,-");
    }

    #[test]
    fn removes_unterminated_tag() {
        assert_eq!(remove_html_tags("price <b"), "price ");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(replace_html_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(replace_html_entities("4&nbsp;299"), "4\u{a0}299");
        assert_eq!(replace_html_entities("no entities"), "no entities");
    }

    #[test]
    fn removes_spaces() {
        let base = "a b   c\n        d\n        e";
        assert_eq!(remove_spaces(base), "abcde");
    }

    #[test]
    fn converts_commas_in_numbers() {
        let base = "abcd 8999,1 efgh 8999.2 ijkl 8999,";
        assert_eq!(convert_commas_in_numbers(base), "abcd 8999.1 efgh 8999.2 ijkl 8999,");
    }

    #[test]
    fn converts_chained_commas_in_one_pass() {
        assert_eq!(convert_commas_in_numbers("1,2,3"), "1.2.3");
    }

    #[test]
    fn normalizes_string() {
        let base = r#"<div class="colValue" contenteditable="false">
        <span class="bigPrice price_withVat">4&nbsp;299,-</span>
</div>"#;
        assert_eq!(normalize(base), "4299,-");
    }

    #[test]
    fn normalizes_number() {
        let base = r#"<div class="colValue" contenteditable="false">
        <span class="bigPrice price_withVat">4&nbsp;299,23</span>
</div>"#;
        assert_eq!(normalize(base), "4299.23");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "<p>Blade Runner 2049</p>",
            "4&nbsp;299,23 Kč",
            "1,2,3 and 4,5",
            "  multi\tline\ntext  ",
            "Tom &amp; Jerry",
            "a &lt;b&gt; c",
            "&amp;lt;",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn escaped_markup_is_stripped() {
        assert_eq!(normalize("a &lt;b&gt; c"), "ac");
        assert_eq!(normalize("Price: &lt;b&gt;8,50&lt;/b&gt;"), "Price:8.50");
    }

    #[test]
    fn search_normalization_lowercases_on_request() {
        assert_eq!(normalize_for_search("Blade Runner", true), "bladerunner");
        assert_eq!(normalize_for_search("Blade Runner", false), "BladeRunner");
    }
}
