use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

pub const DEFAULT_THEME: &str = "InspiredGitHub";

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEMES: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);
static FALLBACK_THEME: Lazy<Theme> = Lazy::new(Theme::default);

/// One colored run of a highlighted code line. `color` is `0xRRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    pub text: String,
    pub color: u32,
    pub bold: bool,
    pub italic: bool,
}

pub type HighlightedLine = Vec<HighlightSpan>;

fn theme(name: &str) -> &'static Theme {
    THEMES
        .themes
        .get(name)
        .or_else(|| THEMES.themes.get(DEFAULT_THEME))
        .unwrap_or(&*FALLBACK_THEME)
}

/// Picks a syntax from a fence info string such as `rust` or `py`.
fn syntax_for(language: Option<&str>) -> &'static SyntaxReference {
    language
        .and_then(|lang| lang.split_whitespace().next())
        .filter(|token| !token.is_empty())
        .and_then(|token| SYNTAXES.find_syntax_by_token(token))
        .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text())
}

/// Highlights `code` line by line. Lines come back without their trailing newline.
pub fn highlight_code(code: &str, language: Option<&str>, theme_name: &str) -> Vec<HighlightedLine> {
    let syntax = syntax_for(language);
    let mut highlighter = HighlightLines::new(syntax, theme(theme_name));
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(code) {
        let spans = match highlighter.highlight_line(line, &SYNTAXES) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| HighlightSpan {
                    text: text.trim_end_matches(['\n', '\r']).to_string(),
                    color: u32::from(style.foreground.r) << 16
                        | u32::from(style.foreground.g) << 8
                        | u32::from(style.foreground.b),
                    bold: style.font_style.contains(FontStyle::BOLD),
                    italic: style.font_style.contains(FontStyle::ITALIC),
                })
                .filter(|span| !span.text.is_empty())
                .collect(),
            Err(err) => {
                tracing::debug!(%err, "highlighting failed, using plain line");
                vec![HighlightSpan {
                    text: line.trim_end_matches(['\n', '\r']).to_string(),
                    color: 0x24292e,
                    bold: false,
                    italic: false,
                }]
            }
        };
        lines.push(spans);
    }
    lines
}

/// Self-contained `<pre>` markup with inline colors for an exported code block.
pub fn highlight_html(code: &str, language: Option<&str>, theme_name: &str) -> Option<String> {
    highlighted_html_for_string(code, &SYNTAXES, syntax_for(language), theme(theme_name))
        .map_err(|err| tracing::debug!(%err, "html highlighting failed"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &HighlightedLine) -> String {
        line.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn keeps_text_and_line_structure() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        let lines = highlight_code(code, Some("rust"), DEFAULT_THEME);
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "fn main() {");
        assert_eq!(line_text(&lines[1]), "    println!(\"hi\");");
        assert_eq!(line_text(&lines[2]), "}");
    }

    #[test]
    fn known_language_gets_several_colors() {
        let lines = highlight_code("let x = 42; // answer\n", Some("rust"), DEFAULT_THEME);
        let mut colors: Vec<u32> = lines[0].iter().map(|s| s.color).collect();
        colors.dedup();
        assert!(colors.len() > 1);
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let lines = highlight_code("whatever here\n", Some("no-such-lang"), DEFAULT_THEME);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "whatever here");
    }

    #[test]
    fn unknown_theme_uses_default() {
        let lines = highlight_code("x\n", None, "Nope");
        assert_eq!(line_text(&lines[0]), "x");
    }

    #[test]
    fn html_output_is_a_pre_block() {
        let html = highlight_html("print(1)\n", Some("python"), DEFAULT_THEME).unwrap();
        assert!(html.starts_with("<pre"));
        assert!(html.contains("print"));
    }
}
