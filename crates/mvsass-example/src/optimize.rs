//! CSS post-processing: media query merging, minification and beautifying.

use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;

/// CSS post-processing utilities.
pub struct CssPipeline;

impl CssPipeline {
    /// Merge identical media queries, then minify.
    pub fn optimize(css: &str) -> Result<String, String> {
        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let merged = combine_media_queries(&mut stylesheet)?;
        if merged > 0 {
            tracing::debug!("Merged {} duplicate media queries", merged);
        }

        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| format!("CSS minify error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS print error: {}", e))?;

        Ok(minified.code)
    }

    /// Merge identical media queries without minifying.
    pub fn combine_media_queries(css: &str) -> Result<String, String> {
        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        combine_media_queries(&mut stylesheet)?;

        let printed = stylesheet
            .to_css(PrinterOptions::default())
            .map_err(|e| format!("CSS print error: {}", e))?;

        Ok(printed.code)
    }

    /// Pretty-print CSS, indenting each level with `indent`.
    pub fn beautify(css: &str, indent: &str) -> Result<String, String> {
        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let printed = stylesheet
            .to_css(PrinterOptions::default())
            .map_err(|e| format!("CSS print error: {}", e))?;

        reindent(&printed.code, indent)
    }
}

/// Merge media rules with identical queries and move them after plain rules.
///
/// Queries keep the order in which they were first seen. Returns the number of
/// media rules folded into an earlier one.
fn combine_media_queries(stylesheet: &mut StyleSheet) -> Result<usize, String> {
    let rules = std::mem::take(&mut stylesheet.rules.0);

    let mut plain = Vec::with_capacity(rules.len());
    let mut media = Vec::new();
    let mut queries: Vec<String> = Vec::new();
    let mut merged = 0;

    for rule in rules {
        match rule {
            CssRule::Media(rule) => {
                let query = rule
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(|e| format!("CSS print error: {}", e))?;

                match queries.iter().position(|q| *q == query) {
                    Some(index) => {
                        if let Some(CssRule::Media(existing)) = media.get_mut(index) {
                            existing.rules.0.extend(rule.rules.0);
                        }
                        merged += 1;
                    }
                    None => {
                        queries.push(query);
                        media.push(CssRule::Media(rule));
                    }
                }
            }
            other => plain.push(other),
        }
    }

    plain.extend(media);
    stylesheet.rules.0 = plain;

    Ok(merged)
}

/// Replace two-space indentation with `indent` per level.
fn reindent(css: &str, indent: &str) -> Result<String, String> {
    if indent == "  " {
        return Ok(css.to_string());
    }

    let re = Regex::new(r"(?m)^((?:  )+)").map_err(|e| e.to_string())?;
    Ok(re
        .replace_all(css, |caps: &regex::Captures| indent.repeat(caps[1].len() / 2))
        .into_owned())
}
