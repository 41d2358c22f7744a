// stylepipe-core/src/engines/prefix_engine.rs
//! A `StylesheetStage` that adds vendor prefixes for the configured browsers
//! and, when asked, builds a source map for the printed CSS.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use log::debug;
use parcel_sourcemap::SourceMap;

use crate::engine::{StageInput, StageOutput, StylesheetStage};
use crate::errors::PipelineError;

/// How the prefixer prints and whether it records a map.
#[derive(Debug, Clone, Default)]
pub struct PrefixOptions {
    pub minify: bool,
    pub source_maps: bool,
    /// Embed the source text in the map's `sourcesContent`.
    pub include_content: bool,
    /// The input is preprocessor output rather than the file at `source_path`.
    /// Mappings then point into that intermediate CSS, so the map names it
    /// `<source_id>.css` instead of claiming the original source.
    pub preprocessed: bool,
}

impl PrefixOptions {
    /// Name recorded in the map's `sources` for `source_id`.
    pub fn map_source_name(&self, source_id: &str) -> String {
        if self.preprocessed {
            format!("{}.css", source_id)
        } else {
            source_id.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prefixer {
    browsers: Option<Browsers>,
    options: PrefixOptions,
}

impl Prefixer {
    /// Resolves browserslist queries. An empty list disables prefixing.
    pub fn new(queries: &[String], options: PrefixOptions) -> Result<Self, PipelineError> {
        Ok(Self {
            browsers: resolve_browsers(queries)?,
            options,
        })
    }

    pub fn browsers(&self) -> Option<Browsers> {
        self.browsers
    }

    fn targets(&self) -> Targets {
        self.browsers.map(Targets::from).unwrap_or_default()
    }
}

pub fn resolve_browsers(queries: &[String]) -> Result<Option<Browsers>, PipelineError> {
    if queries.is_empty() {
        return Ok(None);
    }
    Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| PipelineError::InvalidBrowsers(queries.to_vec(), e.to_string()))
}

impl StylesheetStage for Prefixer {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn run(&self, input: StageInput<'_>) -> Result<StageOutput> {
        let css_error = |message: String| PipelineError::Css {
            source_id: input.source_id.to_string(),
            message,
        };

        let source_name = self.options.map_source_name(input.source_id);
        let mut stylesheet = StyleSheet::parse(
            input.content,
            ParserOptions {
                filename: source_name.clone(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| css_error(e.to_string()))?;

        let targets = self.targets();
        stylesheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| css_error(e.to_string()))?;

        let mut source_map = if self.options.source_maps {
            let mut map = SourceMap::new("/");
            let index = map.add_source(&source_name);
            if self.options.include_content {
                map.set_source_content(index as usize, input.content)
                    .map_err(|e| PipelineError::SourceMap {
                        source_id: input.source_id.to_string(),
                        message: format!("{:?}", e),
                    })?;
            }
            Some(map)
        } else {
            None
        };

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: self.options.minify,
                source_map: source_map.as_mut(),
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| css_error(e.to_string()))?;

        let source_map = match source_map.as_mut() {
            Some(map) => Some(map.to_json(None).map_err(|e| PipelineError::SourceMap {
                source_id: input.source_id.to_string(),
                message: format!("{:?}", e),
            })?),
            None => None,
        };

        debug!(
            "Prefixed '{}': {} -> {} bytes{}.",
            input.source_id,
            input.content.len(),
            printed.code.len(),
            if source_map.is_some() { " with source map" } else { "" }
        );

        Ok(StageOutput {
            content: printed.code,
            source_map,
            summary: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn run(prefixer: &Prefixer, css: &str) -> StageOutput {
        prefixer
            .run(StageInput {
                content: css,
                source_path: Path::new("styles/site.scss"),
                source_id: "styles/site.scss",
            })
            .unwrap()
    }

    #[test]
    fn adds_webkit_prefix_for_old_safari() {
        let prefixer = Prefixer::new(&["safari 12".to_string()], PrefixOptions::default()).unwrap();
        let out = run(&prefixer, ".a {\n  user-select: none;\n}\n");
        assert!(out.content.contains("-webkit-user-select: none"), "{}", out.content);
        assert!(out.source_map.is_none());
    }

    #[test]
    fn empty_browser_list_disables_prefixing() {
        let prefixer = Prefixer::new(&[], PrefixOptions::default()).unwrap();
        assert!(prefixer.browsers().is_none());
        let out = run(&prefixer, ".a {\n  user-select: none;\n}\n");
        assert!(!out.content.contains("-webkit-"), "{}", out.content);
    }

    #[test]
    fn builds_source_map_without_content_by_default() {
        let options = PrefixOptions {
            source_maps: true,
            ..PrefixOptions::default()
        };
        let prefixer = Prefixer::new(&[], options).unwrap();
        let out = run(&prefixer, ".a {\n  color: red;\n}\n");
        let map: serde_json::Value = serde_json::from_str(out.source_map.as_deref().unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"], serde_json::json!(["styles/site.scss"]), "{}", map);
        let has_content = map
            .get("sourcesContent")
            .and_then(|c| c.as_array())
            .map_or(false, |c| c.iter().any(|v| v.as_str().map_or(false, |s| !s.is_empty())));
        assert!(!has_content, "{}", map);
    }

    #[test]
    fn rejects_unknown_browser_query() {
        let err = Prefixer::new(&["not-a-browser 99".to_string()], PrefixOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidBrowsers(..)));
    }

    #[test]
    fn map_of_preprocessed_input_names_the_intermediate_css() {
        let options = PrefixOptions {
            source_maps: true,
            include_content: true,
            preprocessed: true,
            ..PrefixOptions::default()
        };
        let prefixer = Prefixer::new(&[], options).unwrap();
        let compiled = ".btn {\n  color: #f60;\n}\n";
        let out = run(&prefixer, compiled);
        let map: serde_json::Value = serde_json::from_str(out.source_map.as_deref().unwrap()).unwrap();
        assert_eq!(map["sources"], serde_json::json!(["styles/site.scss.css"]), "{}", map);
        assert_eq!(map["sourcesContent"][0], compiled, "{}", map);
    }
}
