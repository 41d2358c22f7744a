// stylepipe-core/src/engines/preprocess_engine.rs
//! A `StylesheetStage` that compiles Sass/SCSS into plain CSS with `grass`.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use grass::{InputSyntax, Options, OutputStyle};
use log::debug;
use std::path::{Path, PathBuf};

use crate::engine::{StageInput, StageOutput, StylesheetStage};
use crate::errors::PipelineError;

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    include_paths: Vec<PathBuf>,
}

impl Preprocessor {
    /// `include_paths` are searched, in order, after the source file's own directory.
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self { include_paths }
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    fn options_for(&self, source_path: &Path) -> Options<'static> {
        let mut options = Options::default()
            .style(OutputStyle::Expanded)
            .quiet(true)
            .input_syntax(syntax_for(source_path));

        if let Some(parent) = source_path.parent() {
            options = options.load_path(parent);
        }
        for dir in &self.include_paths {
            options = options.load_path(dir);
        }
        options
    }
}

/// Plain `.css` files pass through the compiler too, so `@use` still resolves.
fn syntax_for(path: &Path) -> InputSyntax {
    match path.extension().and_then(|e| e.to_str()) {
        Some("sass") => InputSyntax::Sass,
        Some("css") => InputSyntax::Css,
        _ => InputSyntax::Scss,
    }
}

impl StylesheetStage for Preprocessor {
    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn run(&self, input: StageInput<'_>) -> Result<StageOutput> {
        debug!(
            "Preprocessing '{}' with {} include path(s).",
            input.source_id,
            self.include_paths.len()
        );
        let css = grass::from_string(input.content.to_string(), &self.options_for(input.source_path))
            .map_err(|e| PipelineError::Preprocess {
                path: input.source_path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(StageOutput::text(css))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(pre: &Preprocessor, path: &Path, content: &str) -> Result<StageOutput> {
        pre.run(StageInput {
            content,
            source_path: path,
            source_id: "test.scss",
        })
    }

    #[test]
    fn compiles_nesting_and_variables() {
        let pre = Preprocessor::default();
        let out = run(&pre, Path::new("test.scss"), "$c: red;\n.a { color: $c; .b { color: blue; } }\n").unwrap();
        assert!(out.content.contains(".a {\n  color: red;\n}"), "{}", out.content);
        assert!(out.content.contains(".a .b {\n  color: blue;\n}"), "{}", out.content);
    }

    #[test]
    fn resolves_partials_from_include_paths() {
        let dir = TempDir::new().unwrap();
        let includes = dir.path().join("includes");
        fs::create_dir_all(&includes).unwrap();
        fs::write(includes.join("_colors.scss"), "$brand: #336699;\n").unwrap();

        let pre = Preprocessor::new(vec![includes]);
        let source = dir.path().join("site.scss");
        let out = run(&pre, &source, "@import 'colors';\nh1 { color: $brand; }\n").unwrap();
        assert!(out.content.contains("color: #336699;"), "{}", out.content);
    }

    #[test]
    fn reports_syntax_errors_with_path() {
        let pre = Preprocessor::default();
        let err = run(&pre, Path::new("broken.scss"), ".a { color: $missing; }").unwrap_err();
        assert!(err.to_string().contains("broken.scss"), "{}", err);
    }
}
