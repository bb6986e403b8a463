//! A minimal regex-based [`SourceParser`] used only to exercise the CLI
//! and the end-to-end pipeline without a real tree-sitter-backed parser,
//! which remains an external collaborator out of scope for this crate.
//!
//! Grounded on the teacher's `RegexEngine` (`drift-analysis::engine::
//! regex_engine`): a `RegexSet` plus an explicit timeout guard so a
//! pathological file can't stall the pipeline.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use regex::Regex;
use syncgraph_core::traits::{ParseError, SourceParser};
use syncgraph_core::types::{FunctionEntity, ImportEntity, Language, ParsedFile};

const MATCH_TIMEOUT: Duration = Duration::from_millis(500);

pub struct DemoSourceParser {
    function_re: Regex,
    import_re: Regex,
}

impl DemoSourceParser {
    pub fn new() -> Self {
        Self {
            function_re: Regex::new(
                r"(?m)^\s*(export\s+)?(async\s+)?function\s+(?P<name>[A-Za-z_$][\w$]*)\s*\(",
            )
            .expect("static regex is valid"),
            import_re: Regex::new(r#"(?m)^\s*import\s+.*?from\s+['"](?P<module>[^'"]+)['"]"#)
                .expect("static regex is valid"),
        }
    }
}

impl Default for DemoSourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for DemoSourceParser {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        let bytes = fs::read_to_string(path).map_err(|e| ParseError::Io(path.to_path_buf(), e))?;
        let language = language_for(path).ok_or_else(|| ParseError::Unsupported(path.to_path_buf()))?;

        let file_path = path.to_string_lossy().into_owned();
        let started = Instant::now();

        let mut functions = Vec::new();
        for (line_idx, line) in bytes.lines().enumerate() {
            if started.elapsed() > MATCH_TIMEOUT {
                tracing::warn!(path = %file_path, "demo parser timed out, returning partial result");
                break;
            }
            if let Some(caps) = self.function_re.captures(line) {
                let name = caps["name"].to_string();
                functions.push(FunctionEntity {
                    name,
                    file_path: file_path.clone(),
                    start_line: (line_idx + 1) as u32,
                    end_line: (line_idx + 1) as u32,
                    signature: "()".to_string(),
                    is_async: line.contains("async"),
                    is_exported: line.contains("export"),
                });
            }
        }

        let mut imports = Vec::new();
        for caps in self.import_re.captures_iter(&bytes) {
            imports.push(ImportEntity {
                module_path: caps["module"].to_string(),
                file_path: file_path.clone(),
                start_line: 0,
                imported_names: Default::default(),
                is_default: false,
            });
        }

        Ok(ParsedFile {
            path: file_path,
            language: Some(language),
            functions,
            imports,
            ..Default::default()
        })
    }
}

fn language_for(path: &Path) -> Option<Language> {
    match path.extension().and_then(|e| e.to_str())? {
        "ts" | "tsx" => Some(Language::TypeScript),
        "js" | "jsx" => Some(Language::JavaScript),
        "css" | "scss" => Some(Language::Css),
        _ => None,
    }
}
