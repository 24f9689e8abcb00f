//! Syntax mode resolution for the editor buffer
//!
//! Resolution order: declared content-type, then file name, then plain text.
//! Every input yields exactly one mode.

use serde::{Deserialize, Serialize};

/// Syntax-highlighting mode understood by the editor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxMode {
    AssemblyX86,
    Batchfile,
    CCpp,
    Conf,
    Csharp,
    Css,
    Dart,
    Dockerfile,
    Golang,
    Groovy,
    Html,
    Ini,
    Java,
    Javascript,
    Json,
    Jsx,
    Kotlin,
    Less,
    Log,
    Lua,
    Makefile,
    Markdown,
    Perl,
    Php,
    Powershell,
    Python,
    R,
    Ruby,
    Rust,
    Scala,
    Scss,
    Sh,
    Sql,
    Swift,
    Text,
    Toml,
    Tsx,
    Typescript,
    Vue,
    Xml,
    Yaml,
}

impl SyntaxMode {
    /// Mode identifier as the editor surface names it
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxMode::AssemblyX86 => "assembly_x86",
            SyntaxMode::Batchfile => "batchfile",
            SyntaxMode::CCpp => "c_cpp",
            SyntaxMode::Conf => "conf",
            SyntaxMode::Csharp => "csharp",
            SyntaxMode::Css => "css",
            SyntaxMode::Dart => "dart",
            SyntaxMode::Dockerfile => "dockerfile",
            SyntaxMode::Golang => "golang",
            SyntaxMode::Groovy => "groovy",
            SyntaxMode::Html => "html",
            SyntaxMode::Ini => "ini",
            SyntaxMode::Java => "java",
            SyntaxMode::Javascript => "javascript",
            SyntaxMode::Json => "json",
            SyntaxMode::Jsx => "jsx",
            SyntaxMode::Kotlin => "kotlin",
            SyntaxMode::Less => "less",
            SyntaxMode::Log => "log",
            SyntaxMode::Lua => "lua",
            SyntaxMode::Makefile => "makefile",
            SyntaxMode::Markdown => "markdown",
            SyntaxMode::Perl => "perl",
            SyntaxMode::Php => "php",
            SyntaxMode::Powershell => "powershell",
            SyntaxMode::Python => "python",
            SyntaxMode::R => "r",
            SyntaxMode::Ruby => "ruby",
            SyntaxMode::Rust => "rust",
            SyntaxMode::Scala => "scala",
            SyntaxMode::Scss => "scss",
            SyntaxMode::Sh => "sh",
            SyntaxMode::Sql => "sql",
            SyntaxMode::Swift => "swift",
            SyntaxMode::Text => "text",
            SyntaxMode::Toml => "toml",
            SyntaxMode::Tsx => "tsx",
            SyntaxMode::Typescript => "typescript",
            SyntaxMode::Vue => "vue",
            SyntaxMode::Xml => "xml",
            SyntaxMode::Yaml => "yaml",
        }
    }

    /// Look up a mode from a declared content-type.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let mode = match essence.as_str() {
            "text/x-python" => SyntaxMode::Python,
            "text/x-shellscript" => SyntaxMode::Sh,
            "text/x-c" | "text/x-c++" => SyntaxMode::CCpp,
            "application/javascript" => SyntaxMode::Javascript,
            "text/html" => SyntaxMode::Html,
            "text/css" => SyntaxMode::Css,
            "application/json" => SyntaxMode::Json,
            "application/x-httpd-php" => SyntaxMode::Php,
            "text/x-java-source" => SyntaxMode::Java,
            "text/markdown" => SyntaxMode::Markdown,
            "application/xml" => SyntaxMode::Xml,
            _ => return None,
        };
        Some(mode)
    }

    /// Look up a mode from a file name or path.
    pub fn from_filename(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();

        match name.as_str() {
            "makefile" => return Some(SyntaxMode::Makefile),
            "dockerfile" => return Some(SyntaxMode::Dockerfile),
            _ => {}
        }
        // .bashrc, .zshrc, .vimrc ...
        if name.ends_with("rc") {
            return Some(SyntaxMode::Sh);
        }

        let (_, ext) = name.rsplit_once('.')?;
        let mode = match ext {
            "js" => SyntaxMode::Javascript,
            "jsx" => SyntaxMode::Jsx,
            "ts" => SyntaxMode::Typescript,
            "tsx" => SyntaxMode::Tsx,
            "py" => SyntaxMode::Python,
            "rb" => SyntaxMode::Ruby,
            "java" => SyntaxMode::Java,
            "c" | "cpp" | "h" => SyntaxMode::CCpp,
            "cs" => SyntaxMode::Csharp,
            "php" => SyntaxMode::Php,
            "html" | "htm" => SyntaxMode::Html,
            "css" => SyntaxMode::Css,
            "scss" => SyntaxMode::Scss,
            "less" => SyntaxMode::Less,
            "sh" | "bash" | "zsh" | "env" => SyntaxMode::Sh,
            "json" => SyntaxMode::Json,
            "yaml" | "yml" => SyntaxMode::Yaml,
            "xml" => SyntaxMode::Xml,
            "md" => SyntaxMode::Markdown,
            "txt" => SyntaxMode::Text,
            "sql" => SyntaxMode::Sql,
            "dockerfile" => SyntaxMode::Dockerfile,
            "makefile" => SyntaxMode::Makefile,
            "ini" => SyntaxMode::Ini,
            "toml" => SyntaxMode::Toml,
            "vue" => SyntaxMode::Vue,
            "go" => SyntaxMode::Golang,
            "rs" => SyntaxMode::Rust,
            "swift" => SyntaxMode::Swift,
            "kt" => SyntaxMode::Kotlin,
            "dart" => SyntaxMode::Dart,
            "lua" => SyntaxMode::Lua,
            "perl" | "pl" => SyntaxMode::Perl,
            "r" => SyntaxMode::R,
            "scala" => SyntaxMode::Scala,
            "groovy" => SyntaxMode::Groovy,
            "asm" => SyntaxMode::AssemblyX86,
            "log" => SyntaxMode::Log,
            "conf" => SyntaxMode::Conf,
            "bat" => SyntaxMode::Batchfile,
            "ps1" => SyntaxMode::Powershell,
            _ => return None,
        };
        Some(mode)
    }

    /// Pick the mode for a loaded file.
    pub fn resolve(path: &str, mime: Option<&str>) -> Self {
        mime.and_then(Self::from_mime)
            .or_else(|| Self::from_filename(path))
            .unwrap_or(SyntaxMode::Text)
    }
}

impl std::fmt::Display for SyntaxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_takes_precedence_over_extension() {
        assert_eq!(
            SyntaxMode::resolve("report.md", Some("text/markdown")),
            SyntaxMode::Markdown
        );
        assert_eq!(
            SyntaxMode::resolve("script.txt", Some("text/x-python")),
            SyntaxMode::Python
        );
    }

    #[test]
    fn test_unmapped_mime_falls_back_to_filename() {
        assert_eq!(
            SyntaxMode::resolve("main.rs", Some("text/plain")),
            SyntaxMode::Rust
        );
        assert_eq!(SyntaxMode::resolve("app.ts", None), SyntaxMode::Typescript);
    }

    #[test]
    fn test_unknown_everything_is_plain_text() {
        assert_eq!(
            SyntaxMode::resolve("data.unknownext", Some("application/octet-stream")),
            SyntaxMode::Text
        );
        assert_eq!(SyntaxMode::resolve("LICENSE", None), SyntaxMode::Text);
        assert_eq!(SyntaxMode::resolve("", None), SyntaxMode::Text);
    }

    #[test]
    fn test_extensionless_known_files() {
        assert_eq!(SyntaxMode::from_filename("Makefile"), Some(SyntaxMode::Makefile));
        assert_eq!(
            SyntaxMode::from_filename("docker/Dockerfile"),
            Some(SyntaxMode::Dockerfile)
        );
        assert_eq!(SyntaxMode::from_filename(".bashrc"), Some(SyntaxMode::Sh));
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert_eq!(
            SyntaxMode::from_mime("application/JSON; charset=utf-8"),
            Some(SyntaxMode::Json)
        );
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        assert_eq!(SyntaxMode::from_filename("INDEX.HTML"), Some(SyntaxMode::Html));
        assert_eq!(SyntaxMode::from_filename("lib/util.PY"), Some(SyntaxMode::Python));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let inputs = [
            ("a.py", Some("text/x-python")),
            ("b.unknown", None),
            ("Makefile", Some("")),
        ];
        for (path, mime) in inputs {
            assert_eq!(SyntaxMode::resolve(path, mime), SyntaxMode::resolve(path, mime));
        }
    }
}
