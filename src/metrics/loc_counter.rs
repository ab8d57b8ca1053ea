//! Line classification for source files.
//!
//! Every line of a file is classified as exactly one of code, comment or
//! blank, so `code + comment + blank` always equals the physical line count.
//!
//! ## Comment dialects
//!
//! - Kotlin and Java: `//` line comments and `/* */` block comments
//! - XML: `<!-- -->` block comments only
//!
//! ## Classification rules
//!
//! The classifier is a single forward pass with one piece of state, whether
//! the previous line left a block comment open:
//!
//! 1. Inside a block comment every line is a comment line, blank or not. The
//!    block ends after a line whose trimmed text starts with the close token.
//! 2. Outside a block comment, whitespace-only lines are blank.
//! 3. A line starting with the line-comment token is a comment.
//! 4. A line starting with the block-open token is a comment. If the close
//!    token follows on the same line the block does not stay open.
//! 5. Everything else is code.
//!
//! A line such as `/* note */ val x = 1` counts as a single comment line even
//! though code follows the close token. Lines are never split.

use crate::metrics::language_stats::LanguageStats;
use std::ffi::OsStr;
use std::path::Path;

/// Comment tokens for one dialect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommentSyntax {
    pub line: Option<&'static str>,
    pub block_open: &'static str,
    pub block_close: &'static str,
}

impl CommentSyntax {
    /// `//` and `/* */`
    pub const BRACE: CommentSyntax = CommentSyntax {
        line: Some("//"),
        block_open: "/*",
        block_close: "*/",
    };

    /// `<!-- -->`
    pub const MARKUP: CommentSyntax = CommentSyntax {
        line: None,
        block_open: "<!--",
        block_close: "-->",
    };
}

/// Languages the counter recognizes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocLanguage {
    Kotlin,
    Java,
    Xml,
}

impl LocLanguage {
    pub const ALL: [LocLanguage; 3] = [LocLanguage::Kotlin, LocLanguage::Java, LocLanguage::Xml];

    /// Detect language from file extension
    pub fn from_extension(ext: Option<&OsStr>) -> Option<Self> {
        match ext.and_then(|e| e.to_str()) {
            Some("kt") | Some("kts") => Some(Self::Kotlin),
            Some("java") => Some(Self::Java),
            Some("xml") => Some(Self::Xml),
            _ => None,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension())
    }

    /// Key used for this language in per-language stats maps and reports
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kotlin => "Kotlin",
            Self::Java => "Java",
            Self::Xml => "XML",
        }
    }

    pub fn comment_syntax(self) -> CommentSyntax {
        match self {
            Self::Kotlin | Self::Java => CommentSyntax::BRACE,
            Self::Xml => CommentSyntax::MARKUP,
        }
    }

    /// Whether the language uses brace-style comments (Kotlin and Java)
    pub fn is_brace_language(self) -> bool {
        self.comment_syntax() == CommentSyntax::BRACE
    }
}

/// Line type classification for LOC counting
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineType {
    Blank,
    Comment,
    Code,
}

/// Counts code, comment and blank lines of a single file.
///
/// # Examples
///
/// ```rust
/// use modscore::metrics::loc_counter::{LocCounter, LocLanguage};
///
/// let stats = LocCounter::count_content("// hi\nval x = 1\n", LocLanguage::Kotlin);
/// assert_eq!(stats.comment, 1);
/// assert_eq!(stats.code, 1);
/// assert_eq!(stats.files, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LocCounter;

impl LocCounter {
    /// Read and classify a file, detecting the language from its extension.
    ///
    /// Returns `Ok(None)` for files with an unrecognized extension. Content is
    /// decoded lossily, so only files that cannot be read at all are errors.
    pub fn count_file(path: &Path) -> std::io::Result<Option<(LocLanguage, LanguageStats)>> {
        let Some(language) = LocLanguage::from_path(path) else {
            return Ok(None);
        };
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Some((language, Self::count_content(&content, language))))
    }

    /// Classify file content (pure function)
    pub fn count_content(content: &str, language: LocLanguage) -> LanguageStats {
        Self::count_lines(content.lines(), language.comment_syntax())
    }

    /// Classify a sequence of lines with an explicit comment dialect
    pub fn count_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        syntax: CommentSyntax,
    ) -> LanguageStats {
        let mut stats = LanguageStats {
            files: 1,
            ..LanguageStats::EMPTY
        };
        let mut in_block_comment = false;

        for line in lines {
            match classify_line(line.trim(), &mut in_block_comment, syntax) {
                LineType::Blank => stats.blank += 1,
                LineType::Comment => stats.comment += 1,
                LineType::Code => stats.code += 1,
            }
        }

        stats
    }
}

/// Classify one trimmed line, updating the block-comment state
pub fn classify_line(
    trimmed: &str,
    in_block_comment: &mut bool,
    syntax: CommentSyntax,
) -> LineType {
    if *in_block_comment {
        if trimmed.starts_with(syntax.block_close) {
            *in_block_comment = false;
        }
        return LineType::Comment;
    }

    if trimmed.is_empty() {
        return LineType::Blank;
    }

    if syntax.line.is_some_and(|token| trimmed.starts_with(token)) {
        return LineType::Comment;
    }

    if let Some(rest) = trimmed.strip_prefix(syntax.block_open) {
        if !rest.contains(syntax.block_close) {
            *in_block_comment = true;
        }
        return LineType::Comment;
    }

    LineType::Code
}
