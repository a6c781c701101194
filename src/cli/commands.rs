use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[cfg(feature = "unstable-dynamic")]
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate, ValueCompleter};

#[derive(Parser, Debug)]
#[command(name = "tocgen")]
#[command(version)]
#[command(about = "A collapsible table-of-contents generator for outline documents")]
#[command(
    long_about = "tocgen - Render a collapsible, depth-limited table of contents from an\n\
    outline document (indented bullets, optional heading markers, key:: value\n\
    properties). Blocks opt out with 'toc:: no'; headings-only mode restricts\n\
    the outline to # .. ###### blocks.\n\n\
    Examples:\n  \
    tocgen notes.md                    # Box-drawing tree\n  \
    tocgen -L 3 --headings-only doc.md # Headings, three levels deep\n  \
    tocgen -o json doc.md              # Row tree as JSON\n  \
    cat doc.md | tocgen -              # Read from stdin"
)]
pub struct Cli {
    /// Outline file to read, or '-' for stdin
    ///
    /// Path to the outline document. Use '-' to read from stdin.
    #[arg(add = outline_file_completer())]
    pub file: Option<PathBuf>,

    /// Maximum depth to descend from the root (overrides config)
    ///
    /// Blocks nested deeper than this never appear and never show an
    /// expand control.
    ///
    /// Example: -L 2 renders two levels of the outline
    #[arg(short = 'L', long = "levels", value_name = "DEPTH")]
    pub levels: Option<usize>,

    /// Nesting level at which blocks start collapsed (overrides config)
    ///
    /// Children at this level or deeper are collapsed by default;
    /// shallower blocks start expanded.
    #[arg(long = "expansion-level", value_name = "LEVEL")]
    pub expansion_level: Option<usize>,

    /// Restrict the outline to heading blocks only
    ///
    /// Only blocks starting with 1-6 '#' characters and a space are
    /// emitted; everything else is skipped along with its subtree.
    #[arg(long = "headings-only")]
    pub headings_only: bool,

    /// Hide the "go to page" control on every row
    #[arg(long = "no-page-jump")]
    pub no_page_jump: bool,

    /// Collapse every top-level block before rendering
    #[arg(long = "collapse-all", conflicts_with = "expand_all")]
    pub collapse_all: bool,

    /// Expand every top-level block before rendering
    #[arg(long = "expand-all")]
    pub expand_all: bool,

    /// Page name to report for the outline (defaults to the file stem)
    #[arg(long = "page", value_name = "NAME")]
    pub page: Option<String>,

    /// Output format
    ///
    /// Controls how the TOC is displayed:
    ///   tree  - Box-drawing tree with collapse markers (default)
    ///   plain - Flat indented list with explicit controls
    ///   json  - Full row tree as JSON, hidden rows included
    #[arg(short = 'o', long = "output", value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Maximum label width in terminal cells (0 = no truncation)
    #[arg(short = 'w', long = "width", value_name = "CELLS")]
    pub width: Option<usize>,

    /// Disable terminal styling of labels
    ///
    /// Inline markup such as **bold** is printed verbatim instead of
    /// being styled by the terminal renderer.
    #[arg(long = "no-style")]
    pub no_style: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawing tree with collapse markers
    Tree,
    /// Flat indented list
    Plain,
    /// JSON row tree
    Json,
}

#[cfg(feature = "unstable-dynamic")]
fn outline_file_completer() -> ArgValueCompleter {
    use std::ffi::OsStr;
    use std::path::Path;

    struct OutlineCompleter;

    impl ValueCompleter for OutlineCompleter {
        fn complete(&self, current: &OsStr) -> Vec<CompletionCandidate> {
            let input = current.to_string_lossy();
            let path = Path::new(input.as_ref());

            // Split the partial input into the directory to list and the
            // name prefix to match; bare names have an empty parent.
            let (dir, prefix) = if input.is_empty() || input.ends_with('/') {
                (path.to_path_buf(), String::new())
            } else {
                let parent = path.parent().unwrap_or(Path::new("."));
                let dir = if parent.as_os_str().is_empty() {
                    Path::new(".").to_path_buf()
                } else {
                    parent.to_path_buf()
                };
                let prefix = path
                    .file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                (dir, prefix)
            };
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".").to_path_buf()
            } else {
                dir
            };

            let Ok(entries) = std::fs::read_dir(&dir) else {
                return vec![];
            };

            entries
                .filter_map(Result::ok)
                .filter_map(|entry| {
                    let path = entry.path();
                    let name = path.file_name()?.to_string_lossy().to_string();
                    if !prefix.is_empty()
                        && !name.to_lowercase().starts_with(&prefix.to_lowercase())
                    {
                        return None;
                    }
                    let value = if dir == Path::new(".") {
                        name
                    } else {
                        dir.join(&name).to_string_lossy().to_string()
                    };
                    if path.is_dir() {
                        Some(CompletionCandidate::new(format!("{value}/")).help(Some("directory".into())))
                    } else {
                        let ext = path.extension()?.to_string_lossy().to_lowercase();
                        (ext == "md" || ext == "markdown" || ext == "txt")
                            .then(|| CompletionCandidate::new(value))
                    }
                })
                .collect()
        }
    }

    ArgValueCompleter::new(OutlineCompleter)
}

#[cfg(not(feature = "unstable-dynamic"))]
fn outline_file_completer() -> clap::builder::ValueHint {
    clap::ValueHint::FilePath
}
