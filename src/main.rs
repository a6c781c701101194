//! # tocgen
//!
//! Render a collapsible table of contents from an outline document.
//!
//! ## Usage
//!
//! Print the TOC tree:
//! ```sh
//! tocgen notes.md
//! ```
//!
//! Headings only, three levels deep:
//! ```sh
//! tocgen -L 3 --headings-only notes.md
//! ```
//!
//! Row tree as JSON:
//! ```sh
//! tocgen -o json notes.md
//! ```

mod cli;

use clap::Parser as ClapParser;
use cli::{Cli, OutputFormat};
use color_eyre::Result;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::process;
use tocgen::{Config, MarkdownConverter, OutlineSettings, TocView, parse_outline, render};

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Handle dynamic shell completions
    #[cfg(feature = "unstable-dynamic")]
    clap_complete::CompleteEnv::with_factory(|| {
        use clap::CommandFactory;
        Cli::command()
    })
    .complete();

    let args = Cli::parse();
    let config = Config::load();

    let Some(file) = args.file.as_deref() else {
        eprintln!("Error: outline file argument is required");
        eprintln!("\nUsage: tocgen [OPTIONS] <FILE>");
        eprintln!("       tocgen [OPTIONS] -");
        eprintln!("       cat doc.md | tocgen -\n");
        eprintln!("Use '-' to explicitly read from stdin.");
        process::exit(1);
    };

    let (text, default_page) = match read_input(file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    let page_name = args.page.clone().unwrap_or(default_page);
    let doc = parse_outline(&text, &page_name);

    let settings = OutlineSettings {
        default_expansion_level: args
            .expansion_level
            .unwrap_or(config.outline.default_expansion_level),
        levels: args.levels.unwrap_or(config.outline.levels),
        headings_only: args.headings_only || config.outline.headings_only,
        no_page_jump: args.no_page_jump || config.outline.no_page_jump,
    };

    let mut view = TocView::new(&doc, settings);
    if args.collapse_all {
        view.set_all_children(doc.root(), true);
    } else if args.expand_all {
        view.set_all_children(doc.root(), false);
    }

    let rows = view.render(&doc, &mut MarkdownConverter::new(), &HashSet::new());

    let format = args.output.unwrap_or_else(|| match config.output.format.as_str() {
        "plain" => OutputFormat::Plain,
        "json" => OutputFormat::Json,
        _ => OutputFormat::Tree,
    });
    let width = args.width.unwrap_or(config.output.width);

    match format {
        OutputFormat::Tree => {
            if args.no_style {
                print!("{}", render::render_tree(&rows, width));
            } else {
                let skin = termimad::MadSkin::default();
                print!("{}", render::render_tree_styled(&rows, &skin, width));
            }
        }
        OutputFormat::Plain => print!("{}", render::render_plain(&rows, width)),
        OutputFormat::Json => println!("{}", render::to_json(&rows)?),
    }

    Ok(())
}

/// Read the outline text and derive a default page name from the source.
fn read_input(file: &Path) -> std::io::Result<(String, String)> {
    if file == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok((text, "stdin".to_string()))
    } else {
        let text = std::fs::read_to_string(file)?;
        let name = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();
        Ok((text, name))
    }
}
