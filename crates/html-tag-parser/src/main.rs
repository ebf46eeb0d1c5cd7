//! `html-tag-parser`: extract HTML tags from a local file.

use std::path::PathBuf;

use clap::Parser;

use html_tag_parser::{
    EngineKind, ExtractionMode, TagExtractionRequest, DEFAULT_SEPARATOR,
};

#[derive(Parser)]
#[command(
    name = "html-tag-parser",
    about = "Extract specific HTML tags from text files",
    version,
    after_help = "Examples:\n  html-tag-parser input.html a links.txt --attr href\n  html-tag-parser input.txt p paragraphs.txt --text-only\n  html-tag-parser input.html span output.txt --separator \" | \""
)]
struct Cli {
    /// Path to the input file containing HTML/text content
    input_file: PathBuf,

    /// HTML tag name to extract (e.g. a, div, p, span, img)
    tag_name: String,

    /// Path to the output file where extracted content will be saved
    output_file: PathBuf,

    /// Extract this attribute instead of tag content (e.g. href, src, class)
    #[arg(long)]
    attr: Option<String>,

    /// Extract only text content, without nested tags
    #[arg(long)]
    text_only: bool,

    /// Output the complete tag including its opening and closing tags
    #[arg(long)]
    include_tag: bool,

    /// Use regex-based extraction instead of the HTML parser (faster, less accurate)
    #[arg(long)]
    regex: bool,

    /// Separator between extracted items in the output file
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    separator: String,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    reptile_core::logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", reptile_core::error_line(&e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = ExtractionMode::from_flags(cli.attr.as_deref(), cli.text_only, cli.include_tag)?;
    let engine = if cli.regex {
        EngineKind::Regex
    } else {
        EngineKind::Structural
    };

    let request = TagExtractionRequest {
        input_path: cli.input_file,
        tag_name: cli.tag_name,
        output_path: cli.output_file,
        mode,
        engine,
        separator: cli.separator,
    };

    let outcome = html_tag_parser::run(&request)?;

    if outcome.items == 0 {
        println!(
            "Warning: No <{}> tags found in {}",
            request.tag_name,
            request.input_path.display()
        );
    }
    println!(
        "Successfully saved {} items to: {}",
        outcome.items,
        request.output_path.display()
    );
    println!();
    println!("Summary:");
    println!("  Input file: {}", request.input_path.display());
    println!("  Tag: <{}>", request.tag_name);
    println!("  Extracted: {}", request.mode);
    println!("  Method: {}", request.engine);
    println!("  Items found: {}", outcome.items);
    println!("  Output file: {}", request.output_path.display());

    Ok(())
}
