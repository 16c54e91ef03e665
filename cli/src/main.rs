use std::fs;
use std::io::{self, Read};

use canvas::doc::Shape;
use canvas::templates::Template;
use canvas::{consts, dialect, svg};
use clap::{Args, Parser, Subcommand};
use preview::PreviewError;
use preview::config::PreviewConfig;
use preview::display::{DisplayConfigStore, MemoryStore};
use preview::export::{self, PageGeometry};
use preview::raster::{self, DiagramRasterizer, Surface};
use preview::render;
use preview::span::{EditorRange, TaggedSpan};
use serde::Serialize;
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("preview failed: {0}")]
    Preview(#[from] PreviewError),
    #[error("diagram source rejected: {0}")]
    Dialect(#[from] dialect::DialectError),
    #[error("unknown template `{name}`; expected one of: {known}")]
    UnknownTemplate { name: String, known: String },
}

#[derive(Parser, Debug)]
#[command(name = "lecturepad", about = "Lecture markup preview and TikZ diagram tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render lecture markup to source-tagged preview HTML.
    Preview(PreviewArgs),
    /// Dump every tagged span with its editor range.
    Spans(InputArgs),
    /// Generate TikZ from a JSON shape list.
    Tikz(InputArgs),
    /// Parse TikZ into a JSON shape list.
    Shapes(InputArgs),
    /// Render TikZ as a standalone SVG document.
    Svg(SvgArgs),
    /// Emit a physics preset as TikZ.
    Template(TemplateArgs),
    /// Page bands for paginated export of a rasterized preview.
    Pages(PagesArgs),
    /// Copy the document to a plain-text export file.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    /// Inline diagrams as SVG, falling back to sandbox frames.
    #[arg(long, env = "LECTUREPAD_INLINE_SVG", default_value_t = false)]
    inline_svg: bool,

    /// JSON file mapping diagram ids to saved display settings.
    #[arg(long, env = "LECTUREPAD_DISPLAY_CONFIG")]
    display_config: Option<String>,
}

#[derive(Args, Debug)]
struct SvgArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    /// Treat TikZ y as pointing up.
    #[arg(long, default_value_t = false)]
    flip_y: bool,
}

#[derive(Args, Debug)]
struct TemplateArgs {
    name: String,

    #[arg(long, default_value_t = consts::DEFAULT_CANVAS_WIDTH)]
    width: f64,

    #[arg(long, default_value_t = consts::DEFAULT_CANVAS_HEIGHT)]
    height: f64,
}

#[derive(Args, Debug)]
struct PagesArgs {
    /// Raster width in pixels.
    #[arg(long)]
    width: f64,

    /// Raster height in pixels.
    #[arg(long)]
    height: f64,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, default_value = export::TEXT_FILE_NAME)]
    output: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(err) => {
            tracing::error!(%err, "command failed");
            std::process::exit(1);
        }
    }
}

fn run(command: Command) -> Result<String, CliError> {
    match command {
        Command::Preview(args) => {
            let text = read_input(&args.input)?;
            let store = match &args.display_config {
                Some(path) => MemoryStore::from_json(&read_input(path)?)?,
                None => MemoryStore::new(),
            };
            let mut config = PreviewConfig::from_env();
            config.native_diagrams |= args.inline_svg;
            Ok(preview_html(&text, &store, &config))
        }
        Command::Spans(args) => spans_json(&read_input(&args.input)?),
        Command::Tikz(args) => tikz_from_json(&read_input(&args.input)?),
        Command::Shapes(args) => shapes_json(&read_input(&args.input)?),
        Command::Svg(args) => {
            let shapes = dialect::parse(&read_input(&args.input)?)?;
            Ok(svg::to_svg(&shapes, args.flip_y))
        }
        Command::Template(args) => template_tikz(&args.name, args.width, args.height),
        Command::Pages(args) => {
            let slices = export::slice_pages(args.width, args.height, PageGeometry::A4);
            tracing::info!(pages = slices.len(), file = export::PAGES_FILE_NAME, "page bands computed");
            Ok(serde_json::to_string_pretty(&slices)?)
        }
        Command::Export(args) => {
            let artifact = export::plain_text_export(&read_input(&args.input)?);
            fs::write(&args.output, &artifact.contents)
                .map_err(|source| CliError::Write { path: args.output.clone(), source })?;
            tracing::info!(path = %args.output, bytes = artifact.contents.len(), mime = artifact.mime, "exported");
            Ok(String::new())
        }
    }
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read { path: "<stdin>".to_owned(), source })?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

// =============================================================================
// Preview
// =============================================================================

/// Preview HTML with every diagram frame filled. Any failure yields the
/// single error element instead.
fn preview_html(text: &str, store: &dyn DisplayConfigStore, config: &PreviewConfig) -> String {
    let rasterizer = raster::rasterizer_for(config);
    match render_with_frames(text, store, rasterizer.as_ref()) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(%err, "preview render failed");
            render::error_html(&err)
        }
    }
}

fn render_with_frames(
    text: &str,
    store: &dyn DisplayConfigStore,
    rasterizer: &dyn DiagramRasterizer,
) -> Result<String, PreviewError> {
    let rendered = render::render_document(text, store)?;
    let frames = rendered
        .diagrams
        .iter()
        .map(|block| rasterizer.surface(block).map(|surface| frame_html(&surface)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rendered.html_with(|block| {
        rendered
            .diagrams
            .iter()
            .position(|candidate| candidate.span == block.span)
            .and_then(|index| frames.get(index))
            .cloned()
            .unwrap_or_default()
    }))
}

/// Static markup for a frame. Sandbox frames cannot be measured offline, so
/// they get their configured or minimum height.
fn frame_html(surface: &Surface) -> String {
    match surface {
        Surface::Inline { markup, height } => format!(r#"<div style="height:{height}px">{markup}</div>"#),
        Surface::Sandbox { document, sizing } => format!(
            r#"<iframe loading="lazy" style="width:100%;border:0;height:{}px" srcdoc="{}"></iframe>"#,
            sizing.height_for(f64::NAN),
            render::escape_html(document)
        ),
    }
}

// =============================================================================
// Spans
// =============================================================================

#[derive(Serialize)]
struct SpanRecord<'a> {
    #[serde(flatten)]
    tagged: &'a TaggedSpan,
    range: EditorRange,
}

fn spans_json(text: &str) -> Result<String, CliError> {
    let rendered = render::render_document(text, &MemoryStore::new())?;
    let records = rendered
        .all_spans()
        .into_iter()
        .map(|tagged| -> Result<SpanRecord<'_>, PreviewError> {
            Ok(SpanRecord { tagged, range: EditorRange::from_span(text, tagged.span)? })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serde_json::to_string_pretty(&records)?)
}

// =============================================================================
// Diagrams
// =============================================================================

fn tikz_from_json(json: &str) -> Result<String, CliError> {
    let shapes: Vec<Shape> = serde_json::from_str(json)?;
    Ok(dialect::generate(&shapes))
}

fn shapes_json(source: &str) -> Result<String, CliError> {
    let shapes = dialect::parse(source)?;
    tracing::debug!(shapes = shapes.len(), "parsed diagram");
    Ok(serde_json::to_string_pretty(&shapes)?)
}

fn template_tikz(name: &str, width: f64, height: f64) -> Result<String, CliError> {
    let template = Template::from_name(name).ok_or_else(|| CliError::UnknownTemplate {
        name: name.to_owned(),
        known: Template::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", "),
    })?;
    Ok(dialect::generate(&template.shapes(width, height)))
}
