use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::annotations::ToolState;
use crate::capture::CaptureInput;
use crate::config::{ColorToken, JsonSettingsStore, SettingsStore, UploadConfig};
use crate::core::notify::StdoutNotifier;
use crate::domain::{Style, ViewportRect};
use crate::render::text::TextRenderer;
use crate::session::AnnotationSession;
use crate::session::script::{parse_script, replay};
use crate::session::status::LogStatus;
use crate::upload::{SystemClipboard, UploadPipeline};

/// Command-line arguments for snapmark.
#[derive(Debug, Clone, Parser)]
#[command(name = "snapmark")]
#[command(about = "Annotate a screenshot and upload it to a local image host")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Capture hand-off document ({"imageUri", "viewportRect", "dpr"})
    #[arg(long, conflicts_with = "image")]
    pub capture: Option<PathBuf>,

    /// Plain PNG or JPEG file to annotate
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Selection to crop to, in CSS pixels: x,y,width,height
    #[arg(long, value_parser = parse_rect, requires = "dpr", requires = "image")]
    pub rect: Option<ViewportRect>,

    /// Device pixel ratio for --rect
    #[arg(long)]
    pub dpr: Option<f64>,

    /// JSON list of drawing steps to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Starting color for the script
    #[arg(long, value_parser = parse_color)]
    pub color: Option<ColorToken>,

    /// Starting stroke width for the script
    #[arg(long)]
    pub stroke_width: Option<f32>,

    /// Also write the annotated PNG here
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Skip the upload
    #[arg(long)]
    pub no_upload: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, env = "SNAPMARK_SETTINGS")]
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show or change the upload settings
    Config {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        secret_key: Option<String>,
        #[arg(long)]
        multipart: Option<bool>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        font: Option<PathBuf>,
    },
}

fn parse_rect(value: &str) -> Result<ViewportRect, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, width, height] => Ok(ViewportRect {
            x,
            y,
            width,
            height,
        }),
        _ => Err("expected x,y,width,height".to_string()),
    }
}

fn parse_color(value: &str) -> Result<ColorToken, String> {
    ColorToken::parse(value).map_err(|err| err.to_string())
}

pub fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let store = match &args.settings {
        Some(path) => JsonSettingsStore::at(path),
        None => JsonSettingsStore::new().context("no settings location")?,
    };

    if let Some(Command::Config {
        endpoint,
        secret_key,
        multipart,
        timeout_secs,
        font,
    }) = args.command.clone()
    {
        let mut config = store.load();
        let changed = endpoint.is_some()
            || secret_key.is_some()
            || multipart.is_some()
            || timeout_secs.is_some()
            || font.is_some();
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        if let Some(secret_key) = secret_key {
            config.secret_key = secret_key;
        }
        if let Some(multipart) = multipart {
            config.use_multipart = multipart;
        }
        if let Some(timeout_secs) = timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if font.is_some() {
            config.font_path = font;
        }
        if changed {
            store
                .save(&config)
                .with_context(|| format!("saving {}", store.path().display()))?;
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    annotate(&args, &store)
}

fn read_capture(args: &CliArgs) -> anyhow::Result<Option<CaptureInput>> {
    if let Some(path) = &args.capture {
        let json = read(path)?;
        let capture = serde_json::from_str(&json)
            .with_context(|| format!("parsing capture {}", path.display()))?;
        return Ok(Some(capture));
    }
    if let Some(path) = &args.image {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let mut capture = CaptureInput::from_image_bytes(&bytes);
        capture.viewport_rect = args.rect;
        capture.dpr = args.dpr;
        return Ok(Some(capture));
    }
    Ok(None)
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn annotate(args: &CliArgs, store: &JsonSettingsStore) -> anyhow::Result<()> {
    let config: UploadConfig = store.load();
    let text = TextRenderer::load(config.font_path.as_deref());
    let mut style = Style::default();
    if let Some(color) = &args.color {
        style.color = color.clone();
    }
    if let Some(width) = args.stroke_width {
        style.stroke_width = width.max(1.0);
    }
    let tools = ToolState {
        style,
        ..ToolState::default()
    };

    let mut session = AnnotationSession::new(text, tools, LogStatus);
    let capture = read_capture(args)?;
    session
        .load_capture(capture.as_ref())
        .context("no usable capture (pass --capture or --image)")?;

    if let Some(path) = &args.script {
        let steps = parse_script(&read(path)?)
            .with_context(|| format!("parsing script {}", path.display()))?;
        replay(&mut session, steps);
    }

    if let Some(path) = &args.output {
        let png = session.engine.export_png()?;
        fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved annotated image to {}", path.display());
    }

    if args.no_upload {
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let mut pipeline = UploadPipeline::new(SystemClipboard::new());
    let mut notifier = StdoutNotifier;
    runtime.block_on(session.save_and_upload(store, &mut pipeline, &mut notifier))?;
    Ok(())
}
