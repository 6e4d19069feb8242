use anyhow::{anyhow, Context};
use cartokit::editor::feature::FillPattern;
use cartokit::editor::render::{render_features, render_symbol, ViewTransform};
use cartokit::editor::style::parse_color;
use cartokit::editor::{PixmapSurface, Point};
use cartokit::{
    init_logging, Config, EditorSession, FeatureEntity, Geometry, GeometryKind, LegendItem,
    StyleProperties, BUILD_DATE, VERSION,
};
use cartokit_core::shared;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cartokit", version, about = "Render map symbols, legends and previews")]
struct Cli {
    /// Configuration file (JSON or TOML); defaults to the platform config path
    #[arg(long, global = true, env = "CARTOKIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the sample legend to a PNG file
    Legend {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        ratio: f64,
    },
    /// Render one symbol swatch to a PNG file
    Symbol {
        /// Geometry kind, e.g. Point, LineString, Polygon
        #[arg(long)]
        kind: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Point size or stroke width
        #[arg(long)]
        size: Option<f64>,
        #[arg(long, default_value_t = 1.0)]
        ratio: f64,
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the style catalog of the sample session
    Catalog {
        #[arg(long, default_value_t = 1.0)]
        ratio: f64,
        /// Print JSON instead of one line per style
        #[arg(long)]
        json: bool,
    },
    /// Render the sample layer to a PNG file
    Preview {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 640)]
        width: u32,
        #[arg(long, default_value_t = 480)]
        height: u32,
        #[arg(long, default_value_t = 1.0)]
        ratio: f64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;
    info!("cartokit {} (built {})", VERSION, BUILD_DATE);

    // Rendering is single-threaded; the runtime only drives icon waits.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    match cli.command {
        Command::Legend { output, ratio } => {
            runtime.block_on(export_legend(&config, &output, ratio))
        }
        Command::Symbol {
            kind,
            icon,
            color,
            size,
            ratio,
            output,
        } => {
            let kind = GeometryKind::from_name(&kind)
                .ok_or_else(|| anyhow!("unknown geometry kind '{}'", kind))?;
            let props = symbol_properties(kind, icon, color, size);
            runtime.block_on(export_symbol(&config, kind, &props, ratio, &output))
        }
        Command::Catalog { ratio, json } => print_catalog(&config, ratio, json),
        Command::Preview {
            output,
            width,
            height,
            ratio,
        } => export_preview(&config, &output, width, height, ratio),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match cartokit::default_config_path() {
            Ok(path) => path,
            Err(_) => return Ok(Config::default()),
        },
    };
    Config::load_or_default(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn symbol_properties(
    kind: GeometryKind,
    icon: Option<String>,
    color: Option<String>,
    size: Option<f64>,
) -> StyleProperties {
    let mut props = StyleProperties::default();
    if kind.is_point() {
        props.point.icon = icon;
        props.point.color = color;
        props.point.size = size;
    } else {
        props.stroke.color = color.clone();
        props.stroke.width = size;
        props.fill.color1 = color;
    }
    props
}

/// A session holding a few features of every kind and a matching legend.
fn sample_session(config: &Config) -> anyhow::Result<EditorSession> {
    let mut session = EditorSession::new(config);

    let parcel = FeatureEntity::new(Some(Geometry::polygon(&[
        (0.0, 0.0),
        (40.0, 0.0),
        (40.0, 25.0),
        (0.0, 25.0),
    ])))
    .with_style(
        &StyleProperties::default()
            .with_fill("#E8F1D4", "#7A9A3A", FillPattern::HatchingObliqueRight)
            .with_stroke("#4F6B1F", 1.5),
    );
    let river = FeatureEntity::new(Some(Geometry::line(&[
        (-5.0, 30.0),
        (10.0, 20.0),
        (25.0, 28.0),
        (45.0, 12.0),
    ])))
    .with_style(&StyleProperties::default().with_stroke("#2B6CB0", 3.0));
    let pond = FeatureEntity::new(Some(Geometry::Circle {
        center: Point::new(30.0, 8.0),
        radius: 4.0,
    }));
    let mut well = FeatureEntity::new(Some(Geometry::point(8.0, 8.0)))
        .with_style(&StyleProperties::default().with_point("pin", 18.0, "#C53030"));
    well.set_property("name", "North well");
    let mut marker = FeatureEntity::new(Some(Geometry::point(20.0, 15.0)))
        .with_style(&StyleProperties::default().with_text("Survey mark"));
    marker.set_default_style();

    session
        .add_features(vec![parcel, river, pond, well, marker])
        .context("failed to add sample features")?;

    let parcels = StyleProperties::default()
        .with_fill("#E8F1D4", "#7A9A3A", FillPattern::HatchingObliqueRight)
        .with_stroke("#4F6B1F", 1.5);
    let rivers = StyleProperties::default().with_stroke("#2B6CB0", 3.0);
    let wells = StyleProperties::default().with_point("pin", 18.0, "#C53030");
    let legend_items = [
        ("Parcels", GeometryKind::Polygon, parcels),
        ("Rivers", GeometryKind::LineString, rivers),
        ("Wells", GeometryKind::Point, wells),
    ];
    for (text, kind, props) in legend_items {
        session.add_legend_item(LegendItem::with_symbol(text, kind, props));
    }
    session.add_legend_item(LegendItem::new("Survey date: 2024", None));
    Ok(session)
}

async fn export_legend(config: &Config, output: &Path, ratio: f64) -> anyhow::Result<()> {
    let session = sample_session(config)?;
    let legend = session.legend().borrow().clone();
    let (width, height) = session.legend_renderer().legend_size(&legend, ratio);

    let target = shared(PixmapSurface::new(width.max(1), height.max(1))?);
    let outcomes = session
        .legend_renderer()
        .render_legend(&legend, &target, ratio)
        .wait()
        .await;
    info!("Legend drew {} symbol(s)", outcomes.len());

    target.borrow().save_png(output)?;
    println!("{} ({}x{})", output.display(), width, height);
    Ok(())
}

async fn export_symbol(
    config: &Config,
    kind: GeometryKind,
    props: &StyleProperties,
    ratio: f64,
    output: &Path,
) -> anyhow::Result<()> {
    let session = EditorSession::new(config);
    let style = session.style_factory().get_for_properties(props, kind, ratio);
    let size = cartokit::editor::render::symbol_size_for_style(&style, kind, ratio);

    let target = shared(PixmapSurface::new(
        size.width.ceil() as u32,
        size.height.ceil() as u32,
    )?);
    let outcome = render_symbol(&style, kind, &target, ratio).await;
    info!("Symbol outcome: {:?}", outcome);

    target.borrow().save_png(output)?;
    println!("{}", output.display());
    Ok(())
}

fn print_catalog(config: &Config, ratio: f64, json: bool) -> anyhow::Result<()> {
    let session = sample_session(config)?;
    if (ratio - 1.0).abs() > f64::EPSILON {
        // Feature styles are resolved at ratio 1; build the requested ratio too.
        for feature in session.layer().borrow().features() {
            let feature = feature.borrow();
            session.style_factory().get_for_feature(&feature, ratio);
        }
    }
    let catalog = session.style_factory().get_available_styles(ratio);

    if json {
        let entries: Vec<serde_json::Value> = catalog
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "id": entry.id,
                    "geometry": entry.geometry,
                    "ratio": entry.ratio,
                    "properties": entry.properties,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &catalog {
            println!(
                "{:<18} {}",
                entry.geometry.name(),
                serde_json::to_string(&entry.properties)?
            );
        }
    }
    Ok(())
}

fn export_preview(
    config: &Config,
    output: &Path,
    width: u32,
    height: u32,
    ratio: f64,
) -> anyhow::Result<()> {
    let session = sample_session(config)?;
    let layer = session.layer().borrow();
    let extent = layer
        .extent()
        .ok_or_else(|| anyhow!("sample layer is empty"))?;

    let mut surface = PixmapSurface::new(width, height)?;
    surface.fill(parse_color("#FFFFFF")?);
    let view = ViewTransform::fit(extent, width, height, 16.0 * ratio);
    let stats = render_features(&mut surface, &layer, session.style_factory(), &view, ratio);
    info!(
        "Preview: {} feature(s), {} style(s) drawn, {} deferred",
        stats.features, stats.styles_drawn, stats.styles_deferred
    );

    surface.save_png(output)?;
    println!("{} ({}x{})", output.display(), width, height);
    Ok(())
}
