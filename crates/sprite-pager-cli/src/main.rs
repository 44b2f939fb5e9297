use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use handlebars::Handlebars;
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use sprite_pager_core::config::PackMode;
use sprite_pager_core::descriptor::{Canvas, page_file_name, write_descriptor};
use sprite_pager_core::{Atlas, PackerConfig, SpriteInput, pack_sprites};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sprite-pager",
    about = "Lay out sprite rectangles onto atlas pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a spinner while packing (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a sprite manifest and write the descriptor/JSON metadata
    Pack(PackArgs),
    /// Render a Handlebars template (forces --metadata template)
    Template(PackArgs),
    /// Simple timing bench (packs the manifest, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Sprite manifest (YAML or JSON): a list of sprites or `{ sprites: [...] }`
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.atlas, name.png, ...)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (values override the command-line options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Max page width
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_width: u32,
    /// Max page height
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_height: u32,
    /// Min page width
    #[arg(long, default_value_t = 16, help_heading = "Layout")]
    min_width: u32,
    /// Min page height
    #[arg(long, default_value_t = 16, help_heading = "Layout")]
    min_height: u32,
    /// Search power-of-two page sizes only
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Layout")]
    pow2: bool,
    /// Force square page images
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    square: bool,

    // Padding/Rotation
    /// Pixels right of every sprite
    #[arg(long, default_value_t = 2, help_heading = "Padding/Rotation")]
    padding_x: u32,
    /// Pixels below every sprite
    #[arg(long, default_value_t = 2, help_heading = "Padding/Rotation")]
    padding_y: u32,
    /// Repeat padding around the page edge
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Padding/Rotation")]
    edge_padding: bool,
    /// Padding is filled by duplicating edge pixels (halves the edge pad)
    #[arg(long, default_value_t = false, help_heading = "Padding/Rotation")]
    duplicate_padding: bool,
    /// Allow rotation (90deg) for sprites that permit it
    #[arg(long, default_value_t = false, action=ArgAction::Set, help_heading = "Padding/Rotation")]
    allow_rotation: bool,

    // Search
    /// Pack mode: exhaustive | fast
    #[arg(long, default_value = "exhaustive", help_heading = "Search")]
    mode: String,
    /// Early stop window of the non power-of-two size search (default 15/25 by mode)
    #[arg(long, help_heading = "Search")]
    fuzziness: Option<u32>,
    /// Evaluate heuristics in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Search")]
    parallel: bool,

    // Export
    /// Metadata format: descriptor | json-array | json (alias) | json-hash | template
    #[arg(long, default_value = "descriptor", help_heading = "Export")]
    metadata: String,
    /// Template file (handlebars), used when --metadata template
    #[arg(long, help_heading = "Export")]
    template: Option<PathBuf>,
    /// Also write a layout PNG per page with magenta sprite outlines
    #[arg(long, default_value_t = false, help_heading = "Export")]
    debug_png: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Sprite manifest (YAML or JSON)
    input: PathBuf,
    /// Pack mode: exhaustive | fast
    #[arg(long, default_value = "exhaustive")]
    mode: String,
    /// Max page size (square)
    #[arg(long, default_value_t = 1024)]
    max_size: u32,
    /// Allow rotation
    #[arg(long, default_value_t = false)]
    allow_rotation: bool,
    /// Number of packing runs
    #[arg(long, default_value_t = 1)]
    runs: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Template(args) => {
            let mut a = args.clone();
            a.metadata = "template".into();
            run_pack(&a, cli.progress && !cli.quiet)
        }
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let mode = parse_mode(&cli.mode)?;
    let base = PackerConfig {
        max_width: cli.max_width,
        max_height: cli.max_height,
        min_width: cli.min_width,
        min_height: cli.min_height,
        padding_x: cli.padding_x,
        padding_y: cli.padding_y,
        edge_padding: cli.edge_padding,
        duplicate_padding: cli.duplicate_padding,
        allow_rotation: cli.allow_rotation,
        power_of_two: cli.pow2,
        square: cli.square,
        mode,
        fuzziness: cli.fuzziness,
        parallel: cli.parallel,
    };
    // config file values win over command-line options
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_packer_config(base)?
    } else {
        base
    };
    if cfg.parallel && !cfg.effective_parallel() {
        warn!("parallel requested but this build lacks the `parallel` feature; packing sequentially");
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let sprites = load_manifest(&cli.input)?;
    info!(count = sprites.len(), "loaded sprite manifest");
    let atlas = pack_with_progress(sprites, cfg, show_progress)?;

    let stats = atlas.stats();
    info!(
        pages = stats.num_pages,
        sprites = stats.num_sprites,
        aliases = stats.num_aliases,
        used_area = stats.used_area,
        total_area = stats.total_page_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    let page_names: Vec<String> = atlas
        .pages
        .iter()
        .map(|p| page_file_name(&cli.name, p.id, atlas.pages.len()))
        .collect();

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }

    match cli.metadata.as_str() {
        "descriptor" => {
            if !cli.dry_run {
                let path = cli.out_dir.join(format!("{}.atlas", cli.name));
                let file = fs::File::create(&path)
                    .with_context(|| format!("create {}", path.display()))?;
                write_descriptor(&atlas, &page_names, BufWriter::new(file))
                    .with_context(|| format!("write {}", path.display()))?;
                info!(?path, pages = atlas.pages.len(), "descriptor written");
            }
        }
        // Accept "json" as an alias of "json-array"
        "json-array" | "json" | "json-hash" => {
            if !cli.dry_run {
                let json_path = cli.out_dir.join(format!("{}.json", cli.name));
                let json_value = if cli.metadata == "json-hash" {
                    sprite_pager_core::to_json_hash(&atlas)
                } else {
                    sprite_pager_core::to_json_array(&atlas)
                };
                let json = sprite_pager_core::to_json_string(&json_value, true)?;
                fs::write(&json_path, json)
                    .with_context(|| format!("write {}", json_path.display()))?;
                info!(?json_path, pages = atlas.pages.len(), "atlas written");
            }
        }
        "template" => {
            let ctx = build_template_context(&atlas, &page_names);
            let tpl_owned_from_file: Option<String> = if let Some(path) = &cli.template {
                Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("read template {}", path.display()))?,
                )
            } else {
                None
            };
            let tpl_ref: &str = match &tpl_owned_from_file {
                Some(s) => s.as_str(),
                None => include_str!("templates/summary.hbs"),
            };

            let mut reg = Handlebars::new();
            reg.set_strict_mode(true);
            reg.register_template_string("tpl", tpl_ref)?;
            let rendered = reg.render("tpl", &ctx)?;

            if !cli.dry_run {
                let out_path = cli.out_dir.join(format!("{}.template.txt", cli.name));
                fs::write(&out_path, rendered)
                    .with_context(|| format!("write {}", out_path.display()))?;
                info!(?out_path, pages = atlas.pages.len(), "template written");
            } else {
                println!("{rendered}");
            }
        }
        other => anyhow::bail!("unknown metadata format: {}", other),
    }

    if cli.debug_png && !cli.dry_run {
        write_debug_pngs(&atlas, &cli.out_dir, &cli.name)?;
    }

    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::json!({
            "pages": stats.num_pages,
            "sprites": stats.num_sprites,
            "aliases": stats.num_aliases,
            "rotated": stats.num_rotated,
            "used_area": stats.used_area,
            "total_area": stats.total_page_area,
            "wasted_area": stats.wasted_area(),
            "occupancy": stats.occupancy,
        });
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    use std::time::Instant;
    let sprites = load_manifest(&b.input)?;
    let cfg = PackerConfig::builder()
        .with_max_dimensions(b.max_size, b.max_size)
        .allow_rotation(b.allow_rotation)
        .mode(parse_mode(&b.mode)?)
        .build();
    let runs = b.runs.max(1);
    let mut last = None;
    let start = Instant::now();
    for _ in 0..runs {
        last = Some(pack_sprites(sprites.clone(), cfg.clone())?);
    }
    let dur = start.elapsed() / runs;
    if let Some(atlas) = last {
        let stats = atlas.stats();
        println!(
            "pages={} occupancy={:.2}% time={}",
            stats.num_pages,
            stats.occupancy * 100.0,
            bench_fmt_dur(dur)
        );
    }
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn parse_mode(s: &str) -> anyhow::Result<PackMode> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown pack mode: {}", s))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<SpriteInput>),
    Doc { sprites: Vec<SpriteInput> },
}

fn load_manifest(path: &Path) -> anyhow::Result<Vec<SpriteInput>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read manifest {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let manifest: Manifest = if is_json {
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    };
    Ok(match manifest {
        Manifest::List(v) => v,
        Manifest::Doc { sprites } => sprites,
    })
}

fn pack_with_progress(
    sprites: Vec<SpriteInput>,
    cfg: PackerConfig,
    progress: bool,
) -> anyhow::Result<Atlas> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new_spinner();
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} packing {msg} [{elapsed_precise}]",
        )?);
        b.set_message(format!("{} sprites", sprites.len()));
        b.enable_steady_tick(Duration::from_millis(100));
        Some(b)
    } else {
        None
    };
    let result = pack_sprites(sprites, cfg);
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(result?)
}

/// One outline per sprite at its visible size, on a transparent canvas.
fn write_debug_pngs(atlas: &Atlas, out_dir: &Path, name: &str) -> anyhow::Result<()> {
    let (px, py) = atlas.meta.padding;
    let magenta = Rgba([255, 0, 255, 255]);
    let stem = format!("{name}_debug");
    for page in &atlas.pages {
        let canvas = Canvas::for_page(page, &atlas.meta);
        let mut img = RgbaImage::new(canvas.width, canvas.height);
        for s in &page.sprites {
            let (x, y) = canvas.sprite_origin(page, s);
            let w = s.width.saturating_sub(px);
            let h = s.height.saturating_sub(py);
            draw_outline(&mut img, x, y, w, h, magenta);
        }
        let png_path = out_dir.join(page_file_name(&stem, page.id, atlas.pages.len()));
        img.save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, id = page.id, "wrote debug page");
    }
    Ok(())
}

fn draw_outline(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    let (x2, y2) = (x + w - 1, y + h - 1);
    let mut put = |px: u32, py: u32| {
        if px < img.width() && py < img.height() {
            img.put_pixel(px, py, color);
        }
    };
    for i in x..=x2 {
        put(i, y);
        put(i, y2);
    }
    for j in y..=y2 {
        put(x, j);
        put(x2, j);
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Serialize)]
struct TemplateSprite {
    name: String,
    index: i32,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    rotated: bool,
    orig_w: u32,
    orig_h: u32,
    offset_x: u32,
    offset_y: u32,
}

#[derive(Serialize)]
struct TemplatePage {
    id: usize,
    image: String,
    width: u32,
    height: u32,
    occupancy: f64,
    sprites: Vec<TemplateSprite>,
}

#[derive(Serialize)]
struct TemplateContext {
    pages: Vec<TemplatePage>,
    meta: serde_json::Value,
}

fn build_template_context(atlas: &Atlas, page_names: &[String]) -> TemplateContext {
    let (px, py) = atlas.meta.padding;
    let mut pages: Vec<TemplatePage> = Vec::new();
    for (idx, page) in atlas.pages.iter().enumerate() {
        let canvas = Canvas::for_page(page, &atlas.meta);
        let image = page_names
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("page_{}.png", page.id));
        let mut sprites: Vec<TemplateSprite> = Vec::new();
        for s in &page.sprites {
            let (x, y) = canvas.sprite_origin(page, s);
            let entries = std::iter::once((&s.name, s.index, &s.region))
                .chain(s.aliases.iter().map(|a| (&a.name, a.index, &a.region)));
            for (name, index, region) in entries {
                sprites.push(TemplateSprite {
                    name: name.clone(),
                    index: index.unwrap_or(-1),
                    x,
                    y,
                    w: s.width.saturating_sub(px),
                    h: s.height.saturating_sub(py),
                    rotated: s.rotated,
                    orig_w: region.original_width,
                    orig_h: region.original_height,
                    offset_x: region.offset_x,
                    offset_y: region.offset_y,
                });
            }
        }
        pages.push(TemplatePage {
            id: page.id,
            image,
            width: canvas.width,
            height: canvas.height,
            occupancy: page.occupancy,
            sprites,
        });
    }
    let meta = serde_json::json!({
        "app": atlas.meta.app,
        "version": atlas.meta.version,
        "format": atlas.meta.format,
    });
    TemplateContext { pages, meta }
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_width: Option<u32>,
    max_height: Option<u32>,
    min_width: Option<u32>,
    min_height: Option<u32>,
    padding_x: Option<u32>,
    padding_y: Option<u32>,
    edge_padding: Option<bool>,
    duplicate_padding: Option<bool>,
    allow_rotation: Option<bool>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    mode: Option<String>,
    fuzziness: Option<u32>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.min_width {
            cfg.min_width = v;
        }
        if let Some(v) = self.min_height {
            cfg.min_height = v;
        }
        if let Some(v) = self.padding_x {
            cfg.padding_x = v;
        }
        if let Some(v) = self.padding_y {
            cfg.padding_y = v;
        }
        if let Some(v) = self.edge_padding {
            cfg.edge_padding = v;
        }
        if let Some(v) = self.duplicate_padding {
            cfg.duplicate_padding = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.square {
            cfg.square = v;
        }
        if let Some(v) = self.mode {
            cfg.mode = parse_mode(&v)?;
        }
        if let Some(v) = self.fuzziness {
            cfg.fuzziness = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
