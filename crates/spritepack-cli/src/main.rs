use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{ImageReader, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use spritepack_core::{InputSprite, PackerConfig, SpritePackError, pack_sprites};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "spritepack",
    about = "Combine sprite images into a single atlas texture",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
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
    /// Pack a folder of images into one atlas PNG
    Pack(PackArgs),
    /// Write solid-colour test images of random sizes
    Generate(GenerateArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Image file or folder containing images
    #[arg(value_name = "FOLDER", help_heading = "Input/Output")]
    input: PathBuf,
    /// Walk into sub-folders (otherwise only the top level is read)
    #[arg(short, long, default_value_t = false, help_heading = "Input/Output")]
    recursive: bool,
    /// Filename of the output atlas image
    #[arg(short, long, default_value = "out.png", help_heading = "Input/Output")]
    name: PathBuf,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Width of the output image
    #[arg(short = 'W', long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Height of the output image
    #[arg(short = 'H', long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Padded pixels around each image
    #[arg(short, long, default_value_t = 0, help_heading = "Layout")]
    padding: u32,
    /// Outline every partition node (red/green/blue by depth)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    debug_overlay: bool,

    // Export
    /// Write the sprite layout as JSON to this file
    #[arg(long, help_heading = "Export")]
    metadata: Option<PathBuf>,
    /// Layout JSON shape: json-array | json-hash
    #[arg(long, value_parser = ["json-array", "json-hash"], default_value = "json-array", help_heading = "Export")]
    metadata_format: String,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
    /// Directory to write images into
    out_dir: PathBuf,
    /// Number of images to create
    #[arg(short, long, default_value_t = 5)]
    count: u32,
    /// Minimum width
    #[arg(long, default_value_t = 25)]
    min_w: u32,
    /// Minimum height
    #[arg(long, default_value_t = 25)]
    min_h: u32,
    /// Maximum width
    #[arg(long, default_value_t = 50)]
    max_w: u32,
    /// Maximum height
    #[arg(long, default_value_t = 50)]
    max_h: u32,
    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Generate(args) => run_generate(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = PackerConfig {
        width: cli.width,
        height: cli.height,
        padding: cli.padding,
        debug_overlay: cli.debug_overlay,
        ..Default::default()
    };
    // Config file values win over CLI flags
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_packer_config(base)
    } else {
        base
    };

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }
    cfg.validate()?;

    let paths = gather_paths(&cli.input, cli.recursive, &cli.include, &cli.exclude)?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    if inputs.is_empty() {
        warn!(input = ?cli.input, "no images found; atlas will be blank");
    }
    info!(count = inputs.len(), "packing images");

    let keys: Vec<String> = inputs.iter().map(|s| s.key.clone()).collect();
    let out = match pack_sprites(inputs, &cfg) {
        Ok(out) => out,
        Err(SpritePackError::NoSpace {
            index,
            width,
            height,
        }) => {
            let key = keys.get(index).map(String::as_str).unwrap_or("<unknown>");
            anyhow::bail!(
                "atlas {}x{} is out of space at {} ({}x{}); try a larger --width/--height",
                cfg.width,
                cfg.height,
                key,
                width,
                height
            );
        }
        Err(e) => return Err(e.into()),
    };

    let stats = out.stats();
    info!(
        sprites = stats.num_sprites,
        used_area = stats.used_area,
        atlas_area = stats.atlas_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    if cli.dry_run {
        println!("{}", stats.summary());
        return Ok(());
    }

    out.rgba
        .save(&cli.name)
        .with_context(|| format!("write {}", cli.name.display()))?;
    info!(path = ?cli.name, width = cfg.width, height = cfg.height, "atlas written");

    if let Some(meta_path) = &cli.metadata {
        let value = match cli.metadata_format.as_str() {
            "json-hash" => spritepack_core::to_json_hash(&out.layout),
            _ => spritepack_core::to_json_array(&out.layout),
        };
        fs::write(meta_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", meta_path.display()))?;
        info!(path = ?meta_path, "layout written");
    }
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    if args.min_w > args.max_w || args.min_h > args.max_h {
        anyhow::bail!(
            "minimum size ({}, {}) exceeds maximum size ({}, {})",
            args.min_w,
            args.min_h,
            args.max_w,
            args.max_h
        );
    }
    if args.min_w == 0 || args.min_h == 0 {
        anyhow::bail!("image sizes must be at least 1x1");
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    let out_dir = fs::canonicalize(&args.out_dir)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    for i in 0..args.count {
        let w = rng.gen_range(args.min_w..=args.max_w);
        let h = rng.gen_range(args.min_h..=args.max_h);
        let colour: u32 = rng.gen_range(0..=0xFF_FFFF);
        let [_, r, g, b] = colour.to_be_bytes();
        let img = RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]));

        let path = out_dir.join(format!("{:03}.png", i));
        img.save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        println!("{} ({}, {}) colour:0x{:06x}", path.display(), w, h, colour);
    }
    Ok(())
}

fn gather_paths(
    path: &Path,
    recursive: bool,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        if !path.is_dir() {
            anyhow::bail!("input folder {} does not exist", path.display());
        }
        let walker = if recursive {
            WalkDir::new(path)
        } else {
            WalkDir::new(path).max_depth(1)
        };
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    // Directory order is platform dependent; packing ties depend on input order.
    list.sort();
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg")
    )
}

fn load_images_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<InputSprite>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        tracing::trace!(?p, "loading");
        match load_image(p) {
            Ok(img) => {
                let key = p.to_string_lossy().replace('\\', "/");
                list.push(InputSprite::from_dynamic(key, img));
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<image::DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
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

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<u32>,
    height: Option<u32>,
    padding: Option<u32>,
    debug_overlay: Option<bool>,
    background: Option<[u8; 4]>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.debug_overlay {
            cfg.debug_overlay = v;
        }
        if let Some(v) = self.background {
            cfg.background = v;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_only_present_keys() {
        let y: YamlConfig = serde_yaml::from_str("padding: 4\nbackground: [0, 0, 0, 0]\n").unwrap();
        let cfg = y.into_packer_config(PackerConfig {
            width: 256,
            height: 128,
            ..Default::default()
        });
        assert_eq!(cfg.width, 256);
        assert_eq!(cfg.height, 128);
        assert_eq!(cfg.padding, 4);
        assert_eq!(cfg.background, [0, 0, 0, 0]);
        assert!(!cfg.debug_overlay);
    }

    #[test]
    fn only_png_and_jpeg_are_images() {
        assert!(is_image(Path::new("a/b.png")));
        assert!(is_image(Path::new("a/b.JPG")));
        assert!(is_image(Path::new("b.jpeg")));
        assert!(!is_image(Path::new("b.gif")));
        assert!(!is_image(Path::new("README")));
    }

    #[test]
    fn exclude_wins_over_include() {
        let mut inc = GlobSetBuilder::new();
        inc.add(Glob::new("**/*.png").unwrap());
        let inc = inc.build().unwrap();
        let mut exc = GlobSetBuilder::new();
        exc.add(Glob::new("**/skip/**").unwrap());
        let exc = exc.build().unwrap();

        assert!(!should_skip(Path::new("art/a.png"), Some(&inc), Some(&exc)));
        assert!(should_skip(Path::new("art/skip/a.png"), Some(&inc), Some(&exc)));
        assert!(should_skip(Path::new("art/a.jpg"), Some(&inc), None));
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spritepack-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sprite_tree(name: &str) -> PathBuf {
        let root = scratch_dir(name);
        fs::create_dir_all(root.join("sub")).unwrap();
        for file in ["b.png", "a.PNG", "notes.txt", "sub/c.jpg", "sub/d.gif"] {
            fs::write(root.join(file), b"").unwrap();
        }
        root
    }

    fn relative(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn top_level_only_without_recursive() {
        let root = sprite_tree("flat");
        let paths = gather_paths(&root, false, &[], &[]).unwrap();
        assert_eq!(relative(&root, &paths), vec!["a.PNG", "b.png"]);
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn recursive_walks_sub_folders_in_sorted_order() {
        let root = sprite_tree("deep");
        let paths = gather_paths(&root, true, &[], &[]).unwrap();
        assert_eq!(relative(&root, &paths), vec!["a.PNG", "b.png", "sub/c.jpg"]);

        let excluded = gather_paths(&root, true, &[], &["**/sub/**".to_string()]).unwrap();
        assert_eq!(relative(&root, &excluded), vec!["a.PNG", "b.png"]);
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_input_folder_is_an_error() {
        let root = scratch_dir("missing").join("nope");
        assert!(gather_paths(&root, false, &[], &[]).is_err());
    }

    fn generate_args(out_dir: PathBuf, seed: u64) -> GenerateArgs {
        GenerateArgs {
            out_dir,
            count: 4,
            min_w: 3,
            min_h: 2,
            max_w: 6,
            max_h: 5,
            seed: Some(seed),
        }
    }

    fn generated_sizes(dir: &Path) -> Vec<(u32, u32)> {
        (0..4)
            .map(|i| {
                image::open(dir.join(format!("{:03}.png", i)))
                    .unwrap()
                    .to_rgba8()
                    .dimensions()
            })
            .collect()
    }

    #[test]
    fn generated_sizes_stay_in_inclusive_ranges() {
        let dir = scratch_dir("gen-range");
        run_generate(&generate_args(dir.clone(), 7)).unwrap();
        for (w, h) in generated_sizes(&dir) {
            assert!((3..=6).contains(&w), "width {w}");
            assert!((2..=5).contains(&h), "height {h}");
        }
        assert!(!dir.join("004.png").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn same_seed_writes_same_images() {
        let first = scratch_dir("gen-seed-a");
        let second = scratch_dir("gen-seed-b");
        run_generate(&generate_args(first.clone(), 42)).unwrap();
        run_generate(&generate_args(second.clone(), 42)).unwrap();
        for i in 0..4 {
            let name = format!("{:03}.png", i);
            let a = image::open(first.join(&name)).unwrap().to_rgba8();
            let b = image::open(second.join(&name)).unwrap().to_rgba8();
            assert_eq!(a, b, "{name}");
        }
        fs::remove_dir_all(&first).ok();
        fs::remove_dir_all(&second).ok();
    }

    #[test]
    fn generator_rejects_min_above_max() {
        let dir = scratch_dir("gen-bounds");
        let mut args = generate_args(dir.clone(), 1);
        args.min_w = 10;
        let err = run_generate(&args).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
        assert!(!dir.join("000.png").exists());
        fs::remove_dir_all(&dir).ok();
    }
}
