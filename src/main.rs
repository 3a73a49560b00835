use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use memmap2::Mmap;
use rootcause::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use studiomodel::models::ParseOptions;
use studiomodel::models::accessors;
use studiomodel::models::assets::ModelAssets;

/// Inspect a compiled studio model and its vertex and strip files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Vertex file. Defaults to the model path with a `.vvd` extension
    #[clap(long)]
    vvd: Option<PathBuf>,

    /// Strip file. Defaults to the model path with a `.dx90.vtx` extension
    #[clap(long)]
    vtx: Option<PathBuf>,

    /// Most detailed LOD to reconstruct vertices for
    #[clap(long, default_value_t = 0)]
    root_lod: usize,

    /// Print the decoded files as JSON instead of a summary
    #[clap(long)]
    json: bool,

    /// .mdl file
    mdl: PathBuf,
}

fn map_file(path: &Path) -> Result<Mmap, Report> {
    let file = File::open(path).context_with(|| format!("Failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .context_with(|| format!("Failed to map {}", path.display()))?;
    Ok(mmap)
}

fn print_summary(assets: &ModelAssets) -> Result<(), Report> {
    let model = assets.model();
    let header = model.header();
    println!("{} (version {}, checksum {})", header.name, header.version, assets.checksum());
    println!(
        "  {} bones, {} textures, {} skin families",
        model.bones().len(),
        model.textures().len(),
        model.skin_family_count()
    );
    for dir in model.normalised_texture_directories() {
        println!("  texture directory: {dir}");
    }
    println!(
        "  {} vertices over {} LODs",
        assets.vertex_count(),
        assets.lod_count()
    );

    for (descriptor_part, strip_part) in assets.body_parts() {
        println!("  body part {:?}", descriptor_part.name);
        accessors::for_each_model(descriptor_part, strip_part, |model, strip_model| {
            println!("    model {:?}: {} meshes", model.name, model.meshes.len());
            for (lod, strip_lod) in strip_model.lods.iter().enumerate() {
                let mut strips = 0;
                let mut indices = 0;
                accessors::for_each_mesh(model, strip_lod, |_, strip_mesh| {
                    for group in &strip_mesh.strip_groups {
                        strips += group.strips.len();
                        indices += group.indices.len();
                    }
                    Ok(())
                })?;
                println!(
                    "      LOD {lod} (switch point {}): {strips} strips, {indices} indices",
                    strip_lod.switch_point
                );
            }
            Ok(())
        })
        .context_with(|| format!("Body part {:?} does not match its strips", descriptor_part.name))?;
    }

    for lod in 0..usize::try_from(assets.lod_count()).unwrap_or(0) {
        let replacements = assets
            .strip_file()
            .material_replacements(lod)
            .context("Failed to read material replacements")?;
        for replacement in replacements {
            println!(
                "  LOD {lod} replaces material {} with {:?}",
                replacement.material_id, replacement.name
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Report> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let vvd_path = args
        .vvd
        .clone()
        .unwrap_or_else(|| args.mdl.with_extension("vvd"));
    let vtx_path = args
        .vtx
        .clone()
        .unwrap_or_else(|| args.mdl.with_extension("dx90.vtx"));

    let model = map_file(&args.mdl)?;
    let vertex = map_file(&vvd_path)?;
    let strip = map_file(&vtx_path)?;
    info!(mdl = %args.mdl.display(), vvd = %vvd_path.display(), vtx = %vtx_path.display(), "loading model");

    let options = ParseOptions::builder().root_lod(args.root_lod).build();
    let assets = ModelAssets::parse(&model, &vertex, &strip, &options)
        .context_with(|| format!("Failed to load {}", args.mdl.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&assets).context("Failed to serialize model")?;
        println!("{json}");
    } else {
        print_summary(&assets)?;
    }

    Ok(())
}
