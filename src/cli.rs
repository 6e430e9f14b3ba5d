use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser};
use eyre::{eyre, WrapErr};

use gif2spr::{
    config::{parse_config_from_file, RawOptions},
    Gif2SprBuilder, Gif2SprError, Gif2SprOptions,
};
use spr::Spr;

pub enum CliRes {
    Ok,
    Err,
}

#[derive(Debug, Parser)]
#[command(version, about = "Converts an animated GIF into a Quake or Half-Life sprite", long_about = None)]
pub struct Gif2SprCli {
    /// Path to .gif
    gif: PathBuf,
    /// Path to the .spr to write
    spr: PathBuf,
    /// Sprite origin as fractions of the canvas, from the upper left corner
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    origin: Option<String>,
    /// Raw 768 byte palette for quake sprites
    #[arg(short, long)]
    palette: Option<PathBuf>,
    /// vp-parallel-upright, upright, vp-parallel, oriented or vp-parallel-oriented
    #[arg(short, long)]
    alignment: Option<String>,
    /// quake or half-life
    #[arg(short, long)]
    format: Option<String>,
    /// normal, additive, index-alpha or alpha-test. Half-Life only
    #[arg(short, long)]
    blend: Option<String>,
    /// Color of index-alpha sprites
    #[arg(long, value_name = "R,G,B")]
    tint: Option<String>,
    /// synchronized or random
    #[arg(long)]
    sync: Option<String>,
    /// group puts every GIF frame into one frame, single makes one frame each
    #[arg(long)]
    frames: Option<String>,
    /// Keeps the whole canvas for every frame
    #[arg(long)]
    no_crop: bool,
    /// Also exports every sprite image as .png into this folder
    #[arg(long, value_name = "DIR")]
    dump_png: Option<PathBuf>,
    /// Options file. Flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Only prints warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Gif2SprCli {
    fn raw_options(&self) -> RawOptions {
        RawOptions {
            origin: self.origin.clone(),
            alignment: self.alignment.clone(),
            format: self.format.clone(),
            blend: self.blend.clone(),
            tint: self.tint.clone(),
            sync: self.sync.clone(),
            frames: self.frames.clone(),
            crop: self.no_crop.then_some(false),
            palette: self.palette.clone(),
        }
    }

    fn options(&self) -> Result<Gif2SprOptions, Gif2SprError> {
        let file = match &self.config {
            Some(path) => parse_config_from_file(path)?,
            None => RawOptions::default(),
        };

        Gif2SprOptions::try_from(file.merge(self.raw_options()))
    }
}

pub fn cli(args: Gif2SprCli) -> CliRes {
    match run(&args) {
        Ok(_) => CliRes::Ok,
        Err(err) => {
            let is_configuration = err
                .downcast_ref::<Gif2SprError>()
                .is_some_and(Gif2SprError::is_configuration);

            eprintln!("Error: {:#}", err);

            if is_configuration {
                eprintln!();
                let _ = Gif2SprCli::command().print_help();
            }

            CliRes::Err
        }
    }
}

fn run(args: &Gif2SprCli) -> eyre::Result<()> {
    let options = args.options()?;
    let spr = Gif2SprBuilder::from(options).work(&args.gif, &args.spr)?;

    if let Some(dir) = &args.dump_png {
        dump_png(&spr, args, dir)?;
    }

    Ok(())
}

/// `<spr stem>_<frame>_<image>.png` for every image.
fn dump_png(spr: &Spr, args: &Gif2SprCli, dir: &Path) -> eyre::Result<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("Cannot create {}", dir.display()))?;

    let stem = args
        .spr
        .file_stem()
        .ok_or_else(|| eyre!("Sprite path has no file name"))?
        .to_string_lossy();

    for (frame_index, frame) in spr.frames.iter().enumerate() {
        for (image_index, image) in frame.images().iter().enumerate() {
            if image.width == 0 || image.height == 0 {
                warn!("Frame {frame_index} image {image_index} is empty, not exported.");
                continue;
            }

            let path = dir.join(format!("{stem}_{frame_index}_{image_index}.png"));

            spr.to_rgba8(image)
                .save(&path)
                .wrap_err_with(|| format!("Cannot write {}", path.display()))?;

            debug!("Wrote {}", path.display());
        }
    }

    info!("Exported images to {}", dir.display());

    Ok(())
}
