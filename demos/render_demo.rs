//! Renders a synthetic CT volume (a solid sphere inside a cube of air)
//! and writes the result as a PGM image. Not part of the library; a
//! worked example of driving `DrrEngine` end to end.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use argh::FromArgs;
use drrgen::DrrEngine;

/// Render a digitally reconstructed radiograph of a synthetic sphere volume.
#[derive(FromArgs)]
struct Args {
    /// voxel grid side length
    #[argh(option, default = "64")]
    dim: usize,

    /// detector side length in pixels
    #[argh(option, default = "256")]
    detector: usize,

    /// source-to-detector distance in millimetres
    #[argh(option, default = "1000.0")]
    sdd: f64,

    /// gantry angle in degrees
    #[argh(option, default = "0.0")]
    gantry_deg: f64,

    /// output PGM path
    #[argh(option, default = "PathBuf::from(\"drr.pgm\")")]
    out: PathBuf,
}

fn synthetic_sphere(dim: usize) -> Vec<i16> {
    let centre = (dim as f64 - 1.0) / 2.0;
    let radius = dim as f64 / 3.0;
    let mut data = vec![0i16; dim * dim * dim];
    for k in 0..dim {
        for j in 0..dim {
            for i in 0..dim {
                let (dx, dy, dz) = (i as f64 - centre, j as f64 - centre, k as f64 - centre);
                let inside = dx * dx + dy * dy + dz * dz <= radius * radius;
                data[i + j * dim + k * dim * dim] = if inside { 1500 } else { 0 };
            }
        }
    }
    data
}

fn write_pgm(path: &PathBuf, image: &drrgen::Image) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "P5\n{} {}\n255", image.width, image.height)?;
    w.write_all(&image.data)?;
    Ok(())
}

fn main() -> Result<()> {
    simplelog::TermLogger::init(
        log::LevelFilter::Warn,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .ok();

    let args: Args = argh::from_env();

    let engine = DrrEngine::new();
    engine.set_volume(synthetic_sphere(args.dim), (args.dim, args.dim, args.dim), None);
    engine.set_detector((args.detector, args.detector), (1.0, 1.0));
    engine.set_optics(args.sdd, 0.0);
    engine.set_pose(args.gantry_deg.to_radians(), [0.0; 3], [0.0; 3]);

    let image = engine.render();
    for diag in engine.take_diagnostics() {
        log::warn!("{diag}");
    }
    write_pgm(&args.out, &image)?;
    println!("wrote {}", args.out.display());
    Ok(())
}
