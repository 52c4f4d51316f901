use clap::{Parser, Subcommand};
use cube_vision::detector::{HarrisDetector, Selection, select_quadrilateral};
use cube_vision::pipeline::process_face;
use cube_vision::tools::{dominant_channels, gray_stats, load_bgr, save_bgr, save_gray};
use cube_vision::utils::color_space::to_gray;
use cube_vision::utils::filters::gaussian_blur;
use cube_vision::utils::gradient::canny;
use cube_vision::utils::threshold::adaptive_threshold;
use cube_vision::{CubeScanner, Face, PipelineContext, ScanConfig, logger};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cubescan", version, about = "Read a Rubik's cube from six face photos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan all six faces and write the cube string
    Scan {
        #[arg(long)]
        mid: PathBuf,
        #[arg(long)]
        bot: PathBuf,
        #[arg(long)]
        back: PathBuf,
        #[arg(long)]
        top: PathBuf,
        #[arg(long)]
        right: PathBuf,
        #[arg(long)]
        left: PathBuf,
        /// Cube string destination
        #[arg(long, default_value = "CubeString.txt")]
        output: PathBuf,
        /// Directory for canny/harris/cropped/threshold images
        #[arg(long)]
        artifacts: Option<PathBuf>,
        #[arg(long)]
        sequential: bool,
    },
    /// Print Harris corners and the selected face outline
    Corners {
        #[arg(long)]
        image: PathBuf,
    },
    /// Rectify and classify a single face
    Face {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "mid")]
        face: Face,
        /// Where to save the rectified face
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Save the Canny edge map of an image
    Edges {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Save a local-mean threshold with this window instead
        #[arg(long)]
        adaptive: Option<usize>,
    },
    /// Print grayscale and per-channel statistics
    Stats {
        #[arg(long)]
        image: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    let cli = Cli::parse();
    let config = ScanConfig::from_env();

    match cli.command {
        Command::Scan {
            mid,
            bot,
            back,
            top,
            right,
            left,
            output,
            artifacts,
            sequential,
        } => {
            let paths = [
                (Face::Mid, mid),
                (Face::Bot, bot),
                (Face::Back, back),
                (Face::Top, top),
                (Face::Right, right),
                (Face::Left, left),
            ];
            let mut scanner = CubeScanner::with_config(config).output(&output).sequential(sequential);
            if let Some(dir) = artifacts {
                scanner = scanner.artifacts(dir);
            }
            let report = scanner.scan_files(&paths)?;
            println!("{}", report.cube);
            println!("Saved to {} in {:.2?}", output.display(), report.elapsed);
        }
        Command::Corners { image } => corners_cmd(&image, &config)?,
        Command::Face { image, face, out } => face_cmd(&image, face, out.as_deref(), config)?,
        Command::Edges { image, out, adaptive } => {
            let bgr = load_bgr(&image)?;
            let blurred = gaussian_blur(&bgr, config.pre_blur.size, config.pre_blur.sigma, config.border);
            let edges = match adaptive {
                Some(dim) => adaptive_threshold(&to_gray(&blurred), dim, config.adaptive_bias),
                None => canny(&blurred, config.canny_blur, config.canny_low, config.canny_high, config.border),
            };
            save_gray(&out, &edges)?;
            println!("Set pixels: {}", edges.count_set());
        }
        Command::Stats { image } => {
            let bgr = load_bgr(&image)?;
            let stats = gray_stats(&to_gray(&bgr));
            let [b, g, r] = dominant_channels(&bgr);
            println!("Image: {} ({}x{})", image.display(), bgr.width(), bgr.height());
            println!("Gray min={} max={} avg={}", stats.min, stats.max, stats.avg);
            println!("Dominant B={} G={} R={}", b, g, r);
        }
    }

    Ok(())
}

fn corners_cmd(image: &Path, config: &ScanConfig) -> Result<(), Box<dyn Error>> {
    let bgr = load_bgr(image)?;
    let start = Instant::now();
    let blurred = gaussian_blur(&bgr, config.pre_blur.size, config.pre_blur.sigma, config.border);
    let edges = canny(&blurred, config.canny_blur, config.canny_low, config.canny_high, config.border);
    let corners = HarrisDetector::new(config.harris).with_border(config.border).detect(&edges);

    println!("Image: {} ({}x{})", image.display(), bgr.width(), bgr.height());
    println!("Found {} corners in {:.2?}", corners.len(), start.elapsed());
    for (i, c) in corners.iter().enumerate() {
        println!("  {:>3}: ({}, {}) response={:.3e}", i, c.x, c.y, c.response);
    }
    match select_quadrilateral(&corners) {
        Selection::Quad(q) => println!(
            "Outline: tl=({:.0}, {:.0}) tr=({:.0}, {:.0}) br=({:.0}, {:.0}) bl=({:.0}, {:.0}) score={:.3}",
            q.top_left.x,
            q.top_left.y,
            q.top_right.x,
            q.top_right.y,
            q.bottom_right.x,
            q.bottom_right.y,
            q.bottom_left.x,
            q.bottom_left.y,
            q.score()
        ),
        Selection::Degenerate(raw) => println!("No outline: {} usable corners", raw.len()),
    }
    Ok(())
}

fn face_cmd(image: &Path, face: Face, out: Option<&Path>, config: ScanConfig) -> Result<(), Box<dyn Error>> {
    let bgr = load_bgr(image)?;
    let ctx = PipelineContext::new(config);
    let result = process_face(&ctx, face, &bgr)?;
    println!("{}: {}", face, result.letters);
    for row in 0..3 {
        println!(
            "  {} {} {}",
            result.letters.get(row, 0),
            result.letters.get(row, 1),
            result.letters.get(row, 2)
        );
    }
    if let Some(path) = out {
        save_bgr(path, &result.rectified)?;
        println!("Rectified face saved to {}", path.display());
    }
    Ok(())
}
