//! `fetch` subcommand: runs one query against an EPT dataset and writes the
//! clipped, merged point cloud to a `.laz` file.
//!
//! Mirrors `original_source/sync_main.py`/`async_main.py`'s hard-coded
//! example query in its `--help` defaults, never as a silent fallback —
//! every run requires an explicit `--url`.

use std::path::PathBuf;

use clap::Parser;
use ept::{BoundingBox2D, BoundingBox3D, DepthRange, EptResource, QueryBounds, QueryParams};

/// Query an EPT dataset and write the clipped, merged result to a LAZ file.
#[derive(Parser, Debug)]
pub struct Args {
    /// Root URL or path of the EPT dataset (e.g.
    /// `https://na-c.entwine.io/autzen` or `s3://bucket/prefix` or a local
    /// directory).
    #[arg(long, env = "EPT_URL")]
    url: String,

    /// Query bounds as `xmin,ymin,xmax,ymax` or
    /// `xmin,ymin,zmin,xmax,ymax,zmax`.
    #[arg(long, value_delimiter = ',')]
    bounds: Vec<f64>,

    /// Minimum octree depth to include (inclusive).
    #[arg(long, default_value_t = 0)]
    depth_min: i64,

    /// Maximum octree depth to include (inclusive, per `is_deeper`'s
    /// contract — see spec.md §9).
    #[arg(long)]
    depth_max: Option<i64>,

    /// Bounded concurrency for hierarchy and tile fetches.
    #[arg(long, env = "EPT_CONCURRENCY", default_value_t = ept::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Write LAS (uncompressed) instead of LAZ.
    #[arg(long)]
    uncompressed: bool,

    /// Use the blocking facade (thread-pool driven) instead of the async core.
    #[arg(long)]
    blocking: bool,

    /// Output LAZ/LAS path.
    #[arg(short, long)]
    output: PathBuf,
}

impl Args {
    /// Whether `--blocking` was passed (checked by `main` before it decides
    /// whether this invocation needs a Tokio runtime at all).
    pub fn blocking(&self) -> bool {
        self.blocking
    }
}

fn parse_bounds(raw: &[f64]) -> Result<QueryBounds, Box<dyn std::error::Error>> {
    match raw {
        [xmin, ymin, xmax, ymax] => {
            Ok(QueryBounds::Two(BoundingBox2D::from_corners(*xmin, *ymin, *xmax, *ymax)?))
        }
        [xmin, ymin, zmin, xmax, ymax, zmax] => Ok(QueryBounds::Three(BoundingBox3D::from_corners(
            *xmin, *ymin, *zmin, *xmax, *ymax, *zmax,
        )?)),
        _ => Err(format!(
            "--bounds must have 4 (2D) or 6 (3D) comma-separated numbers, got {}",
            raw.len()
        )
        .into()),
    }
}

fn params_and_resource(args: &Args) -> Result<(QueryParams, EptResource), Box<dyn std::error::Error>> {
    let bounds = parse_bounds(&args.bounds)?;
    let depth_range = DepthRange::new(args.depth_min, args.depth_max)?;
    let params = QueryParams::new(bounds, depth_range);
    let resource = EptResource::with_concurrency(&args.url, args.concurrency)?;
    Ok((params, resource))
}

/// The async entry point: runs the query on the caller's Tokio runtime.
pub async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (params, resource) = params_and_resource(&args)?;

    let cloud = resource.query(&params).await?;

    log::info!("writing {} point(s) to {}", cloud.len(), args.output.display());
    let bytes = cloud.encode(!args.uncompressed)?;
    tokio::fs::write(&args.output, &bytes).await?;

    Ok(())
}

/// The synchronous entry point (spec.md §9's "thin blocking facade... for
/// CLI use"). Must be called from a thread with no Tokio runtime context —
/// `BlockingEptResource` drives its own runtime via `block_on` internally,
/// so nesting it inside one panics.
pub fn run_blocking(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (params, resource) = params_and_resource(&args)?;

    let cloud = resource.blocking().query(&params)?;

    log::info!("writing {} point(s) to {}", cloud.len(), args.output.display());
    let bytes = cloud.encode(!args.uncompressed)?;
    std::fs::write(&args.output, &bytes)?;

    Ok(())
}
