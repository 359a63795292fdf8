//! `serve` subcommand: a small `axum` server reproducing spec.md §6's
//! server surface.
//!
//! spec.md marks the HTTP server facade as an external collaborator
//! ("reproduced for completeness", not a production deployment target),
//! so this module is deliberately small — no CORS layer, no tower
//! middleware stack — grounded loosely on `versatiles`'s `tile_server.rs`
//! only for the *shape* (router construction, a shared `Arc<AppState>`,
//! one handler per route), not its scale.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use ept::{BoundingBox2D, EptError, EptResource, QueryBounds, QueryParams, Registry};

/// Run a small HTTP server that resolves `{name}` to a dataset root via
/// `--root-template` and answers spec.md §6's two routes.
#[derive(Parser, Debug)]
pub struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: String,

    /// Dataset root URL template; `{name}` is substituted with the
    /// request's `name` path segment.
    #[arg(long, env = "EPT_ROOT_TEMPLATE", default_value = "https://na-c.entwine.io/{name}")]
    root_template: String,

    /// Bounded concurrency for hierarchy and tile fetches.
    #[arg(long, env = "EPT_CONCURRENCY", default_value_t = ept::DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

struct AppState {
    root_template: String,
    concurrency: usize,
    /// One [`EptResource`] per resolved dataset root, lifetime = process
    /// (spec.md §4.H/§9 "Global `RESOURCES` registry", grounded on
    /// `original_source/ept-server.py`'s module-level `RESOURCES` dict).
    resources: Registry<String, EptResource>,
}

impl AppState {
    fn resolve_root(&self, name: &str) -> String {
        self.root_template.replace("{name}", name)
    }

    async fn resource_for(&self, name: &str) -> Result<Arc<EptResource>, EptError> {
        let root = self.resolve_root(name);
        let concurrency = self.concurrency;
        self.resources
            .get_or_try_init(root.clone(), || async move {
                EptResource::with_concurrency(&root, concurrency)
            })
            .await
    }
}

/// Newtype so `EptError` can map to an HTTP status without the core crate
/// depending on `axum` (spec.md §7: "The server translates core errors
/// into HTTP status codes (out of scope here)" — this mapping lives
/// entirely in `ept-cli`).
struct ServeError(EptError);

impl From<EptError> for ServeError {
    fn from(err: EptError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EptError::FetchFailed { .. } | EptError::UnknownScheme(_) => StatusCode::NOT_FOUND,
            EptError::InvalidBounds(..) | EptError::InvalidDepth(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

async fn info_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ServeError> {
    let resource = state.resource_for(&name).await?;
    Ok(Json(resource.info().await?.raw().clone()))
}

fn parse_bounds(raw: &str) -> Result<QueryBounds, EptError> {
    let parts: Result<Vec<f64>, _> = raw.split(',').map(str::parse::<f64>).collect();
    let parts = parts.map_err(|_| EptError::InvalidBounds([0.0; 3], [0.0; 3]))?;
    match parts.as_slice() {
        [xmin, ymin, xmax, ymax] => {
            Ok(QueryBounds::Two(BoundingBox2D::from_corners(*xmin, *ymin, *xmax, *ymax)?))
        }
        [xmin, ymin, zmin, xmax, ymax, zmax] => Ok(QueryBounds::Three(
            ept::BoundingBox3D::from_corners(*xmin, *ymin, *zmin, *xmax, *ymax, *zmax)?,
        )),
        _ => Err(EptError::InvalidBounds([0.0; 3], [0.0; 3])),
    }
}

async fn read_handler(
    State(state): State<Arc<AppState>>,
    Path((name, bounds)): Path<(String, String)>,
) -> Result<Response, ServeError> {
    let resource = state.resource_for(&name).await?;
    let bounds = parse_bounds(&bounds)?;
    let params = QueryParams::new(bounds, ept::DepthRange::default());

    let cloud = resource.query(&params).await?;
    let bytes = cloud.encode(true)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes.to_vec(),
    )
        .into_response())
}

pub async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState {
        root_template: args.root_template,
        concurrency: args.concurrency,
        resources: Registry::new(),
    });

    let app = Router::new()
        .route("/info/{name}", get(info_handler))
        .route("/read/{name}/{bounds}", get(read_handler))
        .with_state(state);

    log::info!("listening on {}", args.listen);
    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
