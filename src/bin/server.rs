//! FEM2D Solver HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use fem2d_solver::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8086";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolveRequest {
    mesh: Mesh,
    #[serde(default)]
    analysis_type: AnalysisType,
    #[serde(default)]
    geometric_nonlinear: bool,
    /// Remaining solver settings; defaults when absent
    #[serde(default)]
    options: Option<AnalysisOptions>,
}

impl SolveRequest {
    fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            analysis_type: self.analysis_type,
            geometric_nonlinear: self.geometric_nonlinear,
            ..self.options.clone().unwrap_or_default()
        }
    }
}

#[derive(Debug, Serialize)]
struct SolveResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SolverResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SolveResponse {
    /// A result that stopped short of equilibrium is still attached but
    /// reported as a failure
    fn solved(result: SolverResult) -> Self {
        let error = result.status.failure_message();
        Self {
            success: error.is_none(),
            result: Some(result),
            error,
        }
    }

    fn failure(status: StatusCode, error: String) -> (StatusCode, Json<SolveResponse>) {
        (
            status,
            Json(SolveResponse {
                success: false,
                result: None,
                error: Some(error),
            }),
        )
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn solve(Json(request): Json<SolveRequest>) -> impl IntoResponse {
    let options = request.analysis_options();
    let mesh = request.mesh;
    log::info!(
        "solve request: {:?}, {} nodes, {} elements, nonlinear={}",
        options.analysis_type,
        mesh.node_count(),
        mesh.element_count(),
        options.geometric_nonlinear
    );

    // the mesh is owned by the blocking task, so concurrent solves never share state
    let outcome = tokio::task::spawn_blocking(move || analyze(&mesh, &options)).await;

    match outcome {
        Ok(Ok(result)) => {
            let response = SolveResponse::solved(result);
            if let Some(error) = &response.error {
                log::warn!("solve finished without convergence: {error}");
            }
            (StatusCode::OK, Json(response))
        }
        Ok(Err(e)) => {
            log::warn!("solve failed: {e}");
            let status = match e {
                FemError::Validation(_) | FemError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            };
            SolveResponse::failure(status, e.to_string())
        }
        Err(join_error) => {
            log::error!("solver task failed: {join_error}");
            SolveResponse::failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "solver task failed".to_string(),
            )
        }
    }
}

fn app() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/solve", post(solve))
        .layer(cors)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let addr: SocketAddr = std::env::var("FEM2D_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    println!("FEM2D Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /api/health");
    println!("  Solve:        POST /api/solve");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overloaded_column() -> Mesh {
        let mut mesh = Mesh::new();
        let base = mesh.add_node(0.0, 0.0);
        let top = mesh.add_node(0.0, 4.0);
        mesh.add_beam_element([base, top], DEFAULT_MATERIAL_ID, BeamSection::default())
            .unwrap();
        mesh.update_node(base, NodeUpdate::new().constraints(Constraints::fixed()));
        mesh.update_node(top, NodeUpdate::new().loads(NodalLoads::force(1000.0, -5.0e6)));
        mesh
    }

    #[test]
    fn test_converged_result_is_success() {
        let options = AnalysisOptions::frame();
        let result = analyze(&overloaded_column(), &options).unwrap();
        let response = SolveResponse::solved(result);
        assert!(response.success);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_unstable_result_is_failure_with_result() {
        let options = AnalysisOptions::frame().with_geometric_nonlinear(true);
        let result = analyze(&overloaded_column(), &options).unwrap();
        let response = SolveResponse::solved(result);

        assert!(!response.success);
        assert!(response.error.is_some());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["result"]["status"]["state"], "unstable");
    }
}
