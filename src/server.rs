use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;

use timetable_engine::{explain_infeasibility, normalize, pre_validate, run, SchedulerError, SolveOptions};

fn error_status(err: &SchedulerError) -> StatusCode {
    match err {
        SchedulerError::Config(_) => StatusCode::BAD_REQUEST,
        SchedulerError::PreValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulerError::ModelInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SchedulerError::SolverInfeasible => StatusCode::UNPROCESSABLE_ENTITY,
        SchedulerError::SolverTimeout => StatusCode::GATEWAY_TIMEOUT,
        SchedulerError::ValidationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn solve_handler(Json(raw): Json<Value>) -> Result<Json<Value>, (StatusCode, String)> {
    let options = SolveOptions::default();
    match run(&raw, &options) {
        Ok((problem, schedule)) => Ok(Json(serde_json::to_value(schedule.export(&problem)).unwrap())),
        Err(e) => Err((error_status(&e), e.to_string())),
    }
}

async fn pre_validate_handler(Json(raw): Json<Value>) -> Result<Json<Value>, (StatusCode, String)> {
    let problem = normalize(&raw).map_err(|e| (error_status(&e), e.to_string()))?;
    let result = pre_validate(&problem);
    Ok(Json(serde_json::json!({
        "is_valid": result.is_valid(),
        "errors": result.errors,
        "warnings": result.warnings,
        "info": result.info,
    })))
}

async fn explain_handler(Json(raw): Json<Value>) -> Result<Json<Value>, (StatusCode, String)> {
    let problem = normalize(&raw).map_err(|e| (error_status(&e), e.to_string()))?;
    let reasons = explain_infeasibility(&problem);
    Ok(Json(serde_json::json!({ "reasons": reasons })))
}

pub async fn run_server() {
    let app = Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/schedule/pre-validate", post(pre_validate_handler))
        .route("/v1/schedule/explain", post(explain_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
        .await
        .unwrap();

    println!("Server running at http://{}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
