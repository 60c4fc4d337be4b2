//! services/api/src/bin/learning_path.rs

use api_lib::{
    adapters::{
        ContentAdapter, OutlineAdapter, QuizAdapter, SqliteCourseStore, TaskAdapter, TutorAdapter,
    },
    config::Config,
    error::ApiError,
    web::{get_course_handler, list_courses_handler, rest::ApiDoc, state::AppState, ws_handler},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use learning_path_core::{ContentOrchestrator, CourseLibrary};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Course Store & Run Migrations ---
    info!("Opening course store at {}", config.database_url);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(SqliteCourseStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");
    let library = Arc::new(CourseLibrary::load(store).await);

    // --- 3. Initialize Service Adapters ---
    let llm_config = OpenAIConfig::new()
        .with_api_key(config.llm_api_key.clone())
        .with_api_base(config.llm_base_url.clone());
    let llm_client = Client::with_config(llm_config);
    info!("Using the LLM endpoint at {}", config.llm_base_url);

    let outline_adapter = Arc::new(OutlineAdapter::new(
        llm_client.clone(),
        config.course_model.clone(),
    ));
    let content_adapter = Arc::new(ContentAdapter::new(
        llm_client.clone(),
        config.content_model.clone(),
    ));
    let quiz_adapter = Arc::new(QuizAdapter::new(
        llm_client.clone(),
        config.assessment_model.clone(),
    ));
    let task_adapter = Arc::new(TaskAdapter::new(
        llm_client.clone(),
        config.assessment_model.clone(),
    ));
    let tutor_adapter = Arc::new(TutorAdapter::new(llm_client, config.tutor_model.clone()));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        library,
        content: Arc::new(ContentOrchestrator::new(content_adapter)),
        outline_adapter,
        quiz_adapter,
        task_adapter,
        tutor_adapter,
    });

    // --- 5. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/courses", get(list_courses_handler))
        .route("/courses/{course_id}", get(get_course_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
