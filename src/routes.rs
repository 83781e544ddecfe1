use std::sync::Arc;

use poem::Route;
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object, OpenApi, OpenApiService};

use crate::controller::ResizeController;
use crate::models::{ActionError, ResizeParams, ResizeResponse};

/// The body the action runtime posts to `/run`.
///
/// The runtime also sends things like the action name, namespace and
/// deadline, none of which are needed here.
#[derive(Object, Debug)]
pub struct RunRequest {
    /// The action parameters.
    value: ResizeParams,

    /// The id the runtime assigned to this activation.
    activation_id: Option<String>,
}

#[derive(Object, Debug)]
pub struct Ack {
    ok: bool,
}

impl Ack {
    fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

#[derive(ApiResponse)]
pub enum RunResponse {
    /// The image was resized.
    #[oai(status = 200)]
    Ok(Json<ResizeResponse>),

    /// The activation failed, the body is the error result.
    #[oai(status = 502)]
    Failed(Json<ActionError>),
}

pub struct ActionApi {
    controller: Arc<ResizeController>,
}

impl ActionApi {
    pub fn new(controller: Arc<ResizeController>) -> Self {
        Self { controller }
    }
}

#[OpenApi]
impl ActionApi {
    /// Initialise the action.
    ///
    /// There is no code to load so any payload is accepted and ignored.
    #[oai(path = "/init", method = "post")]
    async fn init(&self) -> Json<Ack> {
        Ack::ok()
    }

    /// Run a single resize activation.
    #[oai(path = "/run", method = "post")]
    async fn run(&self, payload: Json<RunRequest>) -> RunResponse {
        let RunRequest {
            value,
            activation_id,
        } = payload.0;

        match self.controller.invoke(value, activation_id.as_deref()).await {
            Ok(res) => RunResponse::Ok(Json(res)),
            Err(e) => RunResponse::Failed(Json(ActionError::from(&e))),
        }
    }

    /// Check the action is up.
    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> Json<Ack> {
        Ack::ok()
    }
}

/// Builds the action's routes, with the API docs mounted at `/docs`.
pub fn build_app(controller: Arc<ResizeController>, docs_url: Option<&str>) -> Route {
    let mut api_service = OpenApiService::new(
        ActionApi::new(controller),
        "Resize Action",
        env!("CARGO_PKG_VERSION"),
    );

    if let Some(url) = docs_url {
        api_service = api_service.server(url.to_string());
    }

    let ui = api_service.redoc();

    Route::new().nest("/docs", ui).nest("/", api_service)
}
