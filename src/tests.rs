use std::sync::Arc;

use poem::http::StatusCode;
use poem::test::TestClient;
use poem::Route;
use serde_json::json;

use crate::config::RuntimeConfig;
use crate::controller::ResizeController;
use crate::sample::SAMPLE_PNG_BASE64;

const NATIVE_CONFIG: &str = include_str!("../tests/configs/native-mode.yaml");
const STRICT_CONFIG: &str = include_str!("../tests/configs/strict-mode.yaml");
const MISSING_ENGINE_CONFIG: &str = include_str!("../tests/configs/missing-engine.yaml");

fn setup_environment(cfg: &str) -> anyhow::Result<TestClient<Route>> {
    let cfg = RuntimeConfig::from_yaml(cfg)?;
    let controller = Arc::new(ResizeController::from_config(&cfg));

    Ok(TestClient::new(crate::routes::build_app(controller, None)))
}

fn run_body(img: &str, w: i64, h: i64) -> String {
    json!({
        "value": { "img": img, "w": w, "h": h },
        "activation_id": "5b1c2f7e0c3a4f0e9c2f7e0c3a4f0e9c",
        "action_name": "/guest/resize",
        "namespace": "guest",
        "deadline": "1700000000000",
    })
    .to_string()
}

#[tokio::test]
async fn test_init_is_acknowledged() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.post("/init")
        .body(json!({ "value": { "main": "main", "binary": false } }).to_string())
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::OK);
    let ack = res.json().await;
    assert!(ack.value().object().get("ok").bool());

    Ok(())
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.get("/health").send().await;

    res.assert_status(StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_sample_resize() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.post("/run")
        .body(run_body(SAMPLE_PNG_BASE64, 128, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::OK);
    let info = res.json().await;
    let info = info.value().object();

    assert_eq!(
        info.get("headers").object().get("content-type").string(),
        "image/jpeg",
    );

    let data = base64::decode(info.get("body").string())?;
    assert_eq!(image::guess_format(&data)?, image::ImageFormat::Jpeg);
    let img = image::load_from_memory(&data)?;
    assert_eq!((img.width(), img.height()), (128, 128));

    Ok(())
}

#[tokio::test]
#[ignore = "needs ImageMagick `convert` on PATH"]
async fn test_sample_resize_with_default_engine() -> anyhow::Result<()> {
    let app = setup_environment("{}")?;

    let res = app.post("/run")
        .body(run_body(SAMPLE_PNG_BASE64, 128, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::OK);
    let info = res.json().await;
    let data = base64::decode(info.value().object().get("body").string())?;
    assert_eq!(image::guess_format(&data)?, image::ImageFormat::Jpeg);
    let img = image::load_from_memory(&data)?;
    assert_eq!((img.width(), img.height()), (128, 128));

    Ok(())
}

#[tokio::test]
async fn test_sequential_resizes_match_their_own_request() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    for (w, h) in [(64, 32), (17, 90)] {
        let res = app.post("/run")
            .body(run_body(SAMPLE_PNG_BASE64, w, h))
            .content_type("application/json".to_string())
            .send()
            .await;

        res.assert_status(StatusCode::OK);
        let info = res.json().await;
        let data = base64::decode(info.value().object().get("body").string())?;
        let img = image::load_from_memory(&data)?;
        assert_eq!((img.width() as i64, img.height() as i64), (w, h));
    }

    Ok(())
}

#[tokio::test]
async fn test_invalid_base64_is_an_error_result() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.post("/run")
        .body(run_body("%%% not base64 %%%", 128, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::BAD_GATEWAY);
    let err = res.json().await;
    assert_eq!(err.value().object().get("kind").string(), "invalid_payload");

    Ok(())
}

#[tokio::test]
async fn test_negative_dimensions_are_returned_as_engine_error() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.post("/run")
        .body(run_body(SAMPLE_PNG_BASE64, -128, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::BAD_GATEWAY);
    let err = res.json().await;
    assert_eq!(err.value().object().get("kind").string(), "engine");

    Ok(())
}

#[tokio::test]
async fn test_strict_policy_rejects_oversized_dimensions() -> anyhow::Result<()> {
    let app = setup_environment(STRICT_CONFIG)?;

    let res = app.post("/run")
        .body(run_body(SAMPLE_PNG_BASE64, 2048, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::BAD_GATEWAY);
    let err = res.json().await;
    assert_eq!(err.value().object().get("kind").string(), "dimensions");

    Ok(())
}

#[tokio::test]
async fn test_missing_engine_binary_is_an_error_result() -> anyhow::Result<()> {
    let app = setup_environment(MISSING_ENGINE_CONFIG)?;

    let res = app.post("/run")
        .body(run_body(SAMPLE_PNG_BASE64, 128, 128))
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::BAD_GATEWAY);
    let err = res.json().await;
    assert_eq!(err.value().object().get("kind").string(), "engine");

    Ok(())
}

#[tokio::test]
async fn test_missing_parameters_are_rejected() -> anyhow::Result<()> {
    let app = setup_environment(NATIVE_CONFIG)?;

    let res = app.post("/run")
        .body(json!({ "value": { "img": SAMPLE_PNG_BASE64 } }).to_string())
        .content_type("application/json".to_string())
        .send()
        .await;

    res.assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}
