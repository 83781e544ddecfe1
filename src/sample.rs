use crate::controller::ResizeController;
use crate::models::{ActionError, ResizeParams};

/// A 10x6 RGBA PNG used by the self test.
pub const SAMPLE_PNG_BASE64: &str = concat!(
    "iVBORw0KGgoAAAANSUhEUgAAAAoAAAAGCAYAAAD68A/GAAAA/klEQVQYGWNgAAEHBxaG//+ZQMyyn581Pfas+cRQnf1LfF",
    "Ljf+62smUgcUbt0FA2Zh7drf/ffMy9vLn3RurrW9e5hCU11i2azfD4zu1/DHz8TAy/foUxsXBrFzHzC7r8+M9S1vn1qxQT07",
    "dDjL9fdemrqKxlYGT6z8AIMo6hgeUfA0PUvy9fGFh5GWK3z7vNxSWt++jX99+8SoyiGQwsW38w8PJEM7x5v5SJ8f+/xv8MDA",
    "zffv9hevfkWjiXBGMpMx+j2awovjcMjFztDO8+7GF49LkbZDCDeXLTWnZO7qDfn1/+5jbw/8pjYWS4wZLztXnuEuYTk2M+Mz",
    "Iw/AcA36VewaD6fzsAAAAASUVORK5CYII=",
);

pub const SELF_TEST_WIDTH: i64 = 128;
pub const SELF_TEST_HEIGHT: i64 = 128;

pub fn sample_png() -> anyhow::Result<Vec<u8>> {
    Ok(base64::decode(SAMPLE_PNG_BASE64)?)
}

/// Resizes the sample once and prints the result value.
pub async fn run_self_test(controller: &ResizeController) -> anyhow::Result<()> {
    let params = ResizeParams {
        img: SAMPLE_PNG_BASE64.to_string(),
        w: SELF_TEST_WIDTH,
        h: SELF_TEST_HEIGHT,
    };

    let out = match controller.invoke(params, None).await {
        Ok(res) => serde_json::to_string_pretty(&res)?,
        Err(e) => serde_json::to_string_pretty(&ActionError::from(&e))?,
    };

    println!("{}", out);

    Ok(())
}
