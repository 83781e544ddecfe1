use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tracing_futures::Instrument;
use uuid::Uuid;

use crate::config::{DimensionPolicy, DimensionsConfig, RuntimeConfig};
use crate::error::ResizeError;
use crate::models::{ResizeParams, ResizeResponse, ResponseHeaders};
use crate::processor::{Dimensions, EngineError, ImageResizer};

pub struct ResizeController {
    resizer: Arc<dyn ImageResizer>,
    dimensions: DimensionsConfig,
    global_limiter: Option<Arc<Semaphore>>,
}

impl ResizeController {
    pub fn new(
        resizer: Arc<dyn ImageResizer>,
        dimensions: DimensionsConfig,
        global_limiter: Option<Arc<Semaphore>>,
    ) -> Self {
        Self {
            resizer,
            dimensions,
            global_limiter,
        }
    }

    pub fn from_config(cfg: &RuntimeConfig) -> Self {
        let global_limiter = cfg.max_concurrency.map(Semaphore::new).map(Arc::new);
        let resizer = cfg.engine.build(cfg.scratch_dir.as_deref());

        Self::new(resizer, cfg.dimensions, global_limiter)
    }

    /// Runs a single resize invocation.
    ///
    /// Failures are logged and handed back as the result, they are
    /// never raised any other way.
    pub async fn invoke(
        &self,
        params: ResizeParams,
        activation_id: Option<&str>,
    ) -> Result<ResizeResponse, ResizeError> {
        let span = info_span!(
            "invoke",
            invocation_id = %Uuid::new_v4(),
            activation_id = activation_id.unwrap_or("-"),
            engine = self.resizer.name(),
        );

        async move {
            let result = self.process(params).await;
            if let Err(e) = &result {
                error!(kind = %e.kind(), "Failed to resize image: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn process(&self, params: ResizeParams) -> Result<ResizeResponse, ResizeError> {
        let dimensions = Dimensions::new(params.w, params.h);
        let data = base64::decode(&params.img)?;

        if self.dimensions.policy == DimensionPolicy::Strict
            && dimensions.checked(self.dimensions.max_dimension).is_none()
        {
            return Err(ResizeError::Dimensions {
                requested: dimensions,
                max: self.dimensions.max_dimension,
            });
        }

        let _permit = match &self.global_limiter {
            Some(limiter) => Some(limiter.acquire().await.map_err(|_| EngineError::Cancelled)?),
            None => None,
        };

        let input_size = data.len();
        let instant = Instant::now();
        let output = self.resizer.resize(Bytes::from(data), dimensions).await?;
        let processing_time = instant.elapsed();

        info!(
            input_size,
            output_size = output.len(),
            "Resized image to {} in {:?}",
            dimensions,
            processing_time,
        );

        Ok(ResizeResponse {
            headers: ResponseHeaders {
                content_type: mime::IMAGE_JPEG.to_string(),
            },
            body: base64::encode(&output),
        })
    }
}
