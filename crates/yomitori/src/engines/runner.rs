//! Run every OCR engine against one page.

use super::OcrEngine;
use crate::types::{OcrResult, TextOrientation};
use crate::{Result, YomitoriError};
use ahash::AHashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Run `engines` concurrently on `image` and collect their results.
///
/// Engines that fail are logged and left out; results come back in the order
/// of `engines`, whatever order the engines finish in. An engine that leaves
/// `processing_time` at zero gets the measured wall-clock time.
///
/// # Errors
///
/// - `InvalidInput` if `engines` is empty or two engines share a name
/// - `AllEnginesFailed` if no engine produced a result
pub async fn run_engines(
    engines: &[Arc<dyn OcrEngine>],
    image: &Path,
    orientation_hint: Option<TextOrientation>,
) -> Result<Vec<OcrResult>> {
    if engines.is_empty() {
        return Err(YomitoriError::invalid_input("no OCR engines configured"));
    }

    let mut seen = AHashSet::with_capacity(engines.len());
    for engine in engines {
        if !seen.insert(engine.name()) {
            return Err(YomitoriError::invalid_input(format!(
                "OCR engine '{}' is registered more than once",
                engine.name()
            )));
        }
    }

    let mut tasks = JoinSet::new();
    for (index, engine) in engines.iter().enumerate() {
        let engine = Arc::clone(engine);
        let image = image.to_path_buf();
        tasks.spawn(async move {
            let started = Instant::now();
            let outcome = engine.extract(&image, orientation_hint).await;
            (index, outcome, started.elapsed())
        });
    }

    let mut collected: Vec<(usize, OcrResult)> = Vec::with_capacity(engines.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, outcome, elapsed) = match joined {
            Ok(finished) => finished,
            Err(e) => {
                tracing::warn!("OCR engine task did not complete for {}: {}", image.display(), e);
                continue;
            }
        };

        let name = engines[index].name();
        match outcome {
            Ok(result) => {
                let result = if result.processing_time() > 0.0 {
                    result
                } else {
                    result.with_processing_time(elapsed.as_secs_f64())?
                };
                tracing::info!(
                    engine = name,
                    confidence = result.confidence(),
                    seconds = result.processing_time(),
                    "OCR engine finished: {:.2}% confidence",
                    result.confidence() * 100.0
                );
                collected.push((index, result));
            }
            Err(e) => {
                tracing::warn!(engine = name, "OCR engine failed on {}: {}", image.display(), e);
            }
        }
    }

    if collected.is_empty() {
        return Err(YomitoriError::AllEnginesFailed(image.display().to_string()));
    }

    collected.sort_by_key(|(index, _)| *index);
    Ok(collected.into_iter().map(|(_, result)| result).collect())
}
