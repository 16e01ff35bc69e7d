//! Page recognition: every engine, then consensus.

use crate::Result;
use crate::consensus::ConsensusSelector;
use crate::engines::{OcrEngine, run_engines};
use crate::types::{OcrConsensus, SelectionStrategy, TextOrientation};
use std::path::Path;
use std::sync::Arc;

/// Recognize one page image with all `engines` and pick a consensus.
///
/// Engine failures are tolerated as long as one engine succeeds; see
/// [`run_engines`]. Without an explicit `orientation_hint` the selector's
/// configured hint is used. The returned consensus carries every surviving
/// result for review.
///
/// # Errors
///
/// Whatever [`run_engines`] or [`ConsensusSelector::select_best`] return.
pub async fn recognize_page(
    engines: &[Arc<dyn OcrEngine>],
    image: &Path,
    orientation_hint: Option<TextOrientation>,
    selector: &ConsensusSelector,
    strategy: SelectionStrategy,
) -> Result<OcrConsensus> {
    let orientation_hint = orientation_hint.or(selector.orientation_hint());
    let results = run_engines(engines, image, orientation_hint).await?;
    let consensus = selector.select_best(&results, strategy)?;

    tracing::info!(
        image = %image.display(),
        selected_engine = %consensus.selected_engine,
        %strategy,
        "Selected {} (consensus: {:.2}%)",
        consensus.selected_engine,
        consensus.consensus_score * 100.0
    );

    Ok(consensus)
}
