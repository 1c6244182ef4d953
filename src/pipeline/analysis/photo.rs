use crate::pipeline::capability::{CapabilityError, VisionClient};
use crate::pipeline::prompt_templates::{photo_prompt, PHOTO_PARAMS, PHOTO_SYSTEM};

/// Assess one inspection photo. On failure the returned advisory carries
/// the error verbatim and queues the photo for manual review.
pub fn analyze_photo<V: VisionClient + ?Sized>(
    vision: &V,
    image_bytes: &[u8],
    status_context: &str,
) -> String {
    let _span = tracing::info_span!(
        "photo_stage",
        status = %status_context,
        image_size = image_bytes.len(),
    )
    .entered();
    let start = std::time::Instant::now();

    let prompt = photo_prompt(status_context);
    match vision.generate_with_image(&PHOTO_PARAMS.request(PHOTO_SYSTEM, &prompt), image_bytes) {
        Ok(text) => {
            tracing::info!(
                elapsed_ms = %start.elapsed().as_millis(),
                text_len = text.len(),
                "photo analysis complete"
            );
            text.trim().to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "photo analysis failed, queued for manual review");
            photo_fallback(&e)
        }
    }
}

pub fn photo_fallback(error: &CapabilityError) -> String {
    format!("Image analysis error: {error}. Photo captured for manual review.")
}
