use thiserror::Error;

/// Fatal errors surfaced by the watermarking engine.
///
/// Payload-too-large and extraction-failure are deliberately *not*
/// variants here: per spec, `embed` returns the input bytes unchanged on
/// overflow and `extract` returns `""` on any decode/parse failure. Both
/// are plain success values, never `Err`.
#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unknown watermark method: {0}")]
    UnknownMethod(String),

    #[error("required dependency unavailable: {0}")]
    DependencyUnavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, WatermarkError>;
