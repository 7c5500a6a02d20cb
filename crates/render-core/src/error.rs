use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("slide index {index} out of range: deck has {count} slide(s)")]
    SlideIndex { index: usize, count: usize },
    #[error("output encoding error: {0}")]
    Encode(String),
    #[error("PDF generation error: {0}")]
    Pdf(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("other rendering error: {0}")]
    Other(String),
}

impl From<&str> for RenderError {
    fn from(s: &str) -> Self {
        RenderError::Other(s.to_string())
    }
}
