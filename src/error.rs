pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("canvas error: {0}")]
    Canvas(String),

    #[error("pixel region error: {0}")]
    Region(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {name:?}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

impl RenderError {
    pub fn canvas(msg: impl Into<String>) -> Self {
        Self::Canvas(msg.into())
    }

    pub fn region(msg: impl Into<String>) -> Self {
        Self::Region(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}
