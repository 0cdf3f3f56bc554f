// ============================================
// Error - Ошибки инициализации рендерера
// ============================================

use thiserror::Error;

/// Ошибки чтения векторного поля
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("invalid vector field magic")]
    InvalidMagic,

    #[error("unsupported vector field version {0}")]
    UnsupportedVersion(u32),

    #[error("vector field {width}x{height} expects {expected} samples, found {found}")]
    SampleCount {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },

    #[error("vector field has zero size")]
    EmptyGrid,

    #[error("non-finite sample at index {0}")]
    NonFinite(usize),

    #[error("sample {0} has zero direction and non-zero magnitude")]
    ZeroDirection(usize),

    #[error("field step count must be positive")]
    ZeroSteps,

    #[error("unknown layer {0}")]
    UnknownLayer(usize),

    #[error("compression error: {0}")]
    Compression(String),
}

/// Ошибка рендерера: всё, что может сломаться при загрузке ассетов и создании ресурсов
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("binary format error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("vector field error: {0}")]
    Field(#[from] FieldError),

    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
