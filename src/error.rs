use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to create window or GL context: {0}")]
    Context(String),
    #[error("GL platform error: {0}")]
    Gl(#[from] glutin::error::Error),
    #[error("Failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("Failed to link program '{program}': {log}")]
    ShaderLink { program: &'static str, log: String },
    #[error("Failed to load model '{path}': {source}")]
    Model {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
