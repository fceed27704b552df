use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageFlowError>;

#[derive(Debug, Error)]
pub enum PageFlowError {
    /// A flowable was rejected by every frame of the template while those frames were empty.
    #[error("flowable cannot fit in any frame: {flowable} (page {page})")]
    UnfittableContent { flowable: String, page: usize },

    #[error("unknown page template: {0}")]
    UnknownTemplate(String),

    #[error("multi-pass build did not converge after {passes} passes (page counts {page_counts:?})")]
    NonConvergentMultiBuild {
        passes: usize,
        page_counts: Vec<usize>,
    },

    #[error("no page template available")]
    MissingPageTemplate,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
