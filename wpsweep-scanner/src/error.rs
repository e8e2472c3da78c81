use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Sitemap parse error: {0}")]
    XmlError(#[from] roxmltree::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
