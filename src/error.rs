use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid search arguments: {0}")]
    InvalidInput(String),

    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(&'static str),

    #[error("Couldn't read a result count from the page: {0}")]
    ParseCount(String),

    #[error("The export payload is not valid windows-1251.")]
    ParseEncoding,

    #[error("Got a 404 page disguised as a 200 (probably ddos protection).")]
    DisguisedNotFound,

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
