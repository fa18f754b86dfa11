use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultibotError {
    #[error("Bot error: {0}")]
    Bot(String),
}

pub type Result<T> = std::result::Result<T, MultibotError>;
