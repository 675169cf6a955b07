use failure::Fail;

#[derive(Debug, Fail)]
pub enum LogisticsNluError {
    #[fail(display = "Unable to read file '{}'", _0)]
    ModelLoad(String),
    #[fail(display = "Expected model version {} but found {}", runner, model)]
    WrongModelVersion { model: String, runner: &'static str },
    #[fail(display = "Unknown intent: '{}'", _0)]
    UnknownIntent(String),
    #[fail(display = "Empty query")]
    EmptyQuery,
    #[fail(display = "Invalid dataset: {}", _0)]
    InvalidDataset(String),
    #[fail(display = "Internal error: {}", _0)]
    InternalError(String),
}

pub type Result<T> = ::std::result::Result<T, ::failure::Error>;
