extern crate anyhow;
extern crate prost;
extern crate reqwest;
extern crate rppal;
extern crate std;

pub type SubsignResult<T> = std::result::Result<T, SubsignError>;

#[derive(Debug)]
pub enum SubsignError {
    HttpError(reqwest::Error),
    DecodeError(prost::DecodeError),
    I2cError(rppal::i2c::Error),
    IoError(std::io::Error),
    SimpleError(String),
}

pub fn make_error(msg: &str) -> SubsignError {
    return SubsignError::SimpleError(msg.to_string());
}

impl std::fmt::Display for SubsignError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SubsignError::HttpError(ref err) => {
                return write!(f, "HTTP Error: {}", err);
            },
            SubsignError::DecodeError(ref err) => {
                return write!(f, "Feed Decode Error: {}", err);
            },
            SubsignError::I2cError(ref err) => {
                return write!(f, "I2C Error: {}", err);
            },
            SubsignError::IoError(ref err) => {
                return write!(f, "IO Error: {}", err);
            },
            SubsignError::SimpleError(ref msg) => {
                return write!(f, "Error: {}", msg);
            },
        }
    }
}

impl std::error::Error for SubsignError {}

impl From<reqwest::Error> for SubsignError {
    fn from(err: reqwest::Error) -> SubsignError {
        return SubsignError::HttpError(err);
    }
}

impl From<prost::DecodeError> for SubsignError {
    fn from(err: prost::DecodeError) -> SubsignError {
        return SubsignError::DecodeError(err);
    }
}

impl From<rppal::i2c::Error> for SubsignError {
    fn from(err: rppal::i2c::Error) -> SubsignError {
        return SubsignError::I2cError(err);
    }
}

impl From<std::io::Error> for SubsignError {
    fn from(err: std::io::Error) -> SubsignError {
        return SubsignError::IoError(err);
    }
}

impl From<anyhow::Error> for SubsignError {
    fn from(err: anyhow::Error) -> SubsignError {
        return SubsignError::SimpleError(format!("{:#}", err));
    }
}
