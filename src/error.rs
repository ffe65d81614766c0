use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("YAML deserialization failed: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Malformed range shorthand: {0}")]
    FormatError(String),

    #[error("No item in connection set revealed the number of connections")]
    AmbiguousConnectionCount,

    #[error("All items in connection set must reference the same number of connections, found {0:?}")]
    InconsistentConnectionCount(Vec<usize>),

    #[error("Trying to redefine {designator} from {bound} to {requested}")]
    DesignatorConflict {
        designator: String,
        bound: String,
        requested: String,
    },

    #[error("Unknown designator: {0}")]
    UnknownDesignator(String),

    #[error("{name}:{pin} is defined both in pinlabels and pins, for different pins")]
    AmbiguousPinReference { name: String, pin: String },

    #[error("{name}:{pin} is defined more than once")]
    DuplicatePinLabel { name: String, pin: String },

    #[error("{name}:{pin} not found")]
    UnknownPin { name: String, pin: String },

    #[error("Unknown mate shape: {0}")]
    UnknownMateKind(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Missing expected data: {0}")]
    MissingData(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
