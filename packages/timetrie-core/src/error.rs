use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A digit path or a trie snapshot that does not describe a well-formed trie.
    #[error("decode error: {0}")]
    Decode(String),
    /// Raised by fallible `DigestFunction`s; MurmurHash3 over an in-memory id never fails.
    #[error("digest error: {0}")]
    Digest(String),
}
