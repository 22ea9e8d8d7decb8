pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read episode store at {path:?}.")]
	ReadStore { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse episode store at {path:?}.")]
	ParseStore { path: std::path::PathBuf, source: serde_json::Error },
}
