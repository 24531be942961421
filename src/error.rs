use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read photo directory {}: {source}", path.display())]
    PhotoDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load photo {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_converts_and_displays() {
        let err: AppError = std::io::Error::other("boom").into();
        assert!(err.to_string().starts_with("terminal I/O error:"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_config_error_names_file() {
        let source = toml::from_str::<toml::Table>("fps = [").unwrap_err();
        let err = AppError::Config {
            path: PathBuf::from("/tmp/heartreel.toml"),
            source,
        };
        assert!(err.to_string().contains("/tmp/heartreel.toml"));
    }
}
