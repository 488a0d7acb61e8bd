use std::fs;
use std::path::{Path, PathBuf};

use df_stream::{ConfigError, PropertyRanges, StreamingConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default directory for streaming configuration files.
pub const STREAMING_DIR: &str = "assets/streaming";

/// Error type for configuration I/O.
#[derive(Debug)]
pub enum ConfigIoError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    /// The file parsed but describes a degenerate configuration.
    Invalid(ConfigError),
}

impl From<std::io::Error> for ConfigIoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for ConfigIoError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for ConfigIoError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl From<ConfigError> for ConfigIoError {
    fn from(err: ConfigError) -> Self {
        Self::Invalid(err)
    }
}

impl std::fmt::Display for ConfigIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::Invalid(e) => write!(f, "invalid streaming config: {}", e),
        }
    }
}

impl std::error::Error for ConfigIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Ron(e) => Some(e),
            Self::RonSpanned(e) => Some(e),
            Self::Invalid(e) => Some(e),
        }
    }
}

impl ConfigIoError {
    /// True when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Save a streaming configuration to a RON file.
pub fn save_streaming_config<V, R>(
    path: &Path,
    config: &StreamingConfig<V, R>,
) -> Result<(), ConfigIoError>
where
    V: Serialize,
    R: Serialize,
{
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(true);

    let ron_string = ron::ser::to_string_pretty(config, pretty_config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load and validate a streaming configuration from a RON file.
pub fn load_streaming_config<V, R>(path: &Path) -> Result<StreamingConfig<V, R>, ConfigIoError>
where
    V: DeserializeOwned,
    R: DeserializeOwned + PropertyRanges,
{
    let contents = fs::read_to_string(path)?;
    let config: StreamingConfig<V, R> = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// File name of a stream's config asset, e.g. `"Items"` -> `items.ron`.
///
/// Stream names become lower-case, and anything outside `[A-Za-z0-9_-]` is
/// replaced so a name can never point outside [`STREAMING_DIR`].
pub fn config_filename(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' | '_' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '_',
        })
        .collect();
    format!("{stem}.ron")
}

/// Full path of a named configuration in [`STREAMING_DIR`].
pub fn streaming_config_path(name: &str) -> PathBuf {
    Path::new(STREAMING_DIR).join(config_filename(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_entity_spawn::{default_background_config, default_item_config, DecorationKind, DecorationRanges, ItemKind, ItemRanges};
    use tempfile::tempdir;

    #[test]
    fn save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.ron");

        let config = default_item_config();
        save_streaming_config(&path, &config).unwrap();

        let loaded: StreamingConfig<ItemKind, ItemRanges> = load_streaming_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn omitted_weights_default_to_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("background.ron");
        fs::write(
            &path,
            r#"(
                spawn_radius: 25.0,
                despawn_radius: 30.0,
                chunk_size: 15.0,
                placements_per_chunk: 10,
                min_distance: 1.0,
                palette: [
                    (variant: FaintStar),
                    (variant: Nebula, weight: 0.5),
                ],
                ranges: (scale: (min: 0.8, max: 1.5)),
            )"#,
        )
        .unwrap();

        let loaded: StreamingConfig<DecorationKind, DecorationRanges> =
            load_streaming_config(&path).unwrap();
        assert_eq!(loaded.palette[0].weight, 1.0);
        assert_eq!(loaded.palette[1].weight, 0.5);
    }

    #[test]
    fn degenerate_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.ron");

        let mut config = default_background_config();
        config.chunk_size = 0.0;
        save_streaming_config(&path, &config).unwrap();

        let result: Result<StreamingConfig<DecorationKind, DecorationRanges>, _> =
            load_streaming_config(&path);
        assert!(matches!(
            result,
            Err(ConfigIoError::Invalid(ConfigError::InvalidChunkSize(_)))
        ));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempdir().unwrap();
        let result: Result<StreamingConfig<ItemKind, ItemRanges>, _> =
            load_streaming_config(&dir.path().join("nope.ron"));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(spawn_radius: ").unwrap();

        let result: Result<StreamingConfig<ItemKind, ItemRanges>, _> = load_streaming_config(&path);
        assert!(matches!(result, Err(ConfigIoError::RonSpanned(_))));
    }

    #[test]
    fn config_filename_sanitizes() {
        assert_eq!(config_filename("Background"), "background.ron");
        assert_eq!(config_filename("Deep Space!"), "deep_space_.ron");
        assert_eq!(config_filename("../Items"), "___items.ron");
        assert_eq!(config_filename("Ström"), "str_m.ron");
        assert_eq!(
            streaming_config_path("items"),
            Path::new(STREAMING_DIR).join("items.ron")
        );
    }
}
