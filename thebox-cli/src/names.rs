//! Player and house-item names read from flat one-column files.
use std::fs;
use std::path::{Path, PathBuf};

use thebox_game::NameSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NameFileError {
    #[error("could not read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not list any names", path.display())]
    Empty { path: PathBuf },
}

/// Names from `players.csv` and `house-objects.csv` style files.
///
/// Files have no header. Only the first column is used and blank lines are
/// skipped.
#[derive(Debug, Clone)]
pub struct FlatFileNames {
    players: PathBuf,
    house_items: PathBuf,
}

impl FlatFileNames {
    pub fn new(players: impl Into<PathBuf>, house_items: impl Into<PathBuf>) -> Self {
        Self {
            players: players.into(),
            house_items: house_items.into(),
        }
    }
}

impl NameSource for FlatFileNames {
    type Error = NameFileError;

    fn load_players(&self) -> Result<Vec<String>, Self::Error> {
        read_names(&self.players)
    }

    fn load_house_items(&self) -> Result<Vec<String>, Self::Error> {
        read_names(&self.house_items)
    }
}

fn read_names(path: &Path) -> Result<Vec<String>, NameFileError> {
    let text = fs::read_to_string(path).map_err(|source| NameFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let names = parse_names(&text);
    if names.is_empty() {
        return Err(NameFileError::Empty {
            path: path.to_path_buf(),
        });
    }
    log::debug!("read {} names from {}", names.len(), path.display());
    Ok(names)
}

pub fn parse_names(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .lines()
        .filter_map(|line| {
            let first = line.split(',').next().unwrap_or_default().trim();
            let name = first
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(first)
                .trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "thebox-names-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn parse_keeps_first_column_in_order() {
        let text = "\u{feff}Ada,extra\n\n  Bo  \n\"Cy\",3\r\nAda\n";
        assert_eq!(parse_names(text), vec!["Ada", "Bo", "Cy", "Ada"]);
    }

    #[test]
    fn files_load_through_the_name_source() {
        let players = temp_path("players");
        let items = temp_path("items");
        fs::write(&players, "Ada\nBo\n").unwrap();
        fs::write(&items, "lamp\nmug\nrug\n").unwrap();

        let source = FlatFileNames::new(&players, &items);
        assert_eq!(source.load_players().unwrap(), vec!["Ada", "Bo"]);
        assert_eq!(source.load_house_items().unwrap().len(), 3);
    }

    #[test]
    fn missing_and_blank_files_are_errors() {
        let blank = temp_path("blank");
        fs::write(&blank, "\n  \n").unwrap();
        let source = FlatFileNames::new(temp_path("missing"), &blank);
        assert!(matches!(source.load_players(), Err(NameFileError::Io { .. })));
        assert!(matches!(
            source.load_house_items(),
            Err(NameFileError::Empty { .. })
        ));
    }
}
