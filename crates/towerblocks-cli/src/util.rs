use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use towerblocks_ai::MatchConfig;
use towerblocks_engine::BitBoard;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads the match configuration, or returns the defaults when no file is given.
pub fn read_config_file(path: Option<&Path>) -> anyhow::Result<MatchConfig> {
    match path {
        Some(path) => read_json_file("config", path),
        None => Ok(MatchConfig::default()),
    }
}

/// Reads an ASCII board: `#` for filled cells, `.` for empty ones, 10 per row,
/// aligned to the floor.
pub fn read_board_file<P>(path: P) -> anyhow::Result<BitBoard>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let art = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    BitBoard::try_from_ascii(&art)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Invalid board file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("towerblocks-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_config_file() {
        assert_eq!(read_config_file(None).unwrap(), MatchConfig::default());

        let path = temp_file(
            "config.json",
            r#"{ "move_interval_ms": 150, "move_jitter": true, "max_hp": 3 }"#,
        );
        let config = read_config_file(Some(&path)).unwrap();
        assert_eq!(config.agent.move_interval_ms, 150);
        assert!(config.agent.move_jitter);
        assert_eq!(config.max_hp, 3);
        assert_eq!(config.recovery_interval_ms, 100);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_config_file_errors() {
        let missing = std::env::temp_dir().join("towerblocks-missing-config.json");
        let err = read_config_file(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to open config file"));

        let path = temp_file("bad-config.json", r#"{ "max_hp": "many" }"#);
        let err = read_config_file(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON file"));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_board_file() {
        let path = temp_file("board.txt", "..#.......\n##.#######\n");
        let board = read_board_file(&path).unwrap();
        assert_eq!(board, BitBoard::from_ascii("..#.......\n##.#######"));
        fs::remove_file(path).unwrap();

        let path = temp_file("bad-board.txt", "###\n");
        assert!(read_board_file(&path).is_err());
        fs::remove_file(path).unwrap();
    }
}
