//! Companion settings file parser
//!
//! The tracking tool stores project settings next to the lineage export in
//! an INI-like layout:
//!
//! ```text
//! ; comment
//! [CALIBRATION]
//! WIDTH=1.2
//! ```
//!
//! Only the calibration width is interpreted by this crate; every other key
//! is kept as a raw string.

use crate::reader::read_text;
use crate::types::{LineageError, Result};
use std::collections::BTreeMap;
use std::path::Path;

const CALIBRATION: &str = "CALIBRATION";
const WIDTH: &str = "WIDTH";

/// Parsed settings, section name -> key -> raw value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    /// Parse settings text
    ///
    /// Keys that appear before the first section header are stored under the
    /// empty section name.
    pub fn parse(text: &str) -> Result<Self> {
        let mut settings = Settings::default();
        let mut current = String::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                current = line.trim().trim_matches(|c| c == '[' || c == ']').to_string();
                settings.sections.entry(current.clone()).or_default();
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                LineageError::SettingsParseError {
                    line: index + 1,
                    reason: format!("expected key=value, found {:?}", line),
                }
            })?;

            settings
                .sections
                .entry(current.clone())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }

        log::debug!("Parsed {} settings sections", settings.sections.len());
        Ok(settings)
    }

    /// Read and parse a settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading settings file: {:?}", path);
        let text = read_text(path)?;
        Self::parse(&text)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Look up a numeric setting
    pub fn get_f64(&self, section: &str, key: &str) -> Result<f64> {
        let value = self
            .get(section, key)
            .ok_or_else(|| LineageError::MissingSetting {
                section: section.to_string(),
                key: key.to_string(),
            })?;

        value
            .trim()
            .parse()
            .map_err(|_| LineageError::InvalidSetting {
                section: section.to_string(),
                key: key.to_string(),
                value: value.to_string(),
            })
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.keys().map(String::as_str)
    }

    /// `CALIBRATION.WIDTH`, which must be positive
    pub fn calibration_width(&self) -> Result<f64> {
        let width = self.get_f64(CALIBRATION, WIDTH)?;
        if !width.is_finite() || width <= 0.0 {
            return Err(LineageError::InvalidSetting {
                section: CALIBRATION.to_string(),
                key: WIDTH.to_string(),
                value: width.to_string(),
            });
        }
        Ok(width)
    }

    /// Pixel-to-physical scale: `reference_width / CALIBRATION.WIDTH`
    pub fn calibration_factor(&self, reference_width: f64) -> Result<f64> {
        Ok(reference_width / self.calibration_width()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SBC: &str = "; settings\r\n\r\n[DISPLAY]\r\nTITLE=wt 2=embryo\r\n[CALIBRATION]\r\nWIDTH=2.5\r\nUNIT=um\r\n";

    #[test]
    fn test_parse_sections() {
        let settings = Settings::parse(SBC).unwrap();

        assert_eq!(settings.get("DISPLAY", "TITLE"), Some("wt 2=embryo"));
        assert_eq!(settings.get("CALIBRATION", "UNIT"), Some("um"));
        assert_eq!(settings.get("CALIBRATION", "HEIGHT"), None);
        assert_eq!(settings.sections().collect::<Vec<_>>(), vec!["CALIBRATION", "DISPLAY"]);
    }

    #[test]
    fn test_calibration_factor() {
        let settings = Settings::parse(SBC).unwrap();
        assert_eq!(settings.calibration_width().unwrap(), 2.5);
        assert_eq!(settings.calibration_factor(500.0).unwrap(), 200.0);
    }

    #[test]
    fn test_missing_and_invalid_width() {
        let missing = Settings::parse("[CALIBRATION]\nHEIGHT=1\n").unwrap();
        assert!(matches!(
            missing.calibration_width(),
            Err(LineageError::MissingSetting { .. })
        ));

        let zero = Settings::parse("[CALIBRATION]\nWIDTH=0\n").unwrap();
        assert!(matches!(
            zero.calibration_width(),
            Err(LineageError::InvalidSetting { .. })
        ));

        let text = Settings::parse("[CALIBRATION]\nWIDTH=wide\n").unwrap();
        assert!(text.calibration_factor(512.0).is_err());
    }

    #[test]
    fn test_line_without_equals_is_an_error() {
        let err = Settings::parse("[A]\nKEY=1\nbroken\n").unwrap_err();
        assert!(matches!(err, LineageError::SettingsParseError { line: 3, .. }));
    }

    #[test]
    fn test_from_file_latin1() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[CALIBRATION]\nWIDTH=1.6\n[INFO]\nAUTHOR=M\xfcller\n")
            .unwrap();
        temp_file.flush().unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.get("INFO", "AUTHOR"), Some("Müller"));
        assert_eq!(settings.calibration_width().unwrap(), 1.6);
    }
}
