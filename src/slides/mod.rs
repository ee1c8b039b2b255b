// Slide deck output for velocity reports

pub mod chart;
pub mod deck;

pub use deck::DeckRenderer;

use crate::metrics::ComprehensiveMetrics;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Marker shared by every report file name
pub const REPORT_MARKER: &str = "_velocity_report_";
pub const DECK_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metrics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Files produced for one team
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFiles {
    pub deck: PathBuf,
    pub json: Option<PathBuf>,
}

/// `{team}_velocity_report_{YYYYmmdd_HHMMSS}` without extension
pub fn report_stem(team_name: &str, generated_at: NaiveDateTime) -> String {
    let team: String = team_name
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}{}{}", team, REPORT_MARKER, generated_at.format("%Y%m%d_%H%M%S"))
}

/// Whether a file name looks like a deck written by [`write_report`]
pub fn is_report_file(file_name: &str) -> bool {
    file_name.contains(REPORT_MARKER)
        && Path::new(file_name)
            .extension()
            .is_some_and(|ext| ext == DECK_EXTENSION)
}

/// Render the deck (and optionally JSON) for a team into `dir`
pub fn write_report(
    dir: &Path,
    renderer: &DeckRenderer,
    metrics: &ComprehensiveMetrics,
    generated_at: NaiveDateTime,
    json_export: bool,
) -> Result<ReportFiles, RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = report_stem(renderer.team_name(), generated_at);
    let deck_path = dir.join(format!("{}.{}", stem, DECK_EXTENSION));
    let deck = renderer.render(metrics, generated_at);
    std::fs::write(&deck_path, deck).map_err(|source| RenderError::Io {
        path: deck_path.clone(),
        source,
    })?;
    info!("Presentation saved to {}", deck_path.display());

    let json = if json_export {
        let json_path = dir.join(format!("{}.json", stem));
        let body = serde_json::to_string_pretty(metrics)?;
        std::fs::write(&json_path, body).map_err(|source| RenderError::Io {
            path: json_path.clone(),
            source,
        })?;
        info!("Metrics exported to {}", json_path.display());
        Some(json_path)
    } else {
        None
    };

    Ok(ReportFiles {
        deck: deck_path,
        json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DefectMetrics, VelocityImprovement, VelocityStat};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 3)
            .unwrap()
    }

    fn metrics() -> ComprehensiveMetrics {
        ComprehensiveMetrics {
            current_sprint: None,
            baseline_velocity: VelocityStat::default(),
            post_ai_velocity: VelocityStat::default(),
            velocity_improvement: VelocityImprovement::default(),
            defect_metrics: DefectMetrics::default(),
            ai_adoption_date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_report_stem() {
        assert_eq!(
            report_stem("ELECOM", generated_at()),
            "ELECOM_velocity_report_20240305_090703"
        );
        assert_eq!(
            report_stem("Web Team/EU", generated_at()),
            "Web_Team_EU_velocity_report_20240305_090703"
        );
    }

    #[test]
    fn test_is_report_file() {
        assert!(is_report_file("ELECOM_velocity_report_20240305_090703.md"));
        assert!(!is_report_file("ELECOM_velocity_report_20240305_090703.json"));
        assert!(!is_report_file("notes.md"));
    }

    #[test]
    fn test_write_report_with_json() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        let files = write_report(
            &out,
            &DeckRenderer::new("ELECOM"),
            &metrics(),
            generated_at(),
            true,
        )
        .unwrap();

        assert_eq!(
            files.deck,
            out.join("ELECOM_velocity_report_20240305_090703.md")
        );
        let deck = std::fs::read_to_string(&files.deck).unwrap();
        assert!(deck.contains("# ELECOM Sprint Velocity Report"));

        let json_path = files.json.expect("json export");
        let exported: ComprehensiveMetrics =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(exported, metrics());
    }

    #[test]
    fn test_write_report_without_json() {
        let dir = TempDir::new().unwrap();
        let files = write_report(
            dir.path(),
            &DeckRenderer::new("ELECOM"),
            &metrics(),
            generated_at(),
            false,
        )
        .unwrap();
        assert!(files.json.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
