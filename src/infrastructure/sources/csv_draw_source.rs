use crate::domain::lottery::{Draw, GameType, NumberSet};
use crate::domain::ports::DrawSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One CSV row: `sequence_index,observed_at,n1..n6[,jackpot,winners]`.
#[derive(Debug, Serialize, Deserialize)]
struct DrawRecord {
    sequence_index: u32,
    observed_at: String,
    n1: u8,
    n2: u8,
    n3: u8,
    n4: u8,
    n5: u8,
    n6: u8,
    #[serde(default)]
    jackpot: Option<f64>,
    #[serde(default)]
    winners: Option<u32>,
}

impl DrawRecord {
    fn from_draw(draw: &Draw) -> Self {
        let n = draw.numbers().as_slice();
        Self {
            sequence_index: draw.sequence_index(),
            observed_at: draw.observed_at().to_rfc3339(),
            n1: n[0],
            n2: n[1],
            n3: n[2],
            n4: n[3],
            n5: n[4],
            n6: n[5],
            jackpot: draw.jackpot(),
            winners: draw.winners(),
        }
    }

    fn into_draw(self, game: GameType) -> Result<Draw> {
        let observed_at = parse_timestamp(&self.observed_at)?;
        let raw = [self.n1, self.n2, self.n3, self.n4, self.n5, self.n6];
        let numbers = NumberSet::new(&raw, game.range())?;
        let draw = Draw::new(game, self.sequence_index, numbers, observed_at)?;
        match (self.jackpot, self.winners) {
            (Some(jackpot), winners) => Ok(draw.with_prize(jackpot, winners.unwrap_or(0))?),
            (None, _) => Ok(draw),
        }
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid observed_at: {}", raw))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Parse CSV content into draws of `game`, sorted ascending by sequence index.
pub fn parse_draws(content: &[u8], game: GameType) -> Result<Vec<Draw>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content);

    let mut draws = Vec::new();
    for (line, record) in rdr.deserialize::<DrawRecord>().enumerate() {
        // Header is line 1
        let record = record.with_context(|| format!("Failed to parse CSV row {}", line + 2))?;
        let draw = record
            .into_draw(game)
            .with_context(|| format!("Invalid draw on CSV row {}", line + 2))?;
        draws.push(draw);
    }

    draws.sort_by_key(|d| d.sequence_index());
    draws.dedup_by_key(|d| d.sequence_index());
    Ok(draws)
}

/// Write draws as CSV with a header row.
pub fn write_draws(path: &Path, draws: &[Draw]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for draw in draws {
        wtr.serialize(DrawRecord::from_draw(draw))
            .context("Failed to serialize draw")?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    info!("Wrote {} draws to {}", draws.len(), path.display());
    Ok(())
}

/// DrawSource over a local CSV export holding a single game's history.
#[derive(Debug, Clone)]
pub struct CsvDrawSource {
    path: PathBuf,
}

impl CsvDrawSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self, game: GameType) -> Result<Vec<Draw>> {
        let content = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let draws = parse_draws(&content, game)
            .with_context(|| format!("Failed to load draws from {}", self.path.display()))?;
        debug!("CsvDrawSource: {} draws in {}", draws.len(), self.path.display());
        Ok(draws)
    }
}

#[async_trait]
impl DrawSource for CsvDrawSource {
    async fn fetch_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>> {
        let mut draws = self.read_all(game).await?;
        let skip = draws.len().saturating_sub(limit);
        Ok(draws.split_off(skip))
    }

    async fn fetch_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>> {
        let draws = self.read_all(game).await?;
        Ok(draws
            .into_iter()
            .filter(|d| d.observed_at() >= from && d.observed_at() <= to)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
sequence_index,observed_at,n1,n2,n3,n4,n5,n6,jackpot,winners
2,2024-01-05,45,3,17,1,22,9,,
1,2024-01-03T18:00:00Z,5,10,15,20,25,30,15000000000,1
";

    #[test]
    fn test_parse_sorts_and_normalizes() {
        let draws = parse_draws(SAMPLE.as_bytes(), GameType::Mega645).unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].sequence_index(), 1);
        assert_eq!(draws[0].winners(), Some(1));
        assert_eq!(draws[1].numbers().as_slice(), &[1, 3, 9, 17, 22, 45]);
        assert_eq!(draws[1].jackpot(), None);
    }

    #[test]
    fn test_parse_without_prize_columns() {
        let csv = "sequence_index,observed_at,n1,n2,n3,n4,n5,n6\n7,2024-02-01,1,2,3,4,5,6\n";
        let draws = parse_draws(csv.as_bytes(), GameType::Power655).unwrap();
        assert_eq!(draws[0].sequence_index(), 7);
    }

    #[test]
    fn test_out_of_range_row_is_rejected() {
        let csv = "sequence_index,observed_at,n1,n2,n3,n4,n5,n6\n1,2024-02-01,1,2,3,4,5,50\n";
        let err = parse_draws(csv.as_bytes(), GameType::Mega645).unwrap_err();
        assert!(format!("{:#}", err).contains("row 2"));

        assert!(parse_draws(csv.as_bytes(), GameType::Power655).is_ok());
    }

    #[test]
    fn test_bad_timestamp() {
        assert!(parse_timestamp("yesterday").is_err());
        assert_eq!(
            parse_timestamp("2024-01-05").unwrap().to_rfc3339(),
            "2024-01-05T00:00:00+00:00"
        );
    }
}
