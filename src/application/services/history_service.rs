use crate::domain::lottery::{Draw, GameType};
use crate::domain::ports::DrawSource;
use crate::domain::repositories::DrawRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Slice of history a backtest runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktestWindow {
    /// The most recent N draws
    LastDraws(usize),
    /// Draws observed within the last N days
    LastDays(i64),
    /// Draws observed in [from, to]
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl BacktestWindow {
    pub fn describe(&self) -> String {
        match self {
            BacktestWindow::LastDraws(n) => format!("Last {} draws", n),
            BacktestWindow::LastDays(n) => format!("Last {} days", n),
            BacktestWindow::Between(from, to) => {
                format!("{} to {}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d"))
            }
        }
    }
}

impl std::fmt::Display for BacktestWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// Draw history access.
///
/// Reads from the configured source and mirrors what it gets into the
/// repository. When the source fails (or has nothing) the stored copy is
/// served instead.
pub struct HistoryService {
    source: Arc<dyn DrawSource>,
    draws: Arc<dyn DrawRepository>,
}

impl HistoryService {
    pub fn new(source: Arc<dyn DrawSource>, draws: Arc<dyn DrawRepository>) -> Self {
        Self { source, draws }
    }

    /// Latest `limit` draws, ascending by sequence index.
    pub async fn load_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>> {
        match self.source.fetch_latest(game, limit).await {
            Ok(fetched) if !fetched.is_empty() => {
                self.persist(&fetched).await;
                Ok(fetched)
            }
            Ok(_) => {
                warn!("HistoryService: source returned no {} draws, using stored history", game);
                self.stored_latest(game, limit).await
            }
            Err(e) => {
                warn!("HistoryService: source failed ({:#}), using stored history", e);
                self.stored_latest(game, limit).await
            }
        }
    }

    pub async fn load_between(
        &self,
        game: GameType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Draw>> {
        if from > to {
            anyhow::bail!(
                "Invalid date range: {} is after {}",
                from.format("%Y-%m-%d"),
                to.format("%Y-%m-%d")
            );
        }

        match self.source.fetch_between(game, from, to).await {
            Ok(fetched) if !fetched.is_empty() => {
                self.persist(&fetched).await;
                Ok(fetched)
            }
            Ok(_) => self
                .draws
                .find_between(game, from, to)
                .await
                .context("Failed to read stored draws"),
            Err(e) => {
                warn!("HistoryService: source failed ({:#}), using stored history", e);
                self.draws
                    .find_between(game, from, to)
                    .await
                    .context("Failed to read stored draws")
            }
        }
    }

    pub async fn load_window(&self, game: GameType, window: BacktestWindow) -> Result<Vec<Draw>> {
        match window {
            BacktestWindow::LastDraws(n) => self.load_latest(game, n).await,
            BacktestWindow::LastDays(days) => {
                let to = Utc::now();
                self.load_between(game, to - Duration::days(days), to).await
            }
            BacktestWindow::Between(from, to) => self.load_between(game, from, to).await,
        }
    }

    async fn stored_latest(&self, game: GameType, limit: usize) -> Result<Vec<Draw>> {
        let stored = self
            .draws
            .find_latest(game, limit)
            .await
            .context("Failed to fetch historical data and no local data available")?;
        info!("HistoryService: using {} stored {} draws", stored.len(), game);
        Ok(stored)
    }

    // Persisting is best effort; the fetched draws are still returned.
    async fn persist(&self, draws: &[Draw]) {
        match self.draws.save_batch(draws).await {
            Ok(inserted) => info!(
                "HistoryService: fetched {} draws, {} new",
                draws.len(),
                inserted
            ),
            Err(e) => warn!("HistoryService: failed to store fetched draws: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryDrawRepository;
    use crate::infrastructure::sources::{SyntheticDrawSource, generate_draws};
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl DrawSource for FailingSource {
        async fn fetch_latest(&self, _game: GameType, _limit: usize) -> Result<Vec<Draw>> {
            anyhow::bail!("source offline")
        }

        async fn fetch_between(
            &self,
            _game: GameType,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<Draw>> {
            anyhow::bail!("source offline")
        }
    }

    #[tokio::test]
    async fn test_fetched_draws_are_persisted() {
        let repo = Arc::new(InMemoryDrawRepository::new());
        let service = HistoryService::new(Arc::new(SyntheticDrawSource::new(40, 9)), repo.clone());

        let draws = service.load_latest(GameType::Mega645, 25).await.unwrap();
        assert_eq!(draws.len(), 25);
        assert_eq!(repo.count(GameType::Mega645).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_falls_back_to_stored_history() {
        let repo = Arc::new(InMemoryDrawRepository::new());
        let stored = generate_draws(GameType::Mega645, 12, 4).unwrap();
        repo.save_batch(&stored).await.unwrap();

        let service = HistoryService::new(Arc::new(FailingSource), repo);
        let draws = service.load_latest(GameType::Mega645, 10).await.unwrap();
        assert_eq!(draws.len(), 10);
        assert_eq!(draws.last().unwrap().sequence_index(), 12);
    }

    #[tokio::test]
    async fn test_reversed_range_rejected() {
        let service = HistoryService::new(
            Arc::new(FailingSource),
            Arc::new(InMemoryDrawRepository::new()),
        );
        let now = Utc::now();
        let window = BacktestWindow::Between(now, now - Duration::days(1));
        assert!(service.load_window(GameType::Mega645, window).await.is_err());
    }

    #[test]
    fn test_window_descriptions() {
        assert_eq!(BacktestWindow::LastDraws(130).to_string(), "Last 130 draws");
        assert_eq!(BacktestWindow::LastDays(90).to_string(), "Last 90 days");
    }
}
