//! Grows the lazily-loaded results feed until enough candidates are present.

use crate::error::Result;
use mapscout_browser::{BrowserError, NavigableSession};
use mapscout_core::{PipelineConfig, SelectorConfig};
use serde::{Deserialize, Serialize};

/// Why pagination stopped. Each variant carries the number of candidates
/// loaded at that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationOutcome {
    /// At least `target` candidates are loaded
    GoalMet { loaded: usize },
    /// The feed stopped growing, even after the backoff recheck
    Exhausted { loaded: usize },
    /// The scroll ceiling was reached while the feed was still growing
    IterationCeiling { loaded: usize },
}

impl PaginationOutcome {
    /// Candidates loaded when pagination stopped.
    #[must_use]
    pub fn loaded(&self) -> usize {
        match self {
            Self::GoalMet { loaded }
            | Self::Exhausted { loaded }
            | Self::IterationCeiling { loaded } => *loaded,
        }
    }
}

/// Scroll the feed until it holds at least `target` candidates or stops
/// growing.
///
/// Each iteration counts the loaded candidates, scrolls the container to its
/// bottom and waits one settle interval. If the scroll height did not change,
/// it waits one backoff interval and rechecks; an unchanged height then means
/// the feed is exhausted. A missing feed container counts as exhausted. A
/// zero target is met without reading the feed at all.
pub async fn grow_feed_until<S>(
    session: &S,
    target: usize,
    selectors: &SelectorConfig,
    pipeline: &PipelineConfig,
) -> Result<PaginationOutcome>
where
    S: NavigableSession + ?Sized,
{
    let feed = selectors.feed_container.as_str();
    let item = selectors.feed_item.as_str();

    if target == 0 {
        return Ok(PaginationOutcome::GoalMet { loaded: 0 });
    }

    let mut metrics = session.feed_metrics(feed, item).await?;

    let mut last_height = metrics.scroll_height;
    let mut iterations = 0u32;

    loop {
        if metrics.item_count >= target {
            tracing::debug!(loaded = metrics.item_count, target, iterations, "Feed goal met");
            return Ok(PaginationOutcome::GoalMet {
                loaded: metrics.item_count,
            });
        }

        if iterations >= pipeline.max_scroll_iterations {
            tracing::warn!(
                loaded = metrics.item_count,
                target,
                iterations,
                "Scroll ceiling reached before goal"
            );
            return Ok(PaginationOutcome::IterationCeiling {
                loaded: metrics.item_count,
            });
        }

        match session.scroll_feed(feed).await {
            Ok(()) => {}
            Err(BrowserError::SelectorNotFound(sel)) => {
                tracing::warn!(selector = %sel, "Feed container missing; treating feed as exhausted");
                return Ok(PaginationOutcome::Exhausted {
                    loaded: metrics.item_count,
                });
            }
            Err(e) => return Err(e.into()),
        }
        iterations += 1;

        tokio::time::sleep(pipeline.settle_interval()).await;
        metrics = session.feed_metrics(feed, item).await?;

        if metrics.scroll_height == last_height {
            tokio::time::sleep(pipeline.exhaustion_backoff()).await;
            metrics = session.feed_metrics(feed, item).await?;

            if metrics.scroll_height == last_height {
                tracing::debug!(
                    loaded = metrics.item_count,
                    target,
                    iterations,
                    "Feed exhausted"
                );
                return Ok(PaginationOutcome::Exhausted {
                    loaded: metrics.item_count,
                });
            }
        }

        last_height = metrics.scroll_height;
    }
}
