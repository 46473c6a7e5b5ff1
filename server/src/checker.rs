//! The check pipeline: fetch → diff against the stored baseline →
//! short-circuit or summarize → persist → retention trim.
//!
//! Fetch and persistence failures abort the request. Summarization never
//! does: it degrades into fallback text inside the stored record.

use watch_service_cli::clip_chars;
use watch_service_cli::diff::generate_diff;

use crate::error::ApiError;
use crate::models::check::{CheckRecord, RETENTION_LIMIT};
use crate::models::link::Link;
use crate::state::AppState;

/// Stored as the record's diff on the very first check of a link.
pub const INITIAL_DIFF_SENTINEL: &str = "Initial check - no previous data.";

pub const NO_CHANGES_MESSAGE: &str = "No changes detected";

/// On the first check the summarizer sees this many characters of the raw
/// content instead of a degenerate everything-added diff.
pub const SUMMARY_INPUT_MAX: usize = 1500;

#[derive(Debug)]
pub enum CheckOutcome {
    /// Prior history exists and the fetched content is unchanged; nothing
    /// was written.
    NoChanges,
    Recorded(CheckRecord),
}

/// Run one full check for `link`. Checks on the same link are serialized;
/// checks on different links run independently.
pub async fn run_check(state: &AppState, link: &Link) -> Result<CheckOutcome, ApiError> {
    let lock = state.check_lock(&link.id);
    let _guard = lock.lock().await;

    tracing::info!(link_id = %link.id, url = %link.url, "starting check");
    let new_content = state.fetcher.fetch_page_text(&link.url).await?;

    process_content(state, link, new_content).await
}

/// Pipeline after the fetch; split out so tests can drive it with canned
/// content instead of the network. Callers other than tests must hold the
/// link's check lock.
pub async fn process_content(
    state: &AppState,
    link: &Link,
    new_content: String,
) -> Result<CheckOutcome, ApiError> {
    let baseline = CheckRecord::most_recent_for(&state.pool, &link.id).await?;
    let old_content = baseline.map(|r| r.content_snapshot).unwrap_or_default();
    let first_check = old_content.is_empty();

    let diff = if first_check {
        String::new()
    } else {
        generate_diff(&old_content, &new_content)
    };

    // A first check never short-circuits: an empty baseline means there is
    // nothing to compare against, not "no changes".
    if !first_check && diff.trim().is_empty() {
        tracing::info!(link_id = %link.id, "no changes detected");
        return Ok(CheckOutcome::NoChanges);
    }

    let summary_input = if first_check {
        clip_chars(&new_content, SUMMARY_INPUT_MAX)
    } else {
        diff.as_str()
    };
    let summary = state.summarizer.summarize(summary_input).await;

    let stored_diff = if first_check {
        INITIAL_DIFF_SENTINEL.to_string()
    } else {
        diff
    };

    let record = CheckRecord::new(&link.id, new_content, stored_diff, summary);
    record.insert(&state.pool).await?;

    let removed = CheckRecord::delete_oldest_excess(&state.pool, &link.id, RETENTION_LIMIT).await?;
    if removed > 0 {
        tracing::debug!(link_id = %link.id, removed, "trimmed old check records");
    }

    tracing::info!(link_id = %link.id, record_id = %record.id, "check recorded");
    Ok(CheckOutcome::Recorded(record))
}

#[cfg(test)]
mod tests {
    use watch_service_cli::fetch::PageFetcher;
    use watch_service_cli::summary::Summarizer;

    use super::*;
    use crate::db;

    async fn test_state() -> AppState {
        let pool = db::memory_pool().await.unwrap();
        // No API key: summaries resolve to the missing-key fallback without
        // touching the network.
        AppState::new(
            pool,
            PageFetcher::new().unwrap(),
            Summarizer::new(None, "gpt-4o-mini"),
        )
    }

    fn test_link(id: &str) -> Link {
        Link {
            id: id.to_string(),
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            tags: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_check_records_sentinel_and_snapshot() {
        let state = test_state().await;
        let link = test_link("l1");
        let content = "Welcome to the example page with plenty of words".to_string();

        let outcome = process_content(&state, &link, content.clone())
            .await
            .unwrap();
        let record = match outcome {
            CheckOutcome::Recorded(r) => r,
            other => panic!("expected a record, got {other:?}"),
        };
        assert_eq!(record.diff, INITIAL_DIFF_SENTINEL);
        assert_eq!(record.content_snapshot, content);
        assert!(!record.summary.is_empty());
    }

    #[tokio::test]
    async fn first_check_never_short_circuits_even_on_tiny_content() {
        let state = test_state().await;
        let link = test_link("l1");

        let outcome = process_content(&state, &link, "tiny".to_string())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckOutcome::Recorded(_)));
        assert_eq!(
            CheckRecord::count_for(&state.pool, &link.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn identical_content_short_circuits_without_writing() {
        let state = test_state().await;
        let link = test_link("l1");
        let content = "Stable content that does not change between checks".to_string();

        process_content(&state, &link, content.clone()).await.unwrap();
        let outcome = process_content(&state, &link, content).await.unwrap();

        assert!(matches!(outcome, CheckOutcome::NoChanges));
        assert_eq!(
            CheckRecord::count_for(&state.pool, &link.id).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn changed_content_records_only_the_changed_spans() {
        let state = test_state().await;
        let link = test_link("l1");

        process_content(
            &state,
            &link,
            "News page headline alpha with more stable text".to_string(),
        )
        .await
        .unwrap();
        let outcome = process_content(
            &state,
            &link,
            "News page headline beta with more stable text".to_string(),
        )
        .await
        .unwrap();

        let record = match outcome {
            CheckOutcome::Recorded(r) => r,
            other => panic!("expected a record, got {other:?}"),
        };
        assert_eq!(record.diff, "[REMOVED]: alpha\n[ADDED]: beta");
        assert!(!record.diff.contains("stable"));
    }

    #[tokio::test]
    async fn summarizer_failure_still_persists_a_fallback_summary() {
        let state = test_state().await;
        let link = test_link("l1");

        let outcome = process_content(
            &state,
            &link,
            "A substantial first snapshot with enough text to summarize".to_string(),
        )
        .await
        .unwrap();
        let record = match outcome {
            CheckOutcome::Recorded(r) => r,
            other => panic!("expected a record, got {other:?}"),
        };
        assert_eq!(record.summary, "Summary unavailable: no API key configured.");
    }

    #[tokio::test]
    async fn retention_cap_holds_across_many_checks() {
        let state = test_state().await;
        let link = test_link("l1");

        for n in 0..8 {
            let outcome = process_content(
                &state,
                &link,
                format!("Page content revision number {n} with stable filler words"),
            )
            .await
            .unwrap();
            assert!(matches!(outcome, CheckOutcome::Recorded(_)));
        }

        let history = CheckRecord::list_for(&state.pool, &link.id).await.unwrap();
        assert_eq!(history.len(), 5);
        assert!(history[0].content_snapshot.contains("number 7"));
        assert!(history[4].content_snapshot.contains("number 3"));
    }

    #[tokio::test]
    async fn baseline_is_always_the_most_recent_snapshot() {
        let state = test_state().await;
        let link = test_link("l1");

        process_content(&state, &link, "first version of the page".to_string())
            .await
            .unwrap();
        process_content(&state, &link, "second version of the page".to_string())
            .await
            .unwrap();

        // Re-checking with the second version again is a no-op, proving the
        // second snapshot (not the first) is the comparison baseline.
        let outcome = process_content(&state, &link, "second version of the page".to_string())
            .await
            .unwrap();
        assert!(matches!(outcome, CheckOutcome::NoChanges));
    }
}
