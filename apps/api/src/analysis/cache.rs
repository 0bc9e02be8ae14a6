use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::analysis::{AnalysisHistoryEntry, AnalysisResult, CachedAnalysis};
use crate::models::creative::{FormatGroup, Language};
use crate::storage::Repository;

/// Cache entries older than this are treated as misses. Expiry is checked
/// lazily at read time; stale entries stay in the store until a later
/// write overwrites them.
pub const CACHE_TTL_MS: i64 = 48 * 60 * 60 * 1000;

/// How many history entries feed the prompt context for one client.
pub const CONTEXT_WINDOW: usize = 15;

/// Returns a cached result only when one exists for the exact
/// (hash, client, language, format) key and is younger than the TTL.
pub fn lookup(
    repo: &Repository,
    hash: &str,
    client_id: &str,
    language: Language,
    format: FormatGroup,
    now: DateTime<Utc>,
) -> Option<AnalysisResult> {
    let key = Repository::cache_key(hash, client_id, language, format);
    let entry = repo.cache_get(&key)?;
    if now.timestamp_millis() - entry.timestamp > CACHE_TTL_MS {
        return None;
    }
    Some(entry.result)
}

/// Writes the result under the cache key, overwriting any stale entry.
pub fn store(
    repo: &Repository,
    hash: &str,
    client_id: &str,
    language: Language,
    format: FormatGroup,
    result: &AnalysisResult,
    now: DateTime<Utc>,
) -> Result<()> {
    let key = Repository::cache_key(hash, client_id, language, format);
    repo.cache_put(
        &key,
        &CachedAnalysis {
            result: result.clone(),
            timestamp: now.timestamp_millis(),
        },
    )
}

/// Exact-triple dedup lookup. A match means the same bytes were already
/// analyzed under the same name and size; the caller auto-associates the
/// upload with the matched entry's client instead of re-analyzing.
pub fn find_duplicate_upload(
    repo: &Repository,
    hash: &str,
    filename: &str,
    size: u64,
) -> Option<AnalysisHistoryEntry> {
    repo.history()
        .into_iter()
        .find(|e| e.hash == hash && e.filename == filename && e.size == size)
}

/// Renders the contextual grounding block for the next analysis call: the
/// client line plus up to the last `CONTEXT_WINDOW` history entries for
/// that client, in insertion order. Always yields an explicit placeholder
/// when there is no history.
pub fn build_context(repo: &Repository, client_id: &str, language: Language) -> String {
    let client_line = repo
        .find_client(client_id)
        .map(|c| format!("Analizando para el cliente: {} (Moneda: {})", c.name, c.currency))
        .unwrap_or_default();

    let history = repo.history();
    let client_entries: Vec<_> = history.iter().filter(|e| e.client_id == client_id).collect();
    let start = client_entries.len().saturating_sub(CONTEXT_WINDOW);
    let history_block = client_entries[start..]
        .iter()
        .map(|e| {
            format!(
                "File: {}\nDate: {}\nDescription: {}",
                e.filename,
                e.date.to_rfc3339(),
                e.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let placeholder = if language.is_spanish() {
        "No hay historial previo."
    } else {
        "No prior history."
    };

    format!(
        "{client_line}\n\n\
         A continuación se muestran los datos de los últimos creativos analizados para este cliente. \
         Utiliza esta información para identificar patrones, estilos recurrentes o campañas y adaptar \
         tus recomendaciones para que sean más coherentes y estratégicas con el historial de la cuenta.\n\
         {history}",
        client_line = client_line,
        history = if history_block.is_empty() { placeholder } else { history_block.as_str() },
    )
    .trim()
    .to_string()
}

/// Error-shaped results carry a recognizable marker in the conclusion
/// headline. They must never be cached or recorded as history: a failed
/// analysis must not poison the cache or satisfy a later dedup check.
pub fn is_error_result(result: &AnalysisResult) -> bool {
    result.overall_conclusion.headline.to_lowercase().contains("error")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::analysis::{ChecklistItem, ChecklistSeverity, OverallConclusion};
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    pub(crate) fn sample_result(description: &str, headline: &str) -> AnalysisResult {
        AnalysisResult {
            creative_description: description.to_string(),
            effectiveness_score: 80.0,
            effectiveness_justification: "ok".to_string(),
            clarity_score: 75.0,
            clarity_justification: "ok".to_string(),
            text_to_image_ratio: 10.0,
            text_to_image_ratio_justification: "ok".to_string(),
            funnel_stage: "TOFU".to_string(),
            funnel_stage_justification: "ok".to_string(),
            recommendations: vec![],
            advantage_plus_analysis: vec![],
            placement_summaries: vec![],
            overall_conclusion: OverallConclusion {
                headline: headline.to_string(),
                checklist: vec![ChecklistItem {
                    severity: ChecklistSeverity::Positive,
                    text: "fine".to_string(),
                }],
            },
        }
    }

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_cache_hit_within_ttl() {
        let repo = repo();
        let result = sample_result("desc", "Listo para publicar");
        let written = Utc::now();
        store(&repo, "h1", "c1", Language::Es, FormatGroup::Vertical, &result, written).unwrap();

        let read_at = written + Duration::hours(47);
        let hit = lookup(&repo, "h1", "c1", Language::Es, FormatGroup::Vertical, read_at);
        assert!(hit.is_some());
    }

    #[test]
    fn test_cache_miss_after_48h() {
        let repo = repo();
        let result = sample_result("desc", "Listo");
        let written = Utc::now();
        store(&repo, "h1", "c1", Language::Es, FormatGroup::Vertical, &result, written).unwrap();

        let read_at = written + Duration::hours(48) + Duration::minutes(1);
        assert!(lookup(&repo, "h1", "c1", Language::Es, FormatGroup::Vertical, read_at).is_none());
    }

    #[test]
    fn test_cache_key_dimensions_are_independent() {
        let repo = repo();
        let result = sample_result("desc", "Listo");
        let now = Utc::now();
        store(&repo, "h1", "c1", Language::Es, FormatGroup::Vertical, &result, now).unwrap();

        // Different client, language or format group all miss
        assert!(lookup(&repo, "h1", "c2", Language::Es, FormatGroup::Vertical, now).is_none());
        assert!(lookup(&repo, "h1", "c1", Language::En, FormatGroup::Vertical, now).is_none());
        assert!(lookup(&repo, "h1", "c1", Language::Es, FormatGroup::SquareLike, now).is_none());
    }

    #[test]
    fn test_duplicate_requires_all_three_fields() {
        let repo = repo();
        repo.push_history_bounded(AnalysisHistoryEntry {
            client_id: "c1".to_string(),
            filename: "ad1.mp4".to_string(),
            hash: "h1".to_string(),
            size: 1000,
            date: Utc::now(),
            description: "a video".to_string(),
        })
        .unwrap();

        assert!(find_duplicate_upload(&repo, "h1", "ad1.mp4", 1000).is_some());
        assert!(find_duplicate_upload(&repo, "h1", "ad1.mp4", 999).is_none());
        assert!(find_duplicate_upload(&repo, "h1", "other.mp4", 1000).is_none());
        assert!(find_duplicate_upload(&repo, "h2", "ad1.mp4", 1000).is_none());
    }

    #[test]
    fn test_context_placeholder_without_history() {
        let repo = repo();
        let ctx = build_context(&repo, "c1", Language::Es);
        assert!(ctx.contains("No hay historial previo."));
        let ctx_en = build_context(&repo, "c1", Language::En);
        assert!(ctx_en.contains("No prior history."));
    }

    #[test]
    fn test_context_limited_to_window_and_client() {
        let repo = repo();
        for n in 0..20 {
            repo.push_history_bounded(AnalysisHistoryEntry {
                client_id: if n % 2 == 0 { "c1" } else { "c2" }.to_string(),
                filename: format!("ad{n}.mp4"),
                hash: format!("h{n}"),
                size: 10,
                date: Utc::now(),
                description: format!("desc {n}"),
            })
            .unwrap();
        }
        let ctx = build_context(&repo, "c1", Language::Es);
        // Only c1 entries appear
        assert!(ctx.contains("ad18.mp4"));
        assert!(!ctx.contains("ad19.mp4"));
        // 10 c1 entries exist, all within the 15-entry window
        assert!(ctx.contains("ad0.mp4"));
    }

    #[test]
    fn test_error_marker_detection() {
        assert!(is_error_result(&sample_result("x", "Error de Configuración")));
        assert!(is_error_result(&sample_result("x", "Analysis Error")));
        assert!(!is_error_result(&sample_result("x", "Listo para publicar")));
    }
}
