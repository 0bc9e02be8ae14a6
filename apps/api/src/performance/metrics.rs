use chrono::NaiveDate;
use serde::Serialize;

use crate::models::performance::MatchedPerformanceRecord;

/// Aggregate metrics over a date-filtered, reconciled row set. Pure derived
/// view, recomputed per request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub spend: f64,
    pub purchases: i64,
    pub conversion_value: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub roas: f64,
    pub cpa: f64,
    pub ctr: f64,
    pub cpm: f64,
}

/// One entry of the "top creatives" ranking: matched rows grouped by
/// creative identifier, spend and value summed per group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCreative {
    pub creative_name: String,
    pub spend: f64,
    pub conversion_value: f64,
    pub roas: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub const TOP_CREATIVES_LIMIT: usize = 6;

/// Every ratio defines the zero-denominator case as 0: never NaN, never
/// an error.
fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn summarize(rows: &[MatchedPerformanceRecord]) -> SummaryMetrics {
    let spend: f64 = rows.iter().map(|r| r.record.spend).sum();
    let purchases: i64 = rows.iter().map(|r| r.record.purchases).sum();
    let conversion_value: f64 = rows.iter().map(|r| r.record.purchase_value).sum();
    let impressions: i64 = rows.iter().map(|r| r.record.impressions).sum();
    let clicks: i64 = rows.iter().map(|r| r.record.link_clicks).sum();

    SummaryMetrics {
        spend,
        purchases,
        conversion_value,
        impressions,
        clicks,
        roas: safe_ratio(conversion_value, spend),
        cpa: safe_ratio(spend, purchases as f64),
        ctr: safe_ratio(clicks as f64, impressions as f64) * 100.0,
        cpm: safe_ratio(spend, impressions as f64) * 1000.0,
    }
}

/// Groups rows by creative identifier, sums spend/value per group, ranks
/// descending by group ROAS and keeps the top 6.
pub fn top_creatives(rows: &[MatchedPerformanceRecord]) -> Vec<TopCreative> {
    let mut groups: Vec<TopCreative> = Vec::new();

    for row in rows {
        let name = &row.record.creative_name;
        match groups.iter_mut().find(|g| &g.creative_name == name) {
            Some(group) => {
                group.spend += row.record.spend;
                group.conversion_value += row.record.purchase_value;
                if group.description.is_none() {
                    group.description = row.creative_description.clone();
                }
            }
            None => groups.push(TopCreative {
                creative_name: name.clone(),
                spend: row.record.spend,
                conversion_value: row.record.purchase_value,
                roas: 0.0,
                description: row.creative_description.clone(),
            }),
        }
    }

    for group in &mut groups {
        group.roas = safe_ratio(group.conversion_value, group.spend);
    }
    groups.sort_by(|a, b| b.roas.total_cmp(&a.roas));
    groups.truncate(TOP_CREATIVES_LIMIT);
    groups
}

/// Descriptions feeding the insights prompt: one per ranked creative, in
/// ranking order, dropping groups that never matched an analysis.
pub fn matched_descriptions(top: Vec<TopCreative>) -> Vec<String> {
    top.into_iter()
        .filter_map(|c| c.description)
        .filter(|d| !d.is_empty())
        .collect()
}

/// Keeps rows whose day parses as an ISO date and falls inside the
/// inclusive range. Rows with an unparsable day never pass a bounded
/// filter.
pub fn filter_by_date(
    rows: Vec<MatchedPerformanceRecord>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<MatchedPerformanceRecord> {
    if start.is_none() && end.is_none() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| {
            let Ok(day) = NaiveDate::parse_from_str(&r.record.day, "%Y-%m-%d") else {
                return false;
            };
            start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::report::tests::sample_record;

    fn matched(
        ad_name: &str,
        day: &str,
        spend: f64,
        value: f64,
        impressions: i64,
        clicks: i64,
        purchases: i64,
    ) -> MatchedPerformanceRecord {
        let mut record = sample_record("c1", "h1", ad_name, day);
        record.creative_name = format!("{ad_name}.mp4");
        record.spend = spend;
        record.purchase_value = value;
        record.impressions = impressions;
        record.link_clicks = clicks;
        record.purchases = purchases;
        MatchedPerformanceRecord {
            record,
            is_matched: true,
            creative_description: Some(format!("{ad_name} description")),
        }
    }

    #[test]
    fn test_zero_denominators_yield_zero() {
        let rows = vec![matched("Ad1", "2024-01-01", 0.0, 0.0, 0, 0, 0)];
        let summary = summarize(&rows);
        assert_eq!(summary.roas, 0.0);
        assert_eq!(summary.cpa, 0.0);
        assert_eq!(summary.ctr, 0.0);
        assert_eq!(summary.cpm, 0.0);
        assert!(summary.roas.is_finite());
    }

    #[test]
    fn test_summary_ratios() {
        let rows = vec![
            matched("Ad1", "2024-01-01", 10.0, 30.0, 1000, 20, 2),
            matched("Ad2", "2024-01-02", 10.0, 10.0, 1000, 20, 2),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.spend, 20.0);
        assert_eq!(summary.roas, 2.0); // 40 / 20
        assert_eq!(summary.cpa, 5.0); // 20 / 4
        assert_eq!(summary.ctr, 2.0); // 40/2000 * 100
        assert_eq!(summary.cpm, 10.0); // 20/2000 * 1000
    }

    #[test]
    fn test_top_creatives_ranked_by_group_roas_capped_at_six() {
        let mut rows = Vec::new();
        for n in 0..8 {
            // Ad0 has ROAS 0, Ad7 has ROAS 7
            rows.push(matched(&format!("Ad{n}"), "2024-01-01", 10.0, 10.0 * n as f64, 100, 5, 1));
        }
        // Split Ad7 over two days to exercise grouping
        rows.push(matched("Ad7", "2024-01-02", 10.0, 70.0, 100, 5, 1));

        let top = top_creatives(&rows);
        assert_eq!(top.len(), TOP_CREATIVES_LIMIT);
        assert_eq!(top[0].creative_name, "Ad7.mp4");
        assert_eq!(top[0].spend, 20.0);
        assert_eq!(top[0].roas, 7.0); // 140 / 20
        assert!(top.windows(2).all(|w| w[0].roas >= w[1].roas));
    }

    #[test]
    fn test_matched_descriptions_keeps_ranking_order_and_drops_unmatched() {
        let mut rows = vec![
            matched("Ad1", "2024-01-01", 10.0, 50.0, 100, 5, 1),
            matched("Ad2", "2024-01-01", 10.0, 20.0, 100, 5, 1),
        ];
        // Unmatched creative carries no description
        let mut unmatched = matched("Ad3", "2024-01-01", 10.0, 90.0, 100, 5, 1);
        unmatched.is_matched = false;
        unmatched.creative_description = None;
        rows.push(unmatched);

        let descriptions = matched_descriptions(top_creatives(&rows));
        assert_eq!(descriptions, ["Ad1 description", "Ad2 description"]);
    }

    #[test]
    fn test_date_filter_inclusive_bounds() {
        let rows = vec![
            matched("Ad1", "2024-01-01", 1.0, 1.0, 1, 1, 1),
            matched("Ad2", "2024-01-05", 1.0, 1.0, 1, 1, 1),
            matched("Ad3", "2024-01-10", 1.0, 1.0, 1, 1, 1),
            matched("Ad4", "not a date", 1.0, 1.0, 1, 1, 1),
        ];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let filtered = filter_by_date(rows, Some(start), Some(end));
        let ads: Vec<_> = filtered.iter().map(|r| r.record.ad_name.as_str()).collect();
        assert_eq!(ads, ["Ad1", "Ad2"]);
    }

    #[test]
    fn test_unbounded_filter_passes_everything_through() {
        let rows = vec![matched("Ad1", "garbage", 1.0, 1.0, 1, 1, 1)];
        assert_eq!(filter_by_date(rows, None, None).len(), 1);
    }
}
