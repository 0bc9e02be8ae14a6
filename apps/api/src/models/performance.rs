use serde::{Deserialize, Serialize};

/// One row of an ingested Meta Ads performance report. Persisted field
/// names mirror the Spanish column headers of the export so stored data
/// stays comparable with the raw report.
///
/// Uniqueness per client is enforced on `unique_id`, the composite
/// `campaign_adset_ad_day` key. First write wins: a row whose key was seen
/// before is discarded even if other fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    /// Hash of the source report file; keyed on by the undo path.
    #[serde(rename = "fileHash")]
    pub file_hash: String,

    #[serde(rename = "Nombre de la campaña")]
    pub campaign_name: String,
    #[serde(rename = "Nombre del conjunto de anuncios")]
    pub ad_set_name: String,
    #[serde(rename = "Nombre del anuncio")]
    pub ad_name: String,
    #[serde(rename = "Día")]
    pub day: String,
    /// Creative identifier column; the reconciler substring-matches
    /// analysis-history filenames against this.
    #[serde(rename = "Imagen, video y presentación")]
    pub creative_name: String,
    #[serde(rename = "Importe gastado (EUR)")]
    pub spend: f64,
    #[serde(rename = "Entrega de la campaña")]
    pub campaign_delivery: String,
    #[serde(rename = "Entrega del conjunto de anuncios")]
    pub ad_set_delivery: String,
    #[serde(rename = "Entrega del anuncio")]
    pub ad_delivery: String,
    #[serde(rename = "Impresiones")]
    pub impressions: i64,
    #[serde(rename = "Clics en el enlace")]
    pub link_clicks: i64,
    #[serde(rename = "CPC (Coste por clic)")]
    pub cpc: f64,
    #[serde(rename = "CTR (todos)")]
    pub ctr: f64,
    #[serde(rename = "Alcance")]
    pub reach: i64,
    #[serde(rename = "Frecuencia")]
    pub frequency: f64,
    #[serde(rename = "Compras")]
    pub purchases: i64,
    #[serde(rename = "Valor de conversión de compras")]
    pub purchase_value: f64,
    #[serde(rename = "Estado de la entrega")]
    pub delivery_status: String,
    #[serde(rename = "Nivel de la entrega")]
    pub delivery_level: String,
    #[serde(rename = "Objetivo")]
    pub objective: String,
    #[serde(rename = "Tipo de compra")]
    pub purchase_type: String,
    #[serde(rename = "Inicio del informe")]
    pub report_start: String,
    #[serde(rename = "Fin del informe")]
    pub report_end: String,
    #[serde(rename = "Atencion")]
    pub attention: i64,
    #[serde(rename = "Interes")]
    pub interest: i64,
    #[serde(rename = "Deseo")]
    pub desire: i64,
}

/// A performance row annotated at read time with the outcome of the
/// heuristic filename join against analysis history. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPerformanceRecord {
    #[serde(flatten)]
    pub record: PerformanceRecord,
    pub is_matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_description: Option<String>,
}

/// Outcome of the most recent report merge, returned to the caller so it
/// can offer the single-step undo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub client_id: String,
    pub file_hash: String,
    pub records_added: usize,
    pub duplicates_ignored: usize,
}
