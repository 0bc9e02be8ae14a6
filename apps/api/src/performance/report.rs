use csv::StringRecord;

use crate::errors::AppError;
use crate::models::performance::PerformanceRecord;

/// Decodes a Meta Ads performance report (CSV export) into typed records.
///
/// Coercion happens here, at the ingestion boundary: numeric columns parse
/// with a 0 default, text columns default to empty, and nothing
/// loosely-typed flows past this function. Unknown columns are ignored.
pub fn parse_report(
    bytes: &[u8],
    client_id: &str,
    file_hash: &str,
) -> Result<Vec<PerformanceRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Unreadable report header: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed report row: {e}");
                continue;
            }
        };
        rows.push(coerce_row(&headers, &record, client_id, file_hash));
    }

    if rows.is_empty() {
        return Err(AppError::EmptyReport);
    }
    Ok(rows)
}

/// Composite natural key: uniqueness of a row per client is defined by
/// campaign + ad set + ad + day, nothing else.
pub fn composite_key(campaign: &str, ad_set: &str, ad: &str, day: &str) -> String {
    format!("{campaign}_{ad_set}_{ad}_{day}")
}

fn coerce_row(
    headers: &StringRecord,
    record: &StringRecord,
    client_id: &str,
    file_hash: &str,
) -> PerformanceRecord {
    let text = |name: &str| -> String {
        column(headers, record, name).unwrap_or_default().to_string()
    };
    let num = |name: &str| -> f64 {
        column(headers, record, name)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    let int = |name: &str| -> i64 {
        column(headers, record, name)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };

    let campaign_name = text("Nombre de la campaña");
    let ad_set_name = text("Nombre del conjunto de anuncios");
    let ad_name = text("Nombre del anuncio");
    let day = text("Día");
    let unique_id = composite_key(&campaign_name, &ad_set_name, &ad_name, &day);

    PerformanceRecord {
        client_id: client_id.to_string(),
        unique_id,
        file_hash: file_hash.to_string(),
        campaign_name,
        ad_set_name,
        ad_name,
        day,
        creative_name: text("Imagen, video y presentación"),
        spend: num("Importe gastado (EUR)"),
        campaign_delivery: text("Entrega de la campaña"),
        ad_set_delivery: text("Entrega del conjunto de anuncios"),
        ad_delivery: text("Entrega del anuncio"),
        impressions: int("Impresiones"),
        link_clicks: int("Clics en el enlace"),
        cpc: num("CPC (Coste por clic)"),
        ctr: num("CTR (todos)"),
        reach: int("Alcance"),
        frequency: num("Frecuencia"),
        purchases: int("Compras"),
        purchase_value: num("Valor de conversión de compras"),
        delivery_status: text("Estado de la entrega"),
        delivery_level: text("Nivel de la entrega"),
        objective: text("Objetivo"),
        purchase_type: text("Tipo de compra"),
        report_start: text("Inicio del informe"),
        report_end: text("Fin del informe"),
        attention: int("Atencion"),
        interest: int("Interes"),
        desire: int("Deseo"),
    }
}

fn column<'a>(headers: &StringRecord, record: &'a StringRecord, name: &str) -> Option<&'a str> {
    let idx = headers.iter().position(|h| h == name)?;
    record.get(idx)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_CSV: &str = "\
Nombre de la campaña,Nombre del conjunto de anuncios,Nombre del anuncio,Día,\"Imagen, video y presentación\",Importe gastado (EUR),Impresiones,Clics en el enlace,Compras,Valor de conversión de compras
Campaign1,Set1,Ad1,2024-01-01,ad1.mp4,10.5,1000,50,2,42.0
Campaign1,Set1,Ad2,2024-01-01,ad2.jpg,5.0,500,10,0,0
";

    pub(crate) fn sample_record(
        client_id: &str,
        file_hash: &str,
        ad_name: &str,
        day: &str,
    ) -> PerformanceRecord {
        PerformanceRecord {
            client_id: client_id.to_string(),
            unique_id: composite_key("Campaign1", "Set1", ad_name, day),
            file_hash: file_hash.to_string(),
            campaign_name: "Campaign1".to_string(),
            ad_set_name: "Set1".to_string(),
            ad_name: ad_name.to_string(),
            day: day.to_string(),
            creative_name: format!("{ad_name} - video_final_v2.mp4"),
            spend: 10.0,
            campaign_delivery: String::new(),
            ad_set_delivery: String::new(),
            ad_delivery: String::new(),
            impressions: 1000,
            link_clicks: 50,
            cpc: 0.2,
            ctr: 5.0,
            reach: 800,
            frequency: 1.25,
            purchases: 2,
            purchase_value: 40.0,
            delivery_status: String::new(),
            delivery_level: String::new(),
            objective: String::new(),
            purchase_type: String::new(),
            report_start: String::new(),
            report_end: String::new(),
            attention: 0,
            interest: 0,
            desire: 0,
        }
    }

    #[test]
    fn test_parse_coerces_numeric_columns() {
        let rows = parse_report(SAMPLE_CSV.as_bytes(), "c1", "h1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].campaign_name, "Campaign1");
        assert_eq!(rows[0].spend, 10.5);
        assert_eq!(rows[0].impressions, 1000);
        assert_eq!(rows[0].unique_id, "Campaign1_Set1_Ad1_2024-01-01");
        assert_eq!(rows[0].client_id, "c1");
        assert_eq!(rows[0].file_hash, "h1");
    }

    #[test]
    fn test_missing_columns_default_to_zero_and_empty() {
        let csv = "Nombre de la campaña,Día\nC1,2024-02-02\n";
        let rows = parse_report(csv.as_bytes(), "c1", "h1").unwrap();
        assert_eq!(rows[0].spend, 0.0);
        assert_eq!(rows[0].purchases, 0);
        assert_eq!(rows[0].creative_name, "");
        assert_eq!(rows[0].unique_id, "C1___2024-02-02");
    }

    #[test]
    fn test_unparsable_numbers_default_to_zero() {
        let csv = "Nombre de la campaña,Día,Importe gastado (EUR),Impresiones\nC1,2024-02-02,n/a,lots\n";
        let rows = parse_report(csv.as_bytes(), "c1", "h1").unwrap();
        assert_eq!(rows[0].spend, 0.0);
        assert_eq!(rows[0].impressions, 0);
    }

    #[test]
    fn test_empty_report_is_an_error() {
        let csv = "Nombre de la campaña,Día\n";
        let err = parse_report(csv.as_bytes(), "c1", "h1").unwrap_err();
        assert!(matches!(err, AppError::EmptyReport));
    }
}
