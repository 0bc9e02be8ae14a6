pub mod cache;
pub mod handlers;
pub mod prompts;

use crate::llm_client::{BlockReason, LlmError};
use crate::models::analysis::{
    AnalysisResult, ChecklistItem, ChecklistSeverity, OverallConclusion,
};
use crate::models::creative::Language;

/// Builds a well-formed, error-shaped `AnalysisResult`. The headline always
/// carries the error marker so `cache::is_error_result` suppresses caching
/// and history recording, and downstream rendering needs no special case.
pub fn error_result(headline: &str, message: &str) -> AnalysisResult {
    AnalysisResult {
        creative_description: "Error".to_string(),
        effectiveness_score: 0.0,
        effectiveness_justification: "Error".to_string(),
        clarity_score: 0.0,
        clarity_justification: "Error".to_string(),
        text_to_image_ratio: 0.0,
        text_to_image_ratio_justification: "Error".to_string(),
        funnel_stage: "Error".to_string(),
        funnel_stage_justification: "Error".to_string(),
        recommendations: vec![],
        advantage_plus_analysis: vec![],
        placement_summaries: vec![],
        overall_conclusion: OverallConclusion {
            headline: headline.to_string(),
            checklist: vec![ChecklistItem {
                severity: ChecklistSeverity::Critical,
                text: message.to_string(),
            }],
        },
    }
}

/// Maps a failed remote call to a localized headline/message pair.
/// None of these are retried automatically; the user re-triggers manually.
pub fn error_result_for(err: &LlmError, language: Language) -> AnalysisResult {
    let es = language.is_spanish();
    let (headline, message) = match err {
        LlmError::MissingApiKey => (
            if es { "Error de Configuración" } else { "Configuration Error" },
            if es {
                "La API Key de Gemini no está configurada. Por favor, asegúrate de que la variable de entorno GEMINI_API_KEY esté disponible.".to_string()
            } else {
                "The Gemini API Key is not configured. Please ensure the GEMINI_API_KEY environment variable is available.".to_string()
            },
        ),
        LlmError::Blocked(BlockReason::Safety) => (
            if es { "Error: Respuesta Bloqueada por Seguridad" } else { "Error: Response Blocked for Safety" },
            if es {
                "El contenido del creativo puede haber sido identificado como sensible.".to_string()
            } else {
                "The creative content may have been identified as sensitive.".to_string()
            },
        ),
        LlmError::Blocked(BlockReason::Recitation) => (
            if es { "Error: Respuesta Bloqueada por Recitación" } else { "Error: Response Blocked for Recitation" },
            if es {
                "El contenido es demasiado similar a material protegido por derechos de autor.".to_string()
            } else {
                "The content is too similar to copyrighted material.".to_string()
            },
        ),
        LlmError::Blocked(BlockReason::MaxTokens) => (
            if es { "Error: Límite de Tokens Alcanzado" } else { "Error: Token Limit Reached" },
            if es {
                "Se alcanzó el límite máximo de tokens. Intenta con un creativo más simple.".to_string()
            } else {
                "The maximum token limit was reached. Try with a simpler creative.".to_string()
            },
        ),
        LlmError::EmptyContent => (
            if es { "Error: Fallo de Generación" } else { "Error: Generation Failed" },
            if es {
                "La respuesta de la IA está vacía. Esto puede ocurrir si el modelo no puede procesar el archivo o si la respuesta fue bloqueada por otras razones.".to_string()
            } else {
                "The AI response is empty. This can occur if the model cannot process the file or if the response was blocked for other reasons.".to_string()
            },
        ),
        other => (
            if es { "Error de Análisis" } else { "Analysis Error" },
            if es {
                format!("Hubo un error al generar las recomendaciones: {other}")
            } else {
                format!("There was an error generating the recommendations: {other}")
            },
        ),
    };

    error_result(headline, &message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_failure_maps_to_error_marked_result() {
        let errors = [
            LlmError::MissingApiKey,
            LlmError::Blocked(BlockReason::Safety),
            LlmError::Blocked(BlockReason::Recitation),
            LlmError::Blocked(BlockReason::MaxTokens),
            LlmError::EmptyContent,
        ];
        for err in &errors {
            for lang in [Language::Es, Language::En] {
                let result = error_result_for(err, lang);
                assert!(
                    cache::is_error_result(&result),
                    "{err:?} in {lang} must carry the error marker"
                );
                assert_eq!(result.overall_conclusion.checklist.len(), 1);
            }
        }
    }

    #[test]
    fn test_config_error_is_localized() {
        let es = error_result_for(&LlmError::MissingApiKey, Language::Es);
        assert_eq!(es.overall_conclusion.headline, "Error de Configuración");
        let en = error_result_for(&LlmError::MissingApiKey, Language::En);
        assert_eq!(en.overall_conclusion.headline, "Configuration Error");
    }
}
