// Analysis prompt templates and the Gemini response schema.
// All prompt text for the analysis module is defined here.

use serde_json::{json, Value};

use crate::models::creative::{FormatGroup, Language};

/// A Meta placement surface the creative can run on. The prompt only lists
/// placements of the selected format group.
pub struct Placement {
    pub id: &'static str,
    pub name: &'static str,
    pub group: FormatGroup,
}

pub const PLACEMENTS: &[Placement] = &[
    Placement { id: "FB_FEED", name: "Facebook Feed", group: FormatGroup::SquareLike },
    Placement { id: "FB_VIDEO_FEED", name: "Facebook Video Feed", group: FormatGroup::SquareLike },
    Placement { id: "FB_MARKETPLACE", name: "Facebook Marketplace", group: FormatGroup::SquareLike },
    Placement { id: "IG_FEED", name: "Instagram Feed", group: FormatGroup::SquareLike },
    Placement { id: "IG_EXPLORE", name: "Instagram Explore", group: FormatGroup::SquareLike },
    Placement { id: "MESSENGER_INBOX", name: "Messenger Inbox", group: FormatGroup::SquareLike },
    Placement { id: "FB_STORIES", name: "Facebook Stories", group: FormatGroup::Vertical },
    Placement { id: "FB_REELS", name: "Facebook Reels", group: FormatGroup::Vertical },
    Placement { id: "IG_STORIES", name: "Instagram Stories", group: FormatGroup::Vertical },
    Placement { id: "IG_REELS", name: "Instagram Reels", group: FormatGroup::Vertical },
    Placement { id: "MESSENGER_STORIES", name: "Messenger Stories", group: FormatGroup::Vertical },
    Placement { id: "AUDIENCE_NETWORK", name: "Audience Network", group: FormatGroup::Vertical },
];

/// Condensed Meta Ads specification document embedded verbatim into every
/// analysis prompt so the model grades against the same rules each time.
pub const META_ADS_GUIDELINES: &str = "\
ESPECIFICACIONES META ADS:
- Feed (1:1 / 4:5): mantener texto y logos dentro del 90% central; la interfaz \
superpone nombre de página arriba y CTA abajo.
- Stories/Reels (9:16): zona segura = evitar el 14% superior (~250px) y el 20% \
inferior (~340px); ahí se superponen perfil, CTA y barra de acciones.
- Ratio texto/imagen recomendado: menos del 20% de texto gráfico superpuesto. \
Los subtítulos incrustados que transcriben audio no cuentan.
- Resolución mínima recomendada: 1080px en el lado menor.

MEJORAS AUTOMÁTICAS DE META ADVANTAGE+:
- Mejoras visuales (brillo/contraste automáticos)
- Plantillas de video (recortes y animación de imágenes estáticas)
- Música añadida automáticamente
- Expansión de imagen (relleno generativo a otros ratios)
- Superposiciones de texto (destacar texto del anuncio sobre el creativo)
- Animación 3D
- Descripciones automáticas en el anuncio";

/// Builds the master analysis prompt: role instruction, per-client context,
/// the placement list for the chosen format group and the guidelines
/// document. The instruction body is Spanish; the model is told which
/// language to answer in.
pub fn build_analysis_prompt(
    format_group: FormatGroup,
    language: Language,
    context: &str,
) -> String {
    let placement_list = PLACEMENTS
        .iter()
        .filter(|p| p.group == format_group)
        .map(|p| format!("- {} (ID: {})", p.name, p.id))
        .collect::<Vec<_>>()
        .join("\n");

    let language_instruction = if language.is_spanish() { "ESPAÑOL" } else { "ENGLISH" };

    format!(
        r#"**Instrucción Maestra:**
Actúas como un director de arte y estratega de marketing para Meta Ads, con un ojo extremadamente crítico, amigable y detallista. Tu tarea es realizar un análisis HOLÍSTICO del creativo proporcionado para el grupo de formatos '{format_group}'. Tu análisis debe ser específico, accionable y basarse en el creativo y las especificaciones. TODO el texto de tu respuesta debe estar exclusivamente en {language_instruction}.

**Contexto Adicional:**
{context}

**Paso 0: Comprensión del Objetivo del Creativo (ACCIÓN FUNDAMENTAL):**
Antes de CUALQUIER otra cosa, tu primera acción es entender a fondo qué está vendiendo o qué oferta clave está comunicando el creativo. Identifica el producto, servicio, o mensaje principal. TODO tu análisis posterior (puntuaciones, justificaciones, recomendaciones) debe estar rigurosamente fundamentado en este objetivo central.

**Ubicaciones a Considerar en tu Análisis para '{format_group}':**
{placement_list}

**TAREAS DE ANÁLISIS OBLIGATORIAS:**

**1. DESCRIPCIÓN DETALLADA DEL CREATIVO:**
- **creativeDescription**: Describe la imagen o video de forma precisa y detallada. Menciona los elementos clave (productos, personas, texto principal, ambiente, colores dominantes). Esta descripción se usará como contexto para futuros análisis. Sé específico.

**2. ANÁLISIS ESTRATÉGICO GLOBAL:**
- **effectivenessJustification**: Sé coherente. Si el puntaje es BAJO (<50), la justificación DEBE explicar por qué el creativo falla en comunicar su objetivo principal. Si es ALTO (>=50), debe resaltar cómo logra comunicarlo.
- **textToImageRatio**: Ignora por completo los subtítulos que transcriben el audio. Céntrate únicamente en texto gráfico superpuesto, logos o llamadas a la acción que formen parte del diseño.
- **recommendations**: Recomendaciones generales para mejorar cómo el creativo comunica su objetivo.

**3. ANÁLISIS DE ZONAS DE SEGURIDAD (LA TAREA MÁS IMPORTANTE):**
- **placementSummaries**: Tu MÁXIMA PRIORIDAD. Analiza el creativo visualmente, frame a frame si es un video. Detecta si cualquier elemento (texto, logos, disclaimers, producto) queda tapado, cortado o ilegible por la interfaz de Meta EN CUALQUIER MOMENTO. Clasifica estos problemas como CRÍTICOS si afectan el CTA, la oferta o la marca. Si no hay problemas, indícalo positivamente.

**4. ANÁLISIS DE MEJORAS ADVANTAGE+:**
- **advantagePlusAnalysis**: Analiza CADA una de las mejoras listadas en el documento. Indica si se recomienda 'ACTIVATE' o 'CAUTION', y justifica tu respuesta según cómo la mejora potenciaría (o perjudicaría) el objetivo del creativo.

**5. CONCLUSIÓN FINAL:**
- **overallConclusion**: Un objeto con un 'headline' conciso y un 'checklist' accionable y priorizado.

**Formato de Salida Obligatorio (JSON ÚNICAMENTE):**
Debes responder con un único objeto JSON. TODO el texto debe estar en {language_instruction}.

--- DOCUMENTO DE ESPECIFICACIONES (META ADS Y ADVANTAGE+) ---
{guidelines}
--- FIN DEL DOCUMENTO ---"#,
        format_group = format_group,
        language_instruction = language_instruction,
        context = context,
        placement_list = placement_list,
        guidelines = META_ADS_GUIDELINES,
    )
}

/// Prompt for the free-text performance-insights summary: the descriptions
/// of the current top creatives, one per line, under a single instruction.
pub fn build_insights_prompt(descriptions: &[String]) -> String {
    format!(
        "Analiza por qué estos creativos funcionaron bien y sugiere próximos pasos:\n{}",
        descriptions.join("\n")
    )
}

/// Gemini response schema mirroring `AnalysisResult`. Constrains the model
/// to the exact JSON shape the cache stores verbatim.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "creativeDescription": {
                "type": "STRING",
                "description": "Descripción detallada del contenido visual del creativo; se usa como contexto para análisis futuros."
            },
            "effectivenessScore": { "type": "NUMBER" },
            "effectivenessJustification": { "type": "STRING" },
            "clarityScore": { "type": "NUMBER" },
            "clarityJustification": { "type": "STRING" },
            "textToImageRatio": { "type": "NUMBER" },
            "textToImageRatioJustification": { "type": "STRING" },
            "funnelStage": { "type": "STRING", "enum": ["TOFU", "MOFU", "BOFU"] },
            "funnelStageJustification": { "type": "STRING" },
            "recommendations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "headline": { "type": "STRING" },
                        "points": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["headline", "points"]
                }
            },
            "advantagePlusAnalysis": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "enhancement": { "type": "STRING" },
                        "applicable": { "type": "STRING", "enum": ["ACTIVATE", "CAUTION"] },
                        "justification": { "type": "STRING" }
                    },
                    "required": ["enhancement", "applicable", "justification"]
                }
            },
            "placementSummaries": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "placementId": { "type": "STRING" },
                        "summary": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["placementId", "summary"]
                }
            },
            "overallConclusion": {
                "type": "OBJECT",
                "properties": {
                    "headline": { "type": "STRING" },
                    "checklist": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "severity": { "type": "STRING", "enum": ["CRITICAL", "ACTIONABLE", "POSITIVE"] },
                                "text": { "type": "STRING" }
                            },
                            "required": ["severity", "text"]
                        }
                    }
                },
                "required": ["headline", "checklist"]
            }
        },
        "required": [
            "creativeDescription",
            "effectivenessScore", "effectivenessJustification",
            "clarityScore", "clarityJustification",
            "textToImageRatio", "textToImageRatioJustification",
            "funnelStage", "funnelStageJustification",
            "recommendations", "advantagePlusAnalysis", "placementSummaries",
            "overallConclusion"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_only_selected_group() {
        let prompt = build_analysis_prompt(FormatGroup::Vertical, Language::Es, "ctx");
        assert!(prompt.contains("IG_STORIES"));
        assert!(!prompt.contains("FB_MARKETPLACE"));
    }

    #[test]
    fn test_prompt_embeds_context_and_language() {
        let prompt = build_analysis_prompt(FormatGroup::SquareLike, Language::En, "client history here");
        assert!(prompt.contains("client history here"));
        assert!(prompt.contains("ENGLISH"));
    }

    #[test]
    fn test_insights_prompt_lists_descriptions() {
        let descriptions = vec!["a red sneaker close-up".to_string(), "UGC testimonial".to_string()];
        let prompt = build_insights_prompt(&descriptions);
        assert!(prompt.starts_with("Analiza por qué estos creativos funcionaron bien"));
        assert!(prompt.contains("a red sneaker close-up\nUGC testimonial"));
    }

    #[test]
    fn test_schema_requires_description() {
        let schema = analysis_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "creativeDescription"));
    }
}
