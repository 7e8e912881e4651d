//! Prompt construction - service layer
//!
//! Rubric and submission are embedded verbatim; there is no size check, so
//! very large documents go to the model as they are.

use crate::config::Config;
use crate::models::EvaluationField;

/// Builds the evaluation instruction for one submission
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    short_feedback_limit: usize,
    ask_student_name: bool,
}

impl PromptBuilder {
    pub fn new(config: &Config) -> Self {
        Self::with_options(config.short_feedback_limit, config.extract_student_name)
    }

    pub fn with_options(short_feedback_limit: usize, ask_student_name: bool) -> Self {
        Self {
            short_feedback_limit,
            ask_student_name,
        }
    }

    /// Compose the instruction for `submission_text` against `rubric_text`
    ///
    /// # Parameters
    /// - `rubric_text`: embedded verbatim
    /// - `submission_text`: embedded verbatim
    /// - `display_name`: names the author in the instruction when non-blank
    pub fn build(&self, rubric_text: &str, submission_text: &str, display_name: Option<&str>) -> String {
        let author = display_name
            .filter(|name| !name.trim().is_empty())
            .map(|name| format!(" {}", name.to_uppercase()))
            .unwrap_or_default();

        let categories = EvaluationField::CATEGORIES
            .iter()
            .map(|f| format!("'{}' ({})", f.key(), f.label()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            r#"Actúa como un profesor universitario experto en evaluación de trabajos académicos. Tu tarea es doble:
1. Evaluar el trabajo con respecto a los CRITERIOS.
2. Entregar el resultado estrictamente como un objeto JSON que siga el esquema proporcionado.

**CRITERIOS DE EVALUACIÓN:**
{rubric_text}

**TRABAJO DEL ESTUDIANTE O DOCENTE{author}:**
{submission_text}

**INSTRUCCIONES PARA EL JSON:**
* Para las claves {categories}, asigna un Nivel de Logro o Puntaje basado en los criterios y el trabajo.
* Para '{total}', proporciona el puntaje o la calificación final.
* Para '{short}', escribe un resumen conciso (MÁXIMO {limit} CARACTERES) y motivador.
* Para '{full}', escribe la evaluación detallada, organizada con encabezados claros y viñetas, que incluya:
    1. **PUNTOS FUERTES** (1-3 aspectos bien desarrollados)
    2. **ÁREAS DE MEJORA** (1-3 aspectos a mejorar con sugerencias concretas)
    3. **COMENTARIOS FINALES** (retroalimentación constructiva y motivadora)
"#,
            total = EvaluationField::Total.key(),
            short = EvaluationField::ShortFeedback.key(),
            full = EvaluationField::FullEvaluation.key(),
            limit = self.short_feedback_limit,
        );

        if self.ask_student_name {
            prompt.push_str(&format!(
                "* Para '{}', copia el nombre completo del estudiante tal como aparece en el trabajo; si no aparece, deja la cadena vacía.\n",
                EvaluationField::StudentName.key()
            ));
        }

        prompt
    }
}
