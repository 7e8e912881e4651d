//! Structured evaluation record and the reply schema it is parsed from

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Placeholder for a field the model did not return
pub const MISSING_FIELD: &str = "N/A";
/// Placeholder for a missing narrative evaluation
pub const MISSING_EVALUATION: &str = "Evaluación detallada no encontrada.";

/// Fields of the model reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluationField {
    CategoryI,
    CategoryII,
    CategoryIII,
    CategoryIV,
    CategoryV,
    Total,
    ShortFeedback,
    FullEvaluation,
    /// Only requested when name extraction is enabled
    StudentName,
}

impl EvaluationField {
    /// The eight fields every reply must carry
    pub const REQUIRED: [EvaluationField; 8] = [
        EvaluationField::CategoryI,
        EvaluationField::CategoryII,
        EvaluationField::CategoryIII,
        EvaluationField::CategoryIV,
        EvaluationField::CategoryV,
        EvaluationField::Total,
        EvaluationField::ShortFeedback,
        EvaluationField::FullEvaluation,
    ];

    pub const CATEGORIES: [EvaluationField; 5] = [
        EvaluationField::CategoryI,
        EvaluationField::CategoryII,
        EvaluationField::CategoryIII,
        EvaluationField::CategoryIV,
        EvaluationField::CategoryV,
    ];

    /// JSON key in the reply
    pub fn key(&self) -> &'static str {
        match self {
            EvaluationField::CategoryI => "I_ElementosCurriculares",
            EvaluationField::CategoryII => "II_SecuenciaDidactica",
            EvaluationField::CategoryIII => "III_PrincipiosDidacticos",
            EvaluationField::CategoryIV => "IV_InstrumentosEvaluacion",
            EvaluationField::CategoryV => "V_EvidenciasImplementacion",
            EvaluationField::Total => "Total_Calculado",
            EvaluationField::ShortFeedback => "Retroalimentacion_Corta",
            EvaluationField::FullEvaluation => "Evaluacion_Completa_Markdown",
            EvaluationField::StudentName => "Nombre_Estudiante",
        }
    }

    /// Human-readable column label
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationField::CategoryI => "I. Elementos Curriculares y Contexto (Plantilla)",
            EvaluationField::CategoryII => "II. Secuencia Didáctica JUMP Math (Metodología)",
            EvaluationField::CategoryIII => "III. Aplicación de Principios Didácticos JUMP Math",
            EvaluationField::CategoryIV => "IV. Instrumentos de Evaluación",
            EvaluationField::CategoryV => "V. Evidencias de Implementación (Anexo)",
            EvaluationField::Total => "Total",
            EvaluationField::ShortFeedback => "Retroalimentación",
            EvaluationField::FullEvaluation => "Evaluación Completa",
            EvaluationField::StudentName => "Nombre",
        }
    }

    /// Schema description sent to the model
    pub fn description(&self) -> &'static str {
        match self {
            EvaluationField::CategoryI => {
                "Puntaje o nivel de logro para 'I. Elementos Curriculares y Contexto'"
            }
            EvaluationField::CategoryII => {
                "Puntaje o nivel de logro para 'II. Secuencia Didáctica JUMP Math'"
            }
            EvaluationField::CategoryIII => {
                "Puntaje o nivel de logro para 'III. Aplicación de Principios Didácticos JUMP Math'"
            }
            EvaluationField::CategoryIV => {
                "Puntaje o nivel de logro para 'IV. Instrumentos de Evaluación'"
            }
            EvaluationField::CategoryV => {
                "Puntaje o nivel de logro para 'V. Evidencias de Implementación (Anexo)'"
            }
            EvaluationField::Total => {
                "El puntaje total final o la evaluación general (ej: '18/20' o 'Sobresaliente')."
            }
            EvaluationField::ShortFeedback => {
                "Un resumen conciso y motivador de los comentarios finales (máximo 200 caracteres)"
            }
            EvaluationField::FullEvaluation => {
                "El texto completo y detallado de la evaluación, incluyendo Puntos Fuertes, \
                 Áreas de Mejora y Comentarios Finales en formato Markdown."
            }
            EvaluationField::StudentName => {
                "Nombre completo del estudiante tal como aparece en el trabajo, o cadena vacía si no aparece."
            }
        }
    }
}

/// Reply schema in the model service's OpenAPI subset
pub fn response_schema(include_student_name: bool) -> Value {
    let mut fields: Vec<EvaluationField> = EvaluationField::REQUIRED.to_vec();
    if include_student_name {
        fields.push(EvaluationField::StudentName);
    }

    let mut properties = Map::new();
    for field in &fields {
        properties.insert(
            field.key().to_string(),
            json!({ "type": "STRING", "description": field.description() }),
        );
    }
    let required: Vec<&str> = fields.iter().map(|f| f.key()).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// One evaluated submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub student_name: String,
    pub category_i: String,
    pub category_ii: String,
    pub category_iii: String,
    pub category_iv: String,
    pub category_v: String,
    pub total: String,
    pub short_feedback: String,
    pub full_evaluation: String,
}

impl EvaluationResult {
    /// Every field set to its placeholder
    pub fn with_sentinels(student_name: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            category_i: MISSING_FIELD.to_string(),
            category_ii: MISSING_FIELD.to_string(),
            category_iii: MISSING_FIELD.to_string(),
            category_iv: MISSING_FIELD.to_string(),
            category_v: MISSING_FIELD.to_string(),
            total: MISSING_FIELD.to_string(),
            short_feedback: MISSING_FIELD.to_string(),
            full_evaluation: MISSING_EVALUATION.to_string(),
        }
    }

    /// Overwrite the placeholders from a parsed reply.
    ///
    /// Returns the required fields that were absent or blank and kept their
    /// placeholder. A non-blank `Nombre_Estudiante` replaces the name given
    /// at construction.
    pub fn apply_reply(&mut self, reply: &Map<String, Value>) -> Vec<EvaluationField> {
        let mut missing = Vec::new();
        for field in EvaluationField::REQUIRED {
            match reply.get(field.key()).and_then(value_text) {
                Some(text) => *self.slot_mut(field) = text,
                None => missing.push(field),
            }
        }
        if let Some(name) = reply.get(EvaluationField::StudentName.key()).and_then(value_text) {
            self.student_name = name;
        }
        missing
    }

    pub fn get(&self, field: EvaluationField) -> &str {
        match field {
            EvaluationField::CategoryI => &self.category_i,
            EvaluationField::CategoryII => &self.category_ii,
            EvaluationField::CategoryIII => &self.category_iii,
            EvaluationField::CategoryIV => &self.category_iv,
            EvaluationField::CategoryV => &self.category_v,
            EvaluationField::Total => &self.total,
            EvaluationField::ShortFeedback => &self.short_feedback,
            EvaluationField::FullEvaluation => &self.full_evaluation,
            EvaluationField::StudentName => &self.student_name,
        }
    }

    fn slot_mut(&mut self, field: EvaluationField) -> &mut String {
        match field {
            EvaluationField::CategoryI => &mut self.category_i,
            EvaluationField::CategoryII => &mut self.category_ii,
            EvaluationField::CategoryIII => &mut self.category_iii,
            EvaluationField::CategoryIV => &mut self.category_iv,
            EvaluationField::CategoryV => &mut self.category_v,
            EvaluationField::Total => &mut self.total,
            EvaluationField::ShortFeedback => &mut self.short_feedback,
            EvaluationField::FullEvaluation => &mut self.full_evaluation,
            EvaluationField::StudentName => &mut self.student_name,
        }
    }
}

/// Text of a reply value; `None` for null and blank strings
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Successful evaluation of one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub result: EvaluationResult,
    /// Required fields that fell back to their placeholder
    pub missing_fields: Vec<EvaluationField>,
}

impl Evaluation {
    pub fn full_evaluation_markdown(&self) -> &str {
        &self.result.full_evaluation
    }

    pub fn is_degraded(&self) -> bool {
        !self.missing_fields.is_empty()
    }

    pub fn into_parts(self) -> (String, EvaluationResult) {
        (self.result.full_evaluation.clone(), self.result)
    }
}
