//! Prompt text for extraction and receipt Q&A.
//!
//! The prompts are in Spanish because the receipts and the users are.

/// Instruction sent with the receipt image.
pub const EXTRACTION_INSTRUCTIONS: &str = concat!(
    "Eres un experto en extracción de datos de comprobantes de pago de tipo Boletas y Facturas del Perú. ",
    "Lee cuidadosamente la imagen y devuelve SOLO un JSON válido. ",
    "Incluye todos los campos que puedas inferir; si un dato no aparece, omítelo. ",
    "Precios y totales deben ser numéricos (usa punto decimal). ",
    "VALIDACIONES: Lee el valor IMPORTE TOTAL (de existir) y comparalo con la suma del subtotal por item ",
    "(multiplicando la cantidad por el precio unitario) y verifica que sean iguales. ",
    "Si encuentras diferencias vuelve a verificar UNA SOLA VEZ si omitiste alguna línea e incorporala a la lista ",
    "y verifica el total calculado. ",
    "Si hay fecha con formato atípico, conviértela a ISO 8601 si es posible.",
    "\n\n",
    "Extrae todos los datos legibles de esta boleta/recibo en español. ",
    "Respeta el esquema. Si se ve el porcentaje de IGV (18% en Perú) ",
    "y corresponde, refleja base imponible, IGV y total. ",
    "No agregues texto fuera del JSON.",
);

/// System instruction for answering questions about a receipt.
pub const ANSWER_SYSTEM_PROMPT: &str =
    "Responde SOLO en base a los datos JSON de la boleta. Si no está, di que no aparece.";

/// Where a question came from; transcribed questions are labelled as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSource {
    Text,
    Audio,
}

/// User prompt embedding the receipt JSON and the question.
pub fn question_prompt(document_json: &str, question: &str, source: QuestionSource) -> String {
    let label = match source {
        QuestionSource::Text => "Pregunta",
        QuestionSource::Audio => "Pregunta (audio)",
    };
    format!("Datos de la boleta:\n{}\n\n{}: {}", document_json, label, question)
}
