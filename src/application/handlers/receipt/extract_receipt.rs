//! ExtractReceiptHandler - Command handler for turning a receipt image into a document.
//!
//! Keeps the upload, asks the extraction model for JSON, repairs and parses
//! it, runs the receipt rules (and schema checks), then replaces the cached
//! document.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::receipt::prompts::EXTRACTION_INSTRUCTIONS;
use crate::domain::receipt::{
    parse_document, ExtractedDocument, ProviderJsonError, ReceiptImage, ReceiptRules,
    ValidationIssue,
};
use crate::ports::{
    AIError, AIProvider, CompletionRequest, ContentPart, DocumentCache, FinishReason, ImageDetail,
    Message, ReceiptSchemaValidator, RequestMetadata, ResponseFormat, SchemaError, UploadError,
    UploadStore,
};

/// Filename used when the client uploads an image without one.
pub const DEFAULT_IMAGE_FILENAME: &str = "boleta.jpg";

/// Tunables for the extraction call.
#[derive(Debug, Clone)]
pub struct ExtractReceiptConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub image_detail: ImageDetail,
    /// Fail on schema violations instead of reporting them as issues.
    pub enforce_schema: bool,
}

impl Default for ExtractReceiptConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_output_tokens: 1200,
            image_detail: ImageDetail::Low,
            enforce_schema: false,
        }
    }
}

/// Command to extract a receipt from an uploaded image.
#[derive(Debug, Clone)]
pub struct ExtractReceiptCommand {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ExtractReceiptCommand {
    /// Creates a command, falling back to the default filename when none is given.
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_FILENAME.to_string());
        Self { filename, bytes }
    }
}

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractReceiptResult {
    pub document: ExtractedDocument,
    /// Advisory rule (and, when not enforced, schema) findings in check order.
    pub issues: Vec<ValidationIssue>,
    /// Where the uploaded image was kept.
    pub upload_path: PathBuf,
    /// False when the disk snapshot could not be written.
    pub persisted: bool,
}

/// Errors that can occur while extracting a receipt.
#[derive(Debug, Error)]
pub enum ExtractReceiptError {
    #[error("El archivo subido está vacío.")]
    EmptyUpload,

    #[error("No se pudo guardar la imagen: {0}")]
    Upload(#[from] UploadError),

    /// Provider call failed.
    #[error("No se pudo extraer la boleta: {0}")]
    Provider(#[from] AIError),

    /// Provider answered with something that is not a JSON object.
    #[error("No se pudo extraer la boleta: {0}")]
    InvalidOutput(#[from] ProviderJsonError),

    /// Output hit the token cap before the JSON was complete.
    #[error("No se pudo extraer la boleta: la respuesta se cortó al llegar a {max_output_tokens} tokens.")]
    Truncated { max_output_tokens: u32 },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Handler for receipt extraction.
pub struct ExtractReceiptHandler {
    provider: Arc<dyn AIProvider>,
    cache: Arc<dyn DocumentCache>,
    uploads: Arc<dyn UploadStore>,
    schema: Arc<dyn ReceiptSchemaValidator>,
    config: ExtractReceiptConfig,
}

impl ExtractReceiptHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        cache: Arc<dyn DocumentCache>,
        uploads: Arc<dyn UploadStore>,
        schema: Arc<dyn ReceiptSchemaValidator>,
        config: ExtractReceiptConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            uploads,
            schema,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: ExtractReceiptCommand,
    ) -> Result<ExtractReceiptResult, ExtractReceiptError> {
        if cmd.bytes.is_empty() {
            return Err(ExtractReceiptError::EmptyUpload);
        }

        tracing::info!(filename = %cmd.filename, bytes = cmd.bytes.len(), "Extracting receipt");

        // 1. Keep the upload
        let upload_path = self.uploads.save(&cmd.filename, &cmd.bytes).await?;

        // 2. Ask the extraction model
        let image = ReceiptImage::new(cmd.filename, cmd.bytes);
        let request = self.build_request(&image);
        let completion = self.provider.complete(request).await?;

        // 3. Parse, repairing a fenced answer once
        let document = match parse_document(&completion.content) {
            Ok(document) => document,
            Err(_) if completion.finish_reason == FinishReason::Length => {
                return Err(ExtractReceiptError::Truncated {
                    max_output_tokens: self.config.max_output_tokens,
                });
            }
            Err(err) => return Err(err.into()),
        };

        // 4. Validate
        let issues = self.validate(&document)?;

        // 5. Replace the cached document
        let persisted = match self.cache.store(document.clone()).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Receipt cached in memory only: {}", err);
                false
            }
        };

        tracing::info!(
            model = %completion.model,
            items = document.line_items().len(),
            issues = issues.len(),
            persisted,
            "Receipt extracted"
        );

        Ok(ExtractReceiptResult {
            document,
            issues,
            upload_path,
            persisted,
        })
    }

    fn build_request(&self, image: &ReceiptImage) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new("extract_receipt"))
            .with_model(&self.config.model)
            .with_message(Message::user_parts(vec![
                ContentPart::text(EXTRACTION_INSTRUCTIONS),
                ContentPart::image(image.to_data_url(), self.config.image_detail),
            ]))
            .with_max_tokens(self.config.max_output_tokens)
            .with_response_format(ResponseFormat::JsonObject)
    }

    /// Rule issues first, then schema violations unless the schema is enforced.
    fn validate(&self, document: &ExtractedDocument) -> Result<Vec<ValidationIssue>, SchemaError> {
        let mut issues = ReceiptRules::check(document);

        match self.schema.validate(document) {
            Ok(()) => {}
            Err(SchemaError::Violations(violations)) if !self.config.enforce_schema => {
                issues.extend(
                    violations
                        .iter()
                        .map(|v| ValidationIssue::new(v.to_string())),
                );
            }
            Err(err) => return Err(err),
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::{InMemoryDocumentCache, LocalUploadStore};
    use crate::adapters::validation::JsonSchemaValidator;
    use crate::ports::{CacheError, CacheSource, MessageRole, TokenUsage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    const WELL_FORMED: &str = r#"{"issuer":{"ruc":"20123456789"},"series":"B001","totals":{"op_gravada":100.00,"igv":18.00,"total":118.00}}"#;

    struct Fixture {
        provider: MockAIProvider,
        cache: Arc<InMemoryDocumentCache>,
        _dir: TempDir,
        handler: ExtractReceiptHandler,
    }

    fn fixture(provider: MockAIProvider, config: ExtractReceiptConfig) -> Fixture {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(InMemoryDocumentCache::new());
        let handler = ExtractReceiptHandler::new(
            Arc::new(provider.clone()),
            cache.clone(),
            Arc::new(LocalUploadStore::new(dir.path().join("uploads"))),
            Arc::new(JsonSchemaValidator::receipt().unwrap()),
            config,
        );
        Fixture {
            provider,
            cache,
            _dir: dir,
            handler,
        }
    }

    fn command() -> ExtractReceiptCommand {
        ExtractReceiptCommand::new(Some("boleta.png".into()), b"\x89PNG".to_vec())
    }

    #[tokio::test]
    async fn well_formed_receipt_has_no_issues_and_is_cached() {
        let f = fixture(
            MockAIProvider::new().with_response(WELL_FORMED),
            ExtractReceiptConfig::default(),
        );

        let result = f.handler.handle(command()).await.unwrap();

        assert!(result.issues.is_empty());
        assert!(result.persisted);
        assert_eq!(result.document.series(), Some("B001"));
        assert!(result.upload_path.ends_with("uploads/boleta.png"));

        let (cached, source) = f.cache.load().await.unwrap();
        assert_eq!(cached, result.document);
        assert_eq!(source, CacheSource::Memory);
    }

    #[tokio::test]
    async fn fenced_json_is_repaired() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        let f = fixture(
            MockAIProvider::new().with_response(fenced),
            ExtractReceiptConfig::default(),
        );

        let result = f.handler.handle(command()).await.unwrap();
        assert_eq!(result.document.issuer_ruc(), Some("20123456789"));
    }

    #[tokio::test]
    async fn request_carries_instructions_image_and_limits() {
        let f = fixture(
            MockAIProvider::new().with_response(WELL_FORMED),
            ExtractReceiptConfig::default(),
        );

        f.handler.handle(command()).await.unwrap();

        let calls = f.provider.get_calls();
        assert_eq!(calls.len(), 1);
        let request = &calls[0];
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
        assert_eq!(request.max_tokens, Some(1200));
        assert_eq!(request.response_format, ResponseFormat::JsonObject);
        assert_eq!(request.messages.len(), 1);

        let message = &request.messages[0];
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.text(), EXTRACTION_INSTRUCTIONS);
        assert_eq!(message.image_count(), 1);
        match &message.content[1] {
            ContentPart::Image { url, detail } => {
                assert!(url.starts_with("data:image/png;base64,"));
                assert_eq!(*detail, ImageDetail::Low);
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rule_issues_are_reported_in_order() {
        let body = r#"{"issuer":{"ruc":"123"},"series":"B1","totals":{"op_gravada":100,"igv":10,"total":110}}"#;
        let f = fixture(
            MockAIProvider::new().with_response(body),
            ExtractReceiptConfig::default(),
        );

        let result = f.handler.handle(command()).await.unwrap();
        let messages: Vec<&str> = result.issues.iter().map(|i| i.message()).collect();

        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("RUC inválido"));
        assert!(messages[1].starts_with("Serie inválida"));
        assert!(messages[2].starts_with("IGV inconsistente"));
    }

    #[tokio::test]
    async fn schema_violations_are_advisory_by_default() {
        let f = fixture(
            MockAIProvider::new().with_response(r#"{"series":"B001","totals":{"total":0}}"#),
            ExtractReceiptConfig::default(),
        );

        let result = f.handler.handle(command()).await.unwrap();
        let last = result.issues.last().unwrap().message().to_string();

        assert!(last.contains("issuer"), "unexpected issue: {last}");
        assert!(f.cache.load().await.is_some());
    }

    #[tokio::test]
    async fn enforced_schema_rejects_and_keeps_cache() {
        let f = fixture(
            MockAIProvider::new().with_response(r#"{"series":"B001","totals":{"total":0}}"#),
            ExtractReceiptConfig {
                enforce_schema: true,
                ..Default::default()
            },
        );

        let err = f.handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, ExtractReceiptError::Schema(_)));
        assert!(f.cache.load().await.is_none());
    }

    #[tokio::test]
    async fn unparsable_output_fails_and_keeps_previous_document() {
        let f = fixture(
            MockAIProvider::new()
                .with_response(WELL_FORMED)
                .with_response("Lo siento, no puedo leer la imagen."),
            ExtractReceiptConfig::default(),
        );

        f.handler.handle(command()).await.unwrap();
        let err = f.handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, ExtractReceiptError::InvalidOutput(_)));
        let (cached, _) = f.cache.load().await.unwrap();
        assert_eq!(cached.series(), Some("B001"));
    }

    #[tokio::test]
    async fn provider_failure_is_an_extraction_error() {
        let f = fixture(
            MockAIProvider::new().with_error(AIError::AuthenticationFailed),
            ExtractReceiptConfig::default(),
        );

        let err = f.handler.handle(command()).await.unwrap_err();

        assert!(matches!(err, ExtractReceiptError::Provider(_)));
        assert_eq!(
            err.to_string(),
            "No se pudo extraer la boleta: autenticación rechazada por el proveedor"
        );
    }

    #[tokio::test]
    async fn cut_off_output_reports_token_cap() {
        let f = fixture(
            MockAIProvider::new().with_response_full(
                r#"{"issuer":{"ruc":"20123456789"},"series":"B0"#,
                TokenUsage::new(900, 1200, 3),
                FinishReason::Length,
            ),
            ExtractReceiptConfig::default(),
        );

        let err = f.handler.handle(command()).await.unwrap_err();

        assert!(matches!(
            err,
            ExtractReceiptError::Truncated { max_output_tokens: 1200 }
        ));
        assert_eq!(
            err.to_string(),
            "No se pudo extraer la boleta: la respuesta se cortó al llegar a 1200 tokens."
        );
        assert!(f.cache.load().await.is_none());
    }

    #[tokio::test]
    async fn complete_json_at_token_cap_is_accepted() {
        let f = fixture(
            MockAIProvider::new().with_response_full(
                WELL_FORMED,
                TokenUsage::new(900, 1200, 3),
                FinishReason::Length,
            ),
            ExtractReceiptConfig::default(),
        );

        let result = f.handler.handle(command()).await.unwrap();

        assert_eq!(result.document.series(), Some("B001"));
    }

    #[tokio::test]
    async fn empty_upload_is_rejected_before_provider_call() {
        let f = fixture(MockAIProvider::new(), ExtractReceiptConfig::default());

        let err = f
            .handler
            .handle(ExtractReceiptCommand::new(None, vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractReceiptError::EmptyUpload));
        assert_eq!(f.provider.call_count(), 0);
    }

    #[test]
    fn missing_filename_uses_default() {
        assert_eq!(ExtractReceiptCommand::new(None, vec![1]).filename, "boleta.jpg");
        assert_eq!(ExtractReceiptCommand::new(Some("".into()), vec![1]).filename, "boleta.jpg");
    }

    struct FailingCache;

    #[async_trait]
    impl DocumentCache for FailingCache {
        async fn store(&self, _document: ExtractedDocument) -> Result<(), CacheError> {
            Err(CacheError::Persist {
                path: "last_result.json".into(),
                message: "read-only file system".into(),
            })
        }

        async fn load(&self) -> Option<(ExtractedDocument, CacheSource)> {
            None
        }
    }

    #[tokio::test]
    async fn snapshot_failure_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let handler = ExtractReceiptHandler::new(
            Arc::new(MockAIProvider::new().with_response(WELL_FORMED)),
            Arc::new(FailingCache),
            Arc::new(LocalUploadStore::new(dir.path())),
            Arc::new(JsonSchemaValidator::receipt().unwrap()),
            ExtractReceiptConfig::default(),
        );

        let result = handler.handle(command()).await.unwrap();
        assert!(!result.persisted);
    }
}
