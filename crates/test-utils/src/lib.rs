use metaprompt::errors::PromptError;
use metaprompt::providers::ai::{AiProvider, SamplingOptions};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Debug};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Canned model responses ---

/// A well-formed invoice extraction, as a model would return it.
pub const INVOICE_RESPONSE: &str = r#"{
  "business": {"name": "Acme Supplies", "address": "1 Main St", "tax_id": null},
  "invoice": {"number": "INV-1", "date": "01-02-2024", "due_date": null},
  "items": [{"description": "Widget", "quantity": 2, "unit_price": 5.0, "total": 10.0}],
  "payment": {"subtotal": 10.0, "tax": 0.0, "total": 10.0, "currency": "USD"}
}"#;

/// A well-formed email extraction wrapped in a markdown fence.
pub const EMAIL_RESPONSE: &str = "Here is the data:\n```json\n{\"metadata\": {\"from\": \"ana@example.com\", \"subject\": \"Hello\"}, \"content\": {\"summary\": \"Greeting\"}, \"attachments\": [], \"contact_info\": null}\n```";

/// A well-formed legal extraction.
pub const LEGAL_RESPONSE: &str = r#"{"document_info": {"title": "Services Agreement"}, "parties": [{"name": "Acme"}, {"name": "Globex"}], "key_terms": null, "obligations": [], "signatures": []}"#;

// --- Mock AI Provider ---

type ErrorFactory = Arc<dyn Fn() -> PromptError + Send + Sync>;

#[derive(Clone)]
enum Reply {
    Text(String),
    Error(ErrorFactory),
}

/// A scriptable `AiProvider` for logic tests.
///
/// Queued replies are consumed first, in order. After that, keyed responses
/// are matched against the system and user prompts. With nothing programmed
/// the provider answers with an `UpstreamError`.
#[derive(Clone)]
pub struct MockAiProvider {
    model: String,
    delay: Option<Duration>,
    queue: Arc<Mutex<VecDeque<Reply>>>,
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    options: Arc<Mutex<Vec<SamplingOptions>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            delay: None,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            options: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Makes every call sleep before answering, for deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Pre-programs a response for any prompt containing `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Queues a response for the next unanswered call.
    pub fn push_response(&self, response: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Reply::Text(response.to_string()));
    }

    /// Queues a failure for the next unanswered call.
    pub fn push_error<F>(&self, error: F)
    where
        F: Fn() -> PromptError + Send + Sync + 'static,
    {
        self.queue
            .lock()
            .unwrap()
            .push_back(Reply::Error(Arc::new(error)));
    }

    /// Retrieves the recorded `(system_prompt, user_prompt)` calls.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Retrieves the sampling options of each recorded call.
    pub fn get_options(&self) -> Vec<SamplingOptions> {
        self.options.lock().unwrap().clone()
    }

    fn next_reply(&self, system_prompt: &str, user_prompt: &str) -> Result<String, PromptError> {
        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return match reply {
                Reply::Text(text) => Ok(text),
                Reply::Error(make) => Err(make()),
            };
        }

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) || user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::UpstreamError(format!(
            "MockAiProvider: No response programmed. Got system prompt: '{system_prompt}'"
        )))
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MockAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockAiProvider")
            .field("model", &self.model)
            .field("delay", &self.delay)
            .field("calls", &self.calls.lock().map(|c| c.len()).unwrap_or_default())
            .finish()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate_with(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: SamplingOptions,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.options.lock().unwrap().push(options);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_reply(system_prompt, user_prompt)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a single-page PDF that draws `text` in Helvetica.
    pub fn generate_test_pdf(text: &str) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Extraction fixture");
        let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
        let layer_id = doc.add_layer(&Layer::new("Body"));

        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        page.ops = vec![
            Op::BeginLayer {
                layer_id: layer_id.clone(),
            },
            Op::SetFontSize {
                size: Pt(12.0),
                font: font_id.clone(),
            },
            Op::StartTextSection,
            Op::SetTextMatrix {
                matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
            },
            Op::SetTextRenderingMode {
                mode: TextRenderingMode::Fill,
            },
            Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: font_id,
            },
            Op::EndTextSection,
            Op::EndLayer { layer_id },
        ];
        doc.pages.push(page);

        let mut warnings = Vec::new();
        Ok(doc.save(&PdfSaveOptions::default(), &mut warnings))
    }
}
