//! # Builtin Extraction Templates
//!
//! One template per builtin document type. Each contains the `{file_content}`
//! placeholder exactly once and a fenced JSON example of the target shape.

/// The system message sent alongside every extraction prompt.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a data extraction assistant. You respond with a single JSON object and nothing else: no explanations, no apologies, no markdown outside of the JSON.";

/// Placeholders: `{file_content}`
pub const INVOICE_TEMPLATE: &str = r#"You are a data extraction assistant. Your task is to carefully analyze the invoice provided below and extract the business details, invoice details, line items and payment information.

# Document
{file_content}

# Output format
Respond with a JSON object that has exactly this structure:

```json
{
  "business": {
    "name": "Acme Supplies Ltd.",
    "address": "12 Market Street, Springfield",
    "tax_id": "GB123456789",
    "phone": "+44 20 7946 0000",
    "email": "billing@acme.example"
  },
  "invoice": {
    "number": "INV-2024-0042",
    "date": "14-03-2024",
    "due_date": "13-04-2024",
    "currency": "GBP",
    "total_net": 250.00,
    "total_tax": 50.00,
    "total_gross": 300.00
  },
  "items": [
    {
      "description": "Widget",
      "quantity": 5,
      "unit_price": 50.00,
      "total_price": 250.00
    }
  ],
  "payment": {
    "method": "bank_transfer",
    "terms": "Net 30",
    "bank_account": "GB29 NWBK 6016 1331 9268 19"
  }
}
```

# Guidelines
1. If certain information is not present in the document, use null for that field.
2. Convert all monetary values to numbers (not strings).
3. Use consistent date formatting (DD-MM-YYYY).
4. List every line item in `items`, in the order it appears on the invoice.
5. Extract the data exactly as it appears without making assumptions or adding information not present in the document.
6. Only include the JSON in your response, with no additional explanation or commentary.
"#;

/// Placeholders: `{file_content}`
pub const EMAIL_TEMPLATE: &str = r#"You are a data extraction assistant. Your task is to carefully analyze the email provided below and extract its metadata, content, attachments and any contact information it contains.

# Document
{file_content}

# Output format
Respond with a JSON object that has exactly this structure:

```json
{
  "metadata": {
    "from": "Jane Doe <jane@example.com>",
    "to": ["team@example.com"],
    "cc": [],
    "date": "02-05-2024",
    "subject": "Quarterly report"
  },
  "content": {
    "summary": "Jane shares the quarterly report and asks for feedback by Friday.",
    "body": "Hi team, please find the quarterly report attached...",
    "action_items": ["Review the report", "Send feedback by Friday"],
    "sentiment": "neutral"
  },
  "attachments": [
    {
      "filename": "q1-report.pdf",
      "description": "Quarterly report"
    }
  ],
  "contact_info": {
    "names": ["Jane Doe"],
    "emails": ["jane@example.com"],
    "phones": ["+1 555 0100"],
    "companies": ["Example Corp"]
  }
}
```

# Guidelines
1. If certain information is not present in the email, use null for that field or an empty list.
2. Use consistent date formatting (DD-MM-YYYY).
3. Keep the summary to at most two sentences.
4. Only list attachments that the email explicitly mentions.
5. Extract the data exactly as it appears without making assumptions or adding information not present in the email.
6. Only include the JSON in your response, with no additional explanation or commentary.
"#;

/// Placeholders: `{file_content}`
pub const LEGAL_TEMPLATE: &str = r#"You are a data extraction assistant specialized in legal documents. Your task is to carefully analyze the contract or agreement provided below and extract its key information.

# Document
{file_content}

# Output format
Respond with a JSON object that has exactly this structure:

```json
{
  "document_info": {
    "title": "Master Services Agreement",
    "type": "contract",
    "effective_date": "01-01-2024",
    "expiration_date": "31-12-2025",
    "governing_law": "State of New York"
  },
  "parties": [
    {
      "name": "Acme Corp",
      "role": "service provider",
      "address": "1 Main Street, New York, NY"
    },
    {
      "name": "Globex Inc",
      "role": "client",
      "address": null
    }
  ],
  "key_terms": [
    {
      "term": "Payment",
      "description": "Client pays monthly fees within 30 days of invoice."
    }
  ],
  "obligations": [
    {
      "party": "Acme Corp",
      "obligation": "Provide support during business hours.",
      "deadline": null
    }
  ],
  "signatures": [
    {
      "name": "John Smith",
      "title": "CEO",
      "party": "Acme Corp",
      "date": "15-12-2023"
    }
  ]
}
```

# Guidelines
1. If certain information is not present in the document, use null for that field or an empty list.
2. Use consistent date formatting (DD-MM-YYYY).
3. Quote key terms and obligations faithfully; do not interpret or give legal advice.
4. Extract the data exactly as it appears without making assumptions or adding information not present in the document.
5. Only include the JSON in your response, with no additional explanation or commentary.
"#;

/// Minimal top-level keys a response for each builtin type must contain.
pub const INVOICE_REQUIRED_KEYS: &[&str] = &["business", "invoice", "items"];
pub const EMAIL_REQUIRED_KEYS: &[&str] = &["metadata", "content"];
pub const LEGAL_REQUIRED_KEYS: &[&str] = &["document_info", "parties"];
