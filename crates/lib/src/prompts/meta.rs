//! # Meta-Prompt Templates
//!
//! Prompts used by the `PromptGenerator` to have a model write new extraction
//! prompts from a free-form task description.

/// The persona for prompt generation.
pub const META_SYSTEM_PROMPT: &str = r#"You are an expert prompt engineer specializing in data extraction from documents.
Your task is to create a precise and effective prompt that will enable an LLM to extract structured data from various document types.
The prompt you generate should:
1. Be clear and unambiguous
2. Be detailed yet concise
3. Include specific instructions for formatting the output (typically JSON)
4. Handle edge cases and ambiguities
5. Guide the model to extract only the information that's requested

Your prompts should follow a consistent structure:
- A clear statement of purpose
- Context for the extraction task
- Specific data fields to extract
- Format instructions with examples
- Guidelines for handling missing or uncertain data"#;

/// Wraps the user's task description with the requirements for the generated prompt.
///
/// Placeholders: `{user_query}`
pub const ENHANCED_QUERY_TEMPLATE: &str = r#"I need you to create a detailed prompt for a data extraction task based on the following requirement:

"{user_query}"

The prompt you generate should:
1. Instruct the model to carefully analyze the entire document provided in {file_content}
2. Specify all data fields that need to be extracted as mentioned in the requirement
3. Provide clear instructions on the expected output format (JSON)
4. Include guidance on handling missing or unclear information
5. Include at least one example of the expected output format

Please generate the complete prompt that I can use with an LLM to extract the specified data."#;

/// The last-resort prompt when no model is reachable and no builtin template matches.
///
/// Placeholders: `{user_query}`. The `{file_content}` token is left in place.
pub const GENERIC_EXTRACTION_TEMPLATE: &str = r#"You are a data extraction assistant. Your task is to carefully analyze the document provided in {file_content} and extract the following information in a structured JSON format:

{user_query}

Format your response as a JSON object with the appropriate structure for the requested data.

Guidelines:
1. If certain information is not present in the document, use null for that field or omit the field entirely.
2. Convert all monetary values to numbers (not strings).
3. Use consistent date formatting (DD-MM-YYYY).
4. If you're uncertain about any information, include a "confidence" field with a value between 0 and 1.
5. Extract the data exactly as it appears without making assumptions or adding information not present in the document.
6. Only include the JSON in your response, with no additional explanation or commentary."#;

/// Temperature used for prompt generation.
pub const GENERATION_TEMPERATURE: f32 = 0.5;
