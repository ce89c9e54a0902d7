//! Prompt construction for agreement extraction

use crate::error::ValidationFault;

/// Builds prompts for the extraction capability
///
/// A plain prompt asks for a whole agreement. [`PromptBuilder::with_feedback`]
/// turns it into a repair prompt carrying the previous fault, and
/// [`PromptBuilder::for_section`] asks for whatever one section contains.
pub struct PromptBuilder {
    text: String,
    feedback: Option<String>,
    section_label: Option<String>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            feedback: None,
            section_label: None,
        }
    }

    /// Include the fault reported by the previous attempt
    pub fn with_feedback(mut self, fault: &ValidationFault) -> Self {
        self.feedback = Some(fault.to_string());
        self
    }

    /// Ask for partial data from a single section
    pub fn for_section(mut self, label: impl Into<String>) -> Self {
        self.section_label = Some(label.into());
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Instructions
        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(label) = &self.section_label {
            prompt.push_str(&format!("This text is one section of a longer agreement ({}).\n", label));
            prompt.push_str(SECTION_INSTRUCTIONS);
            prompt.push_str("\n\n");
        }

        // 2. Repair feedback
        if let Some(error) = &self.feedback {
            prompt.push_str("Previous extraction attempt failed with validation error:\n");
            prompt.push_str(error);
            prompt.push_str("\n\n");
            prompt.push_str(CORRECTION_CHECKLIST);
            prompt.push_str("\n\n");
            prompt.push_str("Original Contract Text:\n");
        } else {
            prompt.push_str("Contract Text:\n");
        }

        // 3. The text to analyze
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        // 4. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert Credit Analyst. Extract structured data from the provided Credit Agreement text.

Your responsibilities:
1. Extract the exact legal names of parties and their roles (Borrower, Lender, Administrative Agent, etc.)
2. Give every party a short stable "id" (e.g. "borrower_1", "agent")
3. Record amounts as decimal strings to preserve precision, with an ISO 4217 currency (USD, EUR, GBP or JPY)
4. Convert percentage spreads to basis points (e.g., 3.5% -> 350, 2.75% -> 275)
5. Write dates in ISO 8601 format (YYYY-MM-DD)
6. Identify all loan facilities and their terms
7. Extract the governing law/jurisdiction
8. Set extraction_status:
   - success: valid credit agreement extracted
   - partial_data_missing: some fields missing/uncertain
   - irrelevant_document: not a credit agreement or insufficient info

Rules:
- If a field is not explicitly stated in the text, return null. Do not guess or infer values.
- Do not use market standards or assumptions unless explicitly mentioned in the document.
- Convert written numbers (e.g., "five million") to numeric values."#;

const SECTION_INSTRUCTIONS: &str = r#"Extract only what this section states. Every field is optional; use null for anything the section does not mention. Do not set extraction_status."#;

const CORRECTION_CHECKLIST: &str = r#"Please correct the following issues:
1. Ensure all dates are valid and in ISO 8601 format (YYYY-MM-DD)
2. Ensure each facility maturity_date is after agreement_date
3. Ensure all facilities use the same currency
4. Ensure at least one party has role 'Borrower'
5. Convert percentage spreads to basis points (multiply by 100)"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Remember: Return ONLY valid JSON matching the schema, no markdown code blocks, no explanations."#;
