//! Prompt builders for the inference service.
//!
//! Each stage gets one builder function. Prompts are assembled here rather
//! than held in a mutable registry so the call sites stay free of string
//! plumbing and the wording can change in exactly one place.

/// Instruction for the scoring stage: per-record summary plus 1-10 sentiment.
pub fn summarization_prompt() -> String {
    r#"You are an expert complaint analyzer. Your task is to:

1. Read each customer complaint dialog provided in the input
2. For EACH complaint, create a short summary (1-2 sentences)
3. For EACH complaint, assign a sentiment score from 1-10 where:
   - 1-3: Very negative (customer is angry, frustrated, or disappointed)
   - 4-5: Somewhat negative (customer has concerns or mild frustration)
   - 6-7: Neutral to slightly positive (customer is calm or satisfied with resolution)
   - 8-10: Very positive (customer is happy, grateful, or impressed)

IMPORTANT: Do NOT default to a neutral score of 5. Analyze the actual sentiment in the dialog.

Return your analysis in this EXACT JSON format:
[
  {
    "id": "1",
    "summary": "Customer's fridge is not cooling properly and needs warranty service.",
    "sentiment_score": 3
  },
  ... and so on for each complaint
]

Include EVERY complaint from the input and return valid JSON that can be parsed."#
        .to_string()
}

/// Instruction for deriving exactly `count` category labels from a batch of
/// complaint summaries.
pub fn category_creation_prompt(count: usize) -> String {
    format!(
        r#"You are an expert complaint classifier. Your task is to:

1. Read all the customer complaint summaries provided in the input
2. Create EXACTLY {count} distinct complaint categories that best represent all the complaints
3. Return ONLY these {count} categories in a JSON object

IMPORTANT: You MUST create exactly {count} categories based on the actual complaint data. Do not use generic categories unless they truly represent the data.

Return your analysis in this EXACT JSON format:
{{
  "categories": ["Category1", "Category2", ...]
}}"#,
        count = count
    )
}

/// Instruction for assigning each complaint to one of the given categories,
/// with an optional more specific secondary category.
pub fn classification_prompt(categories: &[String]) -> String {
    format!(
        r#"You are an expert complaint classifier. Your task is to:

1. Use ONLY the predefined categories provided below
2. Assign each complaint to exactly one of these categories based on its summary
3. Optionally add a more specific secondary category of your choosing within the primary one

Categories: {categories}

Return your analysis in this EXACT JSON format:
{{
  "classified_complaints": [
    {{
      "id": "1",
      "category": "one of the predefined categories",
      "secondary_category": "optional more specific label"
    }},
    ... and so on for each complaint
  ]
}}"#,
        categories = serde_json::to_string(categories).unwrap_or_else(|_| "[]".to_string())
    )
}
