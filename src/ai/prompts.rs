use super::GenerationOptions;

pub const SUMMARY_OPTIONS: GenerationOptions = GenerationOptions {
    max_output_tokens: 500,
    temperature: 0.5,
};

pub const LEARNING_OPTIONS: GenerationOptions = GenerationOptions {
    max_output_tokens: 2000,
    temperature: 0.7,
};

pub fn summary_prompt(text: &str, word_count: &str) -> String {
    format!("Summarize the following text in approximately {word_count} words:\n\n{text}")
}

pub fn learning_plan_prompt(topic: &str, duration_days: u32) -> String {
    format!(
        r#"You are an expert roadmap planner. Create a structured {duration_days}-day learning roadmap for the topic "{topic}".

Respond strictly in this JSON format, no extra explanation or intro text:

```json
{{
  "dailyPlan": [
    {{
      "day": 1,
      "title": "Day 1: Introduction",
      "description": "Brief overview of the topic...",
      "resources": ["YouTube video", "Official Docs", "Practice Exercise"]
    }},
    ...
  ]
}}
```
Ensure the learning builds progressively across the {duration_days} days."#
    )
}
