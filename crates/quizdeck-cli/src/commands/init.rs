//! The `quizdeck init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizdeck.toml
    if std::path::Path::new("quizdeck.toml").exists() {
        println!("quizdeck.toml already exists, skipping.");
    } else {
        std::fs::write("quizdeck.toml", SAMPLE_CONFIG)?;
        println!("Created quizdeck.toml");
    }

    // Create sample question bank
    let bank_path = std::path::Path::new("questions.json");
    if bank_path.exists() {
        println!("questions.json already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_QUESTIONS)?;
        println!("Created questions.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit questions.json with your own questions");
    println!("  2. Run: quizdeck validate");
    println!("  3. Run: quizdeck start && quizdeck take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdeck configuration

questions_path = "questions.json"
store_path = ".quizdeck/session.json"
output_dir = "./quizdeck-results"

time_limit_minutes = 10
shuffle_questions = false
shuffle_answers = false
"#;

const SAMPLE_QUESTIONS: &str = r#"{
  "questions": [
    {
      "id": 1,
      "text": "Which planet is known as the Red Planet?",
      "type": "single",
      "answers": [
        { "id": "a", "text": "Venus" },
        { "id": "b", "text": "Mars", "correct": true },
        { "id": "c", "text": "Jupiter" }
      ]
    },
    {
      "id": 2,
      "text": "Which of these numbers are prime?",
      "type": "multiple",
      "answers": [
        { "id": "x", "text": "2", "correct": true },
        { "id": "y", "text": "3", "correct": true },
        { "id": "z", "text": "4" }
      ]
    },
    {
      "id": 3,
      "text": "What is the capital of France?",
      "type": "text",
      "correctAnswer": "Paris"
    },
    {
      "id": 4,
      "text": "Which language has a borrow checker?",
      "type": "dropdown",
      "answers": [
        { "id": "go", "text": "Go" },
        { "id": "rust", "text": "Rust", "correct": true },
        { "id": "java", "text": "Java" }
      ]
    }
  ]
}
"#;
