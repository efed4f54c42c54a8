//! The `examstat init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examstat.toml").exists() {
        println!("examstat.toml already exists, skipping.");
    } else {
        std::fs::write("examstat.toml", SAMPLE_CONFIG)?;
        println!("Created examstat.toml");
    }

    std::fs::create_dir_all("datasets")?;
    let example_path = std::path::Path::new("datasets/example.json");
    if example_path.exists() {
        println!("datasets/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DATASET)?;
        println!("Created datasets/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: examstat validate --dataset datasets/example.json");
    println!("  2. Run: examstat analyze --dataset datasets/example.json --by-variant");
    println!("  3. Run: examstat similarity --dataset datasets/example.json --kind variants");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examstat configuration

[analysis]
min_sample_size = 5
confidence_level = 0.95
include_difficulty_index = true
include_discrimination_index = true
include_point_biserial = true
include_distractor_analysis = true
exclude_incomplete_data = false
group_by_question_type = true

[integrity]
student_similarity_threshold = 0.9
variant_similarity_threshold = 0.8
"#;

const EXAMPLE_DATASET: &str = r#"{
  "variants": [
    {
      "id": "general-science-a",
      "exam_id": "general-science",
      "variant_code": "A",
      "exam_title": "General Science Quiz",
      "questions": [
        { "id": "q1", "text": "Which planet is closest to the Sun?", "type": "multiple-choice",
          "options": ["Mercury", "Venus", "Earth", "Mars"], "correct_answer": "Mercury", "points": 1 },
        { "id": "q2", "text": "What is 7 x 8?", "type": "multiple-choice",
          "options": ["54", "56", "58", "64"], "correct_answer": "56", "points": 1 },
        { "id": "q3", "text": "Water boils at 100 C at sea level.", "type": "true-false",
          "correct_answer": "true", "points": 1 },
        { "id": "q4", "text": "Chemical symbol for gold?", "type": "multiple-choice",
          "options": ["Ag", "Au", "Gd", "Go"], "correct_answer": "Au", "points": 1 }
      ],
      "metadata": { "question_order": [0, 1, 2, 3] }
    },
    {
      "id": "general-science-b",
      "exam_id": "general-science",
      "variant_code": "B",
      "exam_title": "General Science Quiz",
      "questions": [
        { "id": "q3", "text": "Water boils at 100 C at sea level.", "type": "true-false",
          "correct_answer": "true", "points": 1 },
        { "id": "q1", "text": "Which planet is closest to the Sun?", "type": "multiple-choice",
          "options": ["Venus", "Mercury", "Mars", "Earth"], "correct_answer": "Mercury", "points": 1 },
        { "id": "q4", "text": "Chemical symbol for gold?", "type": "multiple-choice",
          "options": ["Au", "Ag", "Go", "Gd"], "correct_answer": "Au", "points": 1 },
        { "id": "q2", "text": "What is 7 x 8?", "type": "multiple-choice",
          "options": ["64", "56", "54", "58"], "correct_answer": "56", "points": 1 }
      ],
      "metadata": {
        "question_order": [2, 0, 3, 1],
        "option_permutations": { "q1": [1, 0, 3, 2], "q4": [1, 0, 3, 2], "q2": [3, 1, 0, 2] }
      }
    }
  ],
  "responses": [
    {
      "student_id": "s1", "variant_code": "A", "total_score": 4, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q1", "student_answer": "Mercury", "is_correct": true, "points": 1, "max_points": 1, "response_time": 14 },
        { "question_id": "q2", "student_answer": "56", "is_correct": true, "points": 1, "max_points": 1, "response_time": 9 },
        { "question_id": "q3", "student_answer": "true", "is_correct": true, "points": 1, "max_points": 1, "response_time": 5 },
        { "question_id": "q4", "student_answer": "Au", "is_correct": true, "points": 1, "max_points": 1, "response_time": 11 }
      ]
    },
    {
      "student_id": "s2", "variant_code": "A", "total_score": 2, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q1", "student_answer": "Venus", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q2", "student_answer": "56", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q3", "student_answer": "true", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q4", "student_answer": "Ag", "is_correct": false, "points": 0, "max_points": 1 }
      ]
    },
    {
      "student_id": "s3", "variant_code": "A", "total_score": 2, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q1", "student_answer": "Mercury", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q2", "student_answer": "54", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q3", "student_answer": "false", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q4", "student_answer": "Au", "is_correct": true, "points": 1, "max_points": 1 }
      ]
    },
    {
      "student_id": "s4", "variant_code": "B", "total_score": 4, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q3", "student_answer": "true", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q1", "student_answer": "Mercury", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q4", "student_answer": "Au", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q2", "student_answer": "56", "is_correct": true, "points": 1, "max_points": 1 }
      ]
    },
    {
      "student_id": "s5", "variant_code": "B", "total_score": 2, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q3", "student_answer": "true", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q1", "student_answer": "Mercury", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q4", "student_answer": "Ag", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q2", "student_answer": "64", "is_correct": false, "points": 0, "max_points": 1 }
      ]
    },
    {
      "student_id": "s6", "variant_code": "B", "total_score": 2, "max_possible_score": 4,
      "question_responses": [
        { "question_id": "q3", "student_answer": "false", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q1", "student_answer": "Earth", "is_correct": false, "points": 0, "max_points": 1 },
        { "question_id": "q4", "student_answer": "Au", "is_correct": true, "points": 1, "max_points": 1 },
        { "question_id": "q2", "student_answer": "56", "is_correct": true, "points": 1, "max_points": 1 }
      ]
    }
  ]
}
"#;
