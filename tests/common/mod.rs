use blicket_bonus::*;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

#[allow(dead_code)]
pub fn deterministic_branch() -> Branch {
    Branch::always(1.0)
        .with_blicket(Comparator::Ge, Threshold::Fixed(3))
        .with_nonblicket(Comparator::Eq, Threshold::Fixed(1))
}

#[allow(dead_code)]
pub fn noisy_branch() -> Branch {
    Branch::always(0.75).with_blicket(Comparator::Le, Threshold::Fixed(2))
}

/// Teaching examples where the detector fires on two or more blickets.
#[allow(dead_code)]
pub fn teaching_examples() -> Value {
    json!([
        {"blicket_nonblicket_combo": "**", "detector_state": true},
        {"blicket_nonblicket_combo": "***.", "detector_state": true},
        {"blicket_nonblicket_combo": "*..", "detector_state": false},
        {"blicket_nonblicket_combo": "..", "detector_state": false},
        {"blicket_nonblicket_combo": "*.*.", "detector_state": true}
    ])
}

/// An ending chunk whose seven forms all carry the given rule.
#[allow(dead_code)]
pub fn ending_chunk(session_id: &str, rule: Value) -> Value {
    let mut quiz = serde_json::Map::new();
    for form in 0..7 {
        quiz.insert(
            format!("q{form}"),
            json!({"teaching_ex": teaching_examples(), "rule": rule.clone()}),
        );
    }

    json!({
        "sessionId": session_id,
        "seq_key": "End",
        "timestamp": 1700000000,
        "route": "teach",
        "condition_name": "deterministic",
        "is_trouble": false,
        "bonus_per_q": 0.1,
        "quiz_data": quiz
    })
}

#[allow(dead_code)]
pub fn two_or_more_rule() -> Value {
    json!([{"branch": {
        "reliability": 1,
        "blicket_comparator": ">=",
        "blicket_num": 2,
        "nonblicket_comparator": "any",
        "nonblicket_num": null
    }}])
}

/// Write a batch's participant ID file and chunk dump under `data_dir`.
#[allow(dead_code)]
pub fn write_batch(data_dir: &Path, batch: &str, ids: &[(&str, &str)], chunks: &[Value]) {
    fs::create_dir_all(data_dir).unwrap();

    let mut tsv = String::from("participant_id\tsession_id\tstatus\n");
    for (participant, session) in ids {
        tsv.push_str(&format!("{participant}\t{session}\tAPPROVED\n"));
    }
    fs::write(data_dir.join(format!("d_prolific_worker_ids_{batch}.tsv")), tsv).unwrap();
    fs::write(
        data_dir.join(format!("chunks_{batch}.json")),
        serde_json::to_string(chunks).unwrap(),
    )
    .unwrap();
}
