//! Deterministic row sampling for the classification request.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Number, Value};

use datacat_core::{CellValue, Frame};

pub const DEFAULT_SAMPLE_ROWS: usize = 10;
pub const DEFAULT_SAMPLE_SEED: u64 = 1;

/// Row positions to include in a sample, ascending. Frames that fit entirely
/// are taken whole; larger ones are sampled without replacement from a
/// seeded RNG, so the same (rows, max_rows, seed) always picks the same rows.
pub fn sample_indices(rows: usize, max_rows: usize, seed: u64) -> Vec<usize> {
    if rows <= max_rows {
        return (0..rows).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, rows, max_rows).into_vec();
    picked.sort_unstable();
    picked
}

/// Column-oriented JSON sample: `{"column": [v1, v2, ...], ...}` in column
/// order, with empty cells as `null`.
pub fn sample_frame(frame: &Frame, max_rows: usize, seed: u64) -> Value {
    let indices = sample_indices(frame.row_count(), max_rows, seed);
    let mut object = Map::new();

    for column in &frame.columns {
        let values = indices
            .iter()
            .map(|&i| cell_to_json(column.values.get(i).and_then(|v| v.as_ref())))
            .collect();
        object.insert(column.name.clone(), Value::Array(values));
    }

    Value::Object(object)
}

fn cell_to_json(cell: Option<&CellValue>) -> Value {
    match cell {
        None => Value::Null,
        Some(CellValue::Int(n)) => Value::Number((*n).into()),
        Some(CellValue::Number(n)) => Number::from_f64(n.0).map(Value::Number).unwrap_or(Value::Null),
        Some(CellValue::Bool(b)) => Value::Bool(*b),
        Some(CellValue::Text(s)) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_frame(rows: i64) -> Frame {
        Frame::from_rows(
            vec!["n".into(), "label".into()],
            (0..rows)
                .map(|i| vec![Some(CellValue::Int(i)), if i % 2 == 0 { None } else { Some(CellValue::Text(format!("r{i}"))) }])
                .collect(),
        )
    }

    #[test]
    fn small_frames_are_taken_whole() {
        assert_eq!(sample_indices(4, 10, 1), vec![0, 1, 2, 3]);
        let sample = sample_frame(&numbered_frame(3), 10, 1);
        assert_eq!(sample["n"], serde_json::json!([0, 1, 2]));
        assert_eq!(sample["label"], serde_json::json!([null, "r1", null]));
    }

    #[test]
    fn large_frames_are_capped_and_distinct() {
        let picked = sample_indices(500, 10, 1);
        assert_eq!(picked.len(), 10);
        assert!(picked.windows(2).all(|w| w[0] < w[1]), "{:?}", picked);
        assert!(picked.iter().all(|&i| i < 500));
    }

    #[test]
    fn sampled_rows_keep_frame_order() {
        let sample = sample_frame(&numbered_frame(300), 10, 7);
        let values: Vec<i64> = sample["n"].as_array().unwrap().iter().map(|v| v.as_i64().unwrap()).collect();
        assert_eq!(values.len(), 10);
        assert!(values.windows(2).all(|w| w[0] < w[1]), "{:?}", values);
    }

    #[test]
    fn sampling_is_deterministic_per_seed() {
        let frame = numbered_frame(200);
        assert_eq!(sample_frame(&frame, 10, 1), sample_frame(&frame, 10, 1));
        assert_ne!(sample_indices(200, 10, 1), sample_indices(200, 10, 2));
    }

    #[test]
    fn keys_follow_column_order() {
        let sample = sample_frame(&numbered_frame(2), 10, 1);
        let keys: Vec<&String> = sample.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["n", "label"]);
    }
}
