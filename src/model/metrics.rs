// src/model/metrics.rs
//! Held-out evaluation helpers. Everything here is informational: results are
//! logged after training, not surfaced to prediction clients.

/// Fraction of predictions matching the ground truth.
pub fn accuracy(truth: &[u8], predicted: &[u8]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(a, b)| a == b)
        .count();
    correct as f64 / truth.len() as f64
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision/recall/F1 for a single class, treating it as the positive label.
pub fn class_metrics(truth: &[u8], predicted: &[u8], class: u8) -> ClassMetrics {
    let mut true_positives = 0usize;
    let mut predicted_positives = 0usize;
    let mut actual_positives = 0usize;

    for (&t, &p) in truth.iter().zip(predicted) {
        if p == class {
            predicted_positives += 1;
        }
        if t == class {
            actual_positives += 1;
            if p == class {
                true_positives += 1;
            }
        }
    }

    let precision = if predicted_positives > 0 {
        true_positives as f64 / predicted_positives as f64
    } else {
        0.0
    };
    let recall = if actual_positives > 0 {
        true_positives as f64 / actual_positives as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support: actual_positives,
    }
}

/// Multi-line per-class report for logging after training.
pub fn classification_report(truth: &[u8], predicted: &[u8]) -> String {
    let mut lines = vec![format!(
        "{:>8} {:>10} {:>8} {:>10} {:>9}",
        "class", "precision", "recall", "f1-score", "support"
    )];
    for class in [0u8, 1u8] {
        let m = class_metrics(truth, predicted, class);
        lines.push(format!(
            "{:>8} {:>10.2} {:>8.2} {:>10.2} {:>9}",
            class, m.precision, m.recall, m.f1, m.support
        ));
    }
    lines.push(format!(
        "{:>8} {:>10} {:>8} {:>10.2} {:>9}",
        "accuracy",
        "",
        "",
        accuracy(truth, predicted),
        truth.len()
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1, 0, 1, 0], &[1, 0, 0, 0]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_class_metrics_perfect_prediction() {
        let truth = [1, 1, 0, 0];
        let m = class_metrics(&truth, &truth, 1);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
        assert_eq!(m.support, 2);
    }

    #[test]
    fn test_class_metrics_mixed() {
        // For class 1: 1 TP, 1 FP, 1 FN.
        let truth = [1, 1, 0, 0];
        let predicted = [1, 0, 1, 0];
        let m = class_metrics(&truth, &predicted, 1);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.f1, 0.5);
    }

    #[test]
    fn test_class_metrics_no_predictions_for_class() {
        let truth = [1, 1];
        let predicted = [0, 0];
        let m = class_metrics(&truth, &predicted, 1);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
    }

    #[test]
    fn test_report_mentions_both_classes() {
        let truth = [1, 0, 1, 0];
        let report = classification_report(&truth, &truth);
        assert!(report.contains("precision"));
        assert!(report.contains("accuracy"));
        assert_eq!(report.lines().count(), 4);
    }
}
