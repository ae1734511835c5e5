/// Binary confusion counts with `true` as the positive label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl Confusion {
    /// Tally `(truth, prediction)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (bool, bool)>) -> Self {
        pairs
            .into_iter()
            .fold(Self::default(), |mut c, (truth, predicted)| {
                match (truth, predicted) {
                    (true, true) => c.true_positives += 1,
                    (false, true) => c.false_positives += 1,
                    (true, false) => c.false_negatives += 1,
                    (false, false) => c.true_negatives += 1,
                }
                c
            })
    }

    /// Harmonic mean of precision and recall, `2TP / (2TP + FP + FN)`.
    /// Zero when there is no positive label and no positive prediction.
    pub fn f1(&self) -> f64 {
        let denominator = 2 * self.true_positives + self.false_positives + self.false_negatives;
        if denominator == 0 {
            0.0
        } else {
            (2 * self.true_positives) as f64 / denominator as f64
        }
    }
}

pub fn f1_score(pairs: impl IntoIterator<Item = (bool, bool)>) -> f64 {
    Confusion::from_pairs(pairs).f1()
}
