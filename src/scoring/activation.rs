use crate::error::{BonusError, Result};

/// Turn a rule probability into a predicted activation.
///
/// A probability equal to the noise reliability means the participant said
/// the detector is unreliable for this combo; such predictions are counted
/// as matching the observed activation. Every other probability must be 0
/// or 1.
pub fn to_activation(probability: f64, observed: bool, noise_reliability: f64) -> Result<bool> {
    if probability == noise_reliability {
        Ok(observed)
    } else if probability == 0.0 {
        Ok(false)
    } else if probability == 1.0 {
        Ok(true)
    } else {
        Err(BonusError::UnexpectedProbability {
            probability,
            noise: noise_reliability,
        })
    }
}
