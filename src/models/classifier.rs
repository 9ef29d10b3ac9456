//! Image classifier adapter for crop disease prediction

use image::{imageops::FilterType, DynamicImage};
use ort::session::Session;
use ort::value::Tensor;
use std::sync::RwLock;
use tracing::debug;

use crate::error::{PredictionError, PredictionResult};

/// Input side length the classification model was trained with.
pub const INPUT_SIZE: u32 = 128;

/// Loaded disease classification model.
///
/// The ONNX session needs exclusive access to run, so forward passes are
/// serialized behind the lock; everything else is immutable after load.
pub struct DiseaseClassifier {
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
    labels: Vec<String>,
}

impl DiseaseClassifier {
    pub fn new(
        session: Session,
        input_name: String,
        output_name: String,
        labels: Vec<String>,
    ) -> Self {
        Self {
            session: RwLock::new(session),
            input_name,
            output_name,
            labels,
        }
    }

    /// Ordered class label table. Index positions match the model's
    /// training-time label encoding; that correspondence is an external
    /// invariant this adapter trusts.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify a decoded image into a disease label.
    pub fn classify(&self, image: &DynamicImage) -> PredictionResult<String> {
        let (shape, data) = preprocess(image);

        let input_tensor = Tensor::from_array((shape, data)).map_err(|e| {
            PredictionError::Inference(format!("Failed to create input tensor: {e}"))
        })?;

        let mut session = self
            .session
            .write()
            .map_err(|e| PredictionError::Inference(format!("Lock error: {e}")))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| PredictionError::Inference(format!("Classifier run failed: {e}")))?;

        let value = outputs.get(&self.output_name).ok_or_else(|| {
            PredictionError::Inference(format!(
                "classifier produced no output named '{}'",
                self.output_name
            ))
        })?;

        let (_, probabilities) = value.try_extract_tensor::<f32>().map_err(|e| {
            PredictionError::Inference(format!("classifier output is not an f32 tensor: {e}"))
        })?;

        debug!(
            classes = probabilities.len(),
            "Classifier forward pass complete"
        );

        decode_label(probabilities, &self.labels)
    }
}

/// Convert an image into the tensor shape the model expects:
/// `[1, 128, 128, 3]`, RGB, channel values scaled to `[0, 1]`.
pub fn preprocess(image: &DynamicImage) -> (Vec<i64>, Vec<f32>) {
    let resized = image::imageops::resize(
        &image.to_rgb8(),
        INPUT_SIZE,
        INPUT_SIZE,
        FilterType::Triangle,
    );

    let mut data = Vec::with_capacity((INPUT_SIZE * INPUT_SIZE * 3) as usize);
    for pixel in resized.pixels() {
        for channel in pixel.0 {
            data.push(channel as f32 / 255.0);
        }
    }

    let shape = vec![1_i64, INPUT_SIZE as i64, INPUT_SIZE as i64, 3];
    (shape, data)
}

/// Map a probability vector through the class label table.
///
/// The vector length must equal the label count; a mismatch means the
/// loaded model and the configured labels disagree, and is always
/// surfaced. Ties resolve to the first-encountered index.
pub fn decode_label(probabilities: &[f32], labels: &[String]) -> PredictionResult<String> {
    if probabilities.len() != labels.len() {
        return Err(PredictionError::ShapeMismatch {
            expected: labels.len(),
            actual: probabilities.len(),
        });
    }

    if probabilities.is_empty() {
        return Err(PredictionError::Inference(
            "classifier produced an empty probability vector".to_string(),
        ));
    }

    let mut best = 0;
    for (index, probability) in probabilities.iter().enumerate() {
        if *probability > probabilities[best] {
            best = index;
        }
    }

    Ok(labels[best].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_decode_picks_maximum() {
        let result = decode_label(&[0.1, 0.7, 0.2], &labels(&["A", "B", "C"])).unwrap();
        assert_eq!(result, "B");
    }

    #[test]
    fn test_decode_tie_takes_first_index() {
        let result = decode_label(&[0.4, 0.4, 0.2], &labels(&["A", "B", "C"])).unwrap();
        assert_eq!(result, "A");
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let table = labels(&["A", "B", "C"]);
        let err = decode_label(&[0.5, 0.5], &table).unwrap_err();

        assert!(matches!(
            err,
            PredictionError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_preprocess_shape_and_scaling() {
        let image = DynamicImage::new_rgb8(64, 48);
        let (shape, data) = preprocess(&image);

        assert_eq!(shape, vec![1, 128, 128, 3]);
        assert_eq!(data.len(), 128 * 128 * 3);
        assert!(data.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_preprocess_scales_white_to_one() {
        let mut buffer = image::RgbImage::new(16, 16);
        for pixel in buffer.pixels_mut() {
            *pixel = image::Rgb([255, 255, 255]);
        }

        let (_, data) = preprocess(&DynamicImage::ImageRgb8(buffer));
        assert!(data.iter().all(|&v| v == 1.0));
    }
}
