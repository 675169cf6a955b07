use ndarray::prelude::*;
use ndarray::{array, concatenate};

use crate::errors::*;

/// The multiclass probability estimates are derived from binary (one-vs.-rest)
/// estimates by simple normalization
pub struct MulticlassLogisticRegression {
    /// matrix with shape (f, c)
    /// ------------------------
    ///
    /// - f = number of features
    /// - c = number of classes
    weights: Array2<f32>,
}

impl MulticlassLogisticRegression {
    fn nb_features(&self) -> usize {
        // without intercept
        self.weights.dim().0 - 1
    }

    fn nb_classes(&self) -> usize {
        self.weights.dim().1
    }

    fn is_binary(&self) -> bool {
        self.nb_classes() == 1
    }
}

impl MulticlassLogisticRegression {
    pub fn new(intercept: Array1<f32>, weights: Array2<f32>) -> Result<Self> {
        let nb_classes = intercept.dim();
        let reshaped_intercept = intercept.into_shape((1, nb_classes))?;
        let weights_with_intercept = concatenate![Axis(0), reshaped_intercept, weights];
        Ok(Self {
            weights: weights_with_intercept,
        })
    }

    pub fn run(
        &self,
        features: &ArrayView1<f32>,
        filtered_out_indexes: Option<Vec<usize>>,
    ) -> Result<Array1<f32>> {
        let reshaped_features = features.into_shape((1, self.nb_features()))?;
        let reshaped_features = concatenate![Axis(1), array![[1.]], reshaped_features];
        let mut result = reshaped_features
            .dot(&self.weights)
            .into_shape(self.nb_classes())?;
        result.mapv_inplace(logit);
        if self.is_binary() {
            return Ok(arr1(&[1.0 - result[0], result[0]]));
        }
        if let Some(indexes) = filtered_out_indexes {
            for index in indexes {
                result[index] = 0.0;
            }
        }
        let divider = result.sum();
        if divider > 0.0 {
            result /= divider;
        }
        Ok(result)
    }
}

/// Fit one binary logistic regression per class with full batch gradient
/// descent, and return `(intercept, weights)` in the shapes expected by
/// [`MulticlassLogisticRegression::new`].
///
/// Training is deterministic: weights start at zero and samples are visited
/// in dataset order.
pub fn fit(
    features: &Array2<f32>,
    targets: &[usize],
    nb_classes: usize,
    epochs: usize,
    learning_rate: f32,
    l2_penalty: f32,
) -> Result<(Array1<f32>, Array2<f32>)> {
    let (nb_samples, nb_features) = features.dim();
    if nb_samples != targets.len() {
        return Err(LogisticsNluError::InternalError(format!(
            "Mismatched number of samples ({}) and targets ({})",
            nb_samples,
            targets.len()
        ))
        .into());
    }
    if nb_samples == 0 || nb_classes < 2 {
        return Err(LogisticsNluError::InternalError(
            "Regression requires at least one sample and two classes".to_string(),
        )
        .into());
    }
    let mut intercept = Array1::<f32>::zeros(nb_classes);
    let mut weights = Array2::<f32>::zeros((nb_features, nb_classes));

    for class_index in 0..nb_classes {
        let labels: Array1<f32> = targets
            .iter()
            .map(|&target| if target == class_index { 1.0 } else { 0.0 })
            .collect();
        let mut w = Array1::<f32>::zeros(nb_features);
        let mut b = 0.0f32;
        for _ in 0..epochs {
            let mut predictions = features.dot(&w) + b;
            predictions.mapv_inplace(logit);
            let residuals = &predictions - &labels;
            let mut gradient = features.t().dot(&residuals) / (nb_samples as f32);
            gradient.scaled_add(l2_penalty, &w);
            let intercept_gradient = residuals.sum() / (nb_samples as f32);
            w.scaled_add(-learning_rate, &gradient);
            b -= learning_rate * intercept_gradient;
        }
        intercept[class_index] = b;
        weights.column_mut(class_index).assign(&w);
    }
    Ok((intercept, weights))
}

fn logit(x: f32) -> f32 {
    1. / (1. + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::{fit, MulticlassLogisticRegression};
    use crate::testutils::assert_epsilon_eq_array1;
    use ndarray::{array, s};

    #[test]
    fn multiclass_logistic_regression_works() {
        // Given
        let intercept = array![0.98, 0.32, -0.76];
        let weights = array![
            [2.5, -0.6, 0.5],
            [1.2, 1.2, -2.7],
            [1.5, 0.1, -3.2],
            [-0.9, 1.4, 1.8]
        ];

        let features = array![0.4, -2.3, 1.9, 1.3];
        let regression = MulticlassLogisticRegression::new(intercept, weights).unwrap();

        // When
        let predictions = regression.run(&features.view(), None).unwrap();

        // Then
        let expected_predictions = array![0.3701964, 0.1762577, 0.4535458];
        assert_epsilon_eq_array1(&predictions, &expected_predictions, 1e-06);
    }

    #[test]
    fn multiclass_logistic_regression_works_when_binary() {
        // Given
        let intercept = array![0.98];
        let weights = array![[2.5], [1.2], [1.5], [-0.9]];

        let features = array![0.4, -2.3, 1.9, 1.3];
        let regression = MulticlassLogisticRegression::new(intercept, weights).unwrap();

        // When
        let predictions = regression.run(&features.view(), None).unwrap();

        // Then
        let expected_predictions = array![0.2890504, 0.7109495];
        assert_epsilon_eq_array1(&predictions, &expected_predictions, 1e-06);
    }

    #[test]
    fn multiclass_logistic_regression_works_with_filtered_out_indexes() {
        // Given
        let intercept = array![0.98, 0.32, -0.76];
        let weights = array![
            [2.5, -0.6, 0.5],
            [1.2, 1.2, -2.7],
            [1.5, 0.1, -3.2],
            [-0.9, 1.4, 1.8]
        ];

        let features = array![0.4, -2.3, 1.9, 1.3];

        let filtered_out_indexes = Some(vec![2]);
        let regression = MulticlassLogisticRegression::new(intercept, weights).unwrap();

        // When
        let predictions = regression
            .run(&features.view(), filtered_out_indexes)
            .unwrap();

        // Then
        let expected_predictions = array![0.67745198, 0.32254802, 0.0];
        assert_epsilon_eq_array1(&predictions, &expected_predictions, 1e-06);
    }

    #[test]
    fn fit_separates_distinct_classes() {
        // Given
        let features = array![
            [1.0, 0.0, 0.0],
            [0.9, 0.1, 0.0],
            [0.0, 1.0, 0.1],
            [0.1, 0.9, 0.0],
            [0.0, 0.1, 1.0],
            [0.0, 0.0, 0.9]
        ];
        let targets = vec![0, 0, 1, 1, 2, 2];

        // When
        let (intercept, weights) = fit(&features, &targets, 3, 500, 1.0, 0.0).unwrap();
        let regression = MulticlassLogisticRegression::new(intercept, weights).unwrap();

        // Then
        for (sample_index, &target) in targets.iter().enumerate() {
            let sample = features.slice(s![sample_index, ..]);
            let probabilities = regression.run(&sample, None).unwrap();
            let best_class = probabilities
                .indexed_iter()
                .max_by(|(_, lhs), (_, rhs)| lhs.partial_cmp(rhs).unwrap())
                .map(|(index, _)| index)
                .unwrap();
            assert_eq!(target, best_class);
        }
    }

    #[test]
    fn fit_rejects_mismatched_targets() {
        // Given
        let features = array![[1.0, 0.0], [0.0, 1.0]];
        let targets = vec![0];

        // When
        let result = fit(&features, &targets, 2, 10, 1.0, 0.0);

        // Then
        assert!(result.is_err());
    }
}
