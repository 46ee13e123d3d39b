//! Data
//!
//! Observations, the labeled view the tree is grown on, and the
//! comma separated dataset format used by the command line tool.
use crate::constants::PREDICTED_LABEL_COLUMN;
use crate::errors::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// A single record: feature values and, optionally, a class label.
///
/// Labels are present during training and evaluation, and may be absent
/// for observations that only need a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Feature values, in column order.
    pub features: Vec<f64>,
    /// Class label, if known.
    pub label: Option<String>,
}

impl Observation {
    /// Create a new observation.
    pub fn new(features: Vec<f64>, label: Option<String>) -> Self {
        Observation { features, label }
    }

    /// Create an observation with a known label.
    pub fn labeled(features: Vec<f64>, label: impl Into<String>) -> Self {
        Observation::new(features, Some(label.into()))
    }

    /// Create an observation without a label.
    pub fn unlabeled(features: Vec<f64>) -> Self {
        Observation::new(features, None)
    }
}

impl Display for Observation {
    /// All features in order, followed by the label when there is one.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for v in &self.features {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", v)?;
            first = false;
        }
        if let Some(label) = &self.label {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{}", label)?;
        }
        Ok(())
    }
}

/// Borrowed view of a labeled observation.
///
/// Training and pruning only ever look at labeled data, so the label
/// presence check is done once when the views are created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub features: &'a [f64],
    pub label: &'a str,
}

impl<'a> Sample<'a> {
    pub fn new(features: &'a [f64], label: &'a str) -> Self {
        Sample { features, label }
    }

    /// Value of a feature, or an error if the sample is too short.
    #[inline]
    pub fn value(&self, feature_index: usize) -> Result<f64, TreeError> {
        self.features
            .get(feature_index)
            .copied()
            .ok_or(TreeError::PredictionInput(feature_index, self.features.len()))
    }
}

/// Build labeled views over a set of observations.
///
/// Fails with [`TreeError::MissingLabel`] on the first observation without a label.
pub fn labeled_samples(observations: &[Observation]) -> Result<Vec<Sample<'_>>, TreeError> {
    observations
        .iter()
        .enumerate()
        .map(|(i, obs)| match &obs.label {
            Some(label) => Ok(Sample::new(&obs.features, label)),
            None => Err(TreeError::MissingLabel(i)),
        })
        .collect()
}

/// A parsed data file: the header and one observation per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub column_names: Vec<String>,
    pub observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(column_names: Vec<String>, observations: Vec<Observation>) -> Self {
        Dataset {
            column_names,
            observations,
        }
    }

    /// Parse comma separated data with a header row.
    ///
    /// * `reader` - Source of the data.
    /// * `has_label` - If true, the last column is the label and every other
    ///   column a feature. Otherwise all columns are features.
    pub fn from_reader<R: Read>(reader: R, has_label: bool) -> Result<Self, TreeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let column_names: Vec<String> = csv_reader
            .headers()
            .map_err(|e| TreeError::Format(1, e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if column_names.is_empty() || (column_names.len() == 1 && column_names[0].is_empty()) {
            return Err(TreeError::Format(1, "missing header row".to_string()));
        }
        let n_columns = column_names.len();

        let mut observations = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                TreeError::Format(line, e.to_string())
            })?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

            if record.len() != n_columns {
                return Err(TreeError::Format(
                    line,
                    format!("expected {} fields, found {}", n_columns, record.len()),
                ));
            }

            let n_features = if has_label { n_columns - 1 } else { n_columns };
            let features = record
                .iter()
                .take(n_features)
                .map(|token| parse_feature(token, line))
                .collect::<Result<Vec<f64>, TreeError>>()?;
            let label = if has_label {
                record.get(n_columns - 1).map(String::from)
            } else {
                None
            };
            observations.push(Observation::new(features, label));
        }

        Ok(Dataset::new(column_names, observations))
    }

    /// Parse a comma separated data file, see [`Dataset::from_reader`].
    pub fn from_path<P: AsRef<Path>>(path: P, has_label: bool) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TreeError::UnableToRead(format!("{}: {}", path.display(), e)))?;
        Self::from_reader(file, has_label)
    }

    /// Number of feature columns of the first observation.
    pub fn n_features(&self) -> usize {
        self.observations.first().map(|o| o.features.len()).unwrap_or(0)
    }

    /// True when every observation carries a label.
    pub fn is_labeled(&self) -> bool {
        !self.observations.is_empty() && self.observations.iter().all(|o| o.label.is_some())
    }

    /// Write the dataset back out with an extra `predicted_label` column.
    ///
    /// * `predictions` - One label per observation, in order.
    /// * `writer` - Destination of the comma separated output.
    pub fn write_predictions<W: Write, S: AsRef<str>>(&self, predictions: &[S], writer: W) -> Result<(), TreeError> {
        if predictions.len() != self.observations.len() {
            return Err(TreeError::InvalidParameter(
                "predictions".to_string(),
                format!("{} labels", self.observations.len()),
                predictions.len().to_string(),
            ));
        }
        let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

        let mut header = self.column_names.clone();
        header.push(PREDICTED_LABEL_COLUMN.to_string());
        csv_writer
            .write_record(&header)
            .map_err(|e| TreeError::UnableToWrite(e.to_string()))?;

        for (obs, predicted) in self.observations.iter().zip(predictions) {
            let mut row: Vec<String> = obs.features.iter().map(|v| v.to_string()).collect();
            if let Some(label) = &obs.label {
                row.push(label.clone());
            }
            row.push(predicted.as_ref().to_string());
            csv_writer
                .write_record(&row)
                .map_err(|e| TreeError::UnableToWrite(e.to_string()))?;
        }
        csv_writer.flush().map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }
}

fn parse_feature(token: &str, line: usize) -> Result<f64, TreeError> {
    match token.parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(TreeError::Format(line, format!("feature value {:?} is not numeric", token))),
    }
}
