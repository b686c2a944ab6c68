//! Gradient-boosted tree classifier read from an XGBoost JSON model document.
//!
//! Only the parts of the document needed for binary inference are read: the objective,
//! the base score, optional feature metadata and the tree arrays. Trees are validated when the
//! model is built so that [`Classifier::predict`] cannot fail at request time.

use serde::Deserialize;

use super::encoding::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};

/// Decision function mapping an encoded applicant row to a raw class label.
///
/// Implementations must be deterministic. Callers convert the label to a verdict and treat
/// anything other than `0` or `1` as an error.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Leaf sums are log-odds; the label is positive when the probability exceeds one half.
    BinaryLogistic,
    /// Leaf sums are raw margins; the label is positive when the margin exceeds zero.
    BinaryLogitRaw,
}

impl Objective {
    fn from_name(name: &str) -> Result<Self, ModelError> {
        match name {
            "binary:logistic" => Ok(Self::BinaryLogistic),
            "binary:logitraw" => Ok(Self::BinaryLogitRaw),
            other => Err(ModelError::UnsupportedObjective(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf(f32),
}

/// A single regression tree stored as a flat node array rooted at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn leaf_value(&self, features: &FeatureVector) -> f32 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features.values()[feature];
                    index = if value.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if value < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn from_document(tree: usize, doc: TreeDocument) -> Result<Self, ModelError> {
        let len = doc.left_children.len();
        if len == 0 {
            return Err(ModelError::EmptyTree { tree });
        }
        let lengths = [
            doc.right_children.len(),
            doc.split_indices.len(),
            doc.split_conditions.len(),
            doc.default_left.len(),
        ];
        if lengths.iter().any(|&other| other != len) {
            return Err(ModelError::InconsistentTree { tree });
        }

        let child = |node: usize, raw: i64| -> Result<usize, ModelError> {
            usize::try_from(raw)
                .ok()
                .filter(|&index| index < len && index > node)
                .ok_or(ModelError::InvalidChild { tree, node, child: raw })
        };

        let mut nodes = Vec::with_capacity(len);
        for node in 0..len {
            let left = doc.left_children[node];
            let right = doc.right_children[node];
            if left == -1 && right == -1 {
                nodes.push(Node::Leaf(doc.split_conditions[node]));
                continue;
            }

            let feature = doc.split_indices[node] as usize;
            if feature >= FEATURE_COUNT {
                return Err(ModelError::FeatureOutOfRange { tree, node, feature });
            }
            nodes.push(Node::Split {
                feature,
                threshold: doc.split_conditions[node],
                left: child(node, left)?,
                right: child(node, right)?,
                default_left: doc.default_left[node].as_bool(),
            });
        }

        Ok(Self { nodes })
    }
}

/// Binary classifier summing the leaf values of an ensemble of regression trees.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostedTreeClassifier {
    objective: Objective,
    base_margin: f32,
    trees: Vec<RegressionTree>,
}

impl BoostedTreeClassifier {
    /// Parse and validate an XGBoost `save_model` JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let document: ModelDocument = serde_json::from_str(raw).map_err(ModelError::Json)?;
        Self::from_document(document)
    }

    fn from_document(document: ModelDocument) -> Result<Self, ModelError> {
        let learner = document.learner;
        let objective = Objective::from_name(&learner.objective.name)?;
        let params = learner.learner_model_param;

        if let Some(num_class) = params.num_class.as_deref() {
            let classes = parse_param::<u32>("num_class", num_class)?;
            if classes > 1 {
                return Err(ModelError::MultiClass(classes));
            }
        }
        if let Some(num_feature) = params.num_feature.as_deref() {
            let features = parse_param::<usize>("num_feature", num_feature)?;
            if features != FEATURE_COUNT {
                return Err(ModelError::FeatureCount(features));
            }
        }
        if !learner.feature_names.is_empty() && learner.feature_names != FEATURE_COLUMNS {
            return Err(ModelError::ColumnOrder {
                found: learner.feature_names,
            });
        }

        let base_score = parse_param::<f32>("base_score", &params.base_score)?;
        let base_margin = match objective {
            Objective::BinaryLogistic => {
                if !(base_score > 0.0 && base_score < 1.0) {
                    return Err(ModelError::InvalidParam {
                        name: "base_score",
                        value: params.base_score,
                    });
                }
                (base_score / (1.0 - base_score)).ln()
            }
            Objective::BinaryLogitRaw => base_score,
        };

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| RegressionTree::from_document(index, tree))
            .collect::<Result<Vec<_>, _>>()?;
        if trees.is_empty() {
            return Err(ModelError::NoTrees);
        }

        Ok(Self {
            objective,
            base_margin,
            trees,
        })
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Raw ensemble output before the objective's link function.
    pub fn margin(&self, features: &FeatureVector) -> f32 {
        self.trees
            .iter()
            .fold(self.base_margin, |sum, tree| sum + tree.leaf_value(features))
    }

    /// Probability of the positive (good risk) class.
    pub fn probability(&self, features: &FeatureVector) -> f32 {
        sigmoid(self.margin(features))
    }
}

impl Classifier for BoostedTreeClassifier {
    fn predict(&self, features: &FeatureVector) -> i64 {
        let margin = self.margin(features);
        let positive = match self.objective {
            Objective::BinaryLogistic => sigmoid(margin) > 0.5,
            Objective::BinaryLogitRaw => margin > 0.0,
        };
        i64::from(positive)
    }
}

fn sigmoid(margin: f32) -> f32 {
    1.0 / (1.0 + (-margin).exp())
}

fn parse_param<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ModelError> {
    value.trim().parse().map_err(|_| ModelError::InvalidParam {
        name,
        value: value.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct ModelDocument {
    learner: LearnerDocument,
}

#[derive(Debug, Deserialize)]
struct LearnerDocument {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterDocument,
    learner_model_param: LearnerParams,
    objective: ObjectiveDocument,
}

#[derive(Debug, Deserialize)]
struct BoosterDocument {
    model: BoosterModel,
}

#[derive(Debug, Deserialize)]
struct BoosterModel {
    trees: Vec<TreeDocument>,
}

/// XGBoost stores scalar parameters as strings (`"5E-1"`).
#[derive(Debug, Deserialize)]
struct LearnerParams {
    base_score: String,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDocument {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
}

/// Older exporters write `default_left` as booleans, newer ones as 0/1.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(u8),
}

impl Flag {
    fn as_bool(self) -> bool {
        match self {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model document is not valid XGBoost JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("objective '{0}' is not a binary classification objective")]
    UnsupportedObjective(String),
    #[error("model was trained with {0} classes; only binary models are supported")]
    MultiClass(u32),
    #[error("model expects {0} features, applicant rows carry {count}", count = FEATURE_COUNT)]
    FeatureCount(usize),
    #[error("model feature order {found:?} does not match {columns:?}", columns = FEATURE_COLUMNS)]
    ColumnOrder { found: Vec<String> },
    #[error("model parameter {name} has invalid value '{value}'")]
    InvalidParam { name: &'static str, value: String },
    #[error("model contains no trees")]
    NoTrees,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node arrays differ in length")]
    InconsistentTree { tree: usize },
    #[error("tree {tree} node {node} points at invalid child {child}")]
    InvalidChild { tree: usize, node: usize, child: i64 },
    #[error(
        "tree {tree} node {node} splits on feature {feature}, beyond the {count} columns",
        count = FEATURE_COUNT
    )]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
    },
}
