pub mod router;
pub mod types;

pub use router::RouterClient;
pub use types::{
    BackendWeightInfo, ClientError, ModelEntry, ModelList, ModelStats, ModelWeights,
    ModelWeightsResponse, WeightsResponse,
};
