// Disease detection: proxy to the AI service plus a static reference catalog
pub mod client;
pub mod diseases;
pub mod models;

pub use client::{AiClient, AiError};
pub use diseases::{lookup as lookup_disease, DiseaseInfo, AVAILABLE_DISEASES_HINT, DISEASES};
pub use models::{
    AiHealthStatus, DiseasePrediction, ImageUpload, PredictionResponse, UploadError,
    ALLOWED_IMAGE_TYPES,
};
