//! Request and Response models for the clinical notes API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies. Records,
//! medication lists and store entries are sent as their own types.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    CompleteRequest, CreateFolderRequest, CycleDoseRequest, ImportRequest, MedicationCycleRequest,
    RutRequest, SanitizeRequest, SaveRecordRequest, SearchRequest, SessionRequest,
};
pub use responses::{
    CompleteResponse, CycleDoseResponse, HealthResponse, HtmlResponse, RutResponse,
    SessionResponse, StatsResponse, ValidationResponse,
};
