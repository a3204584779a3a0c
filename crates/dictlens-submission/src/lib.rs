//! Submission service client and the submission view model
//!
//! [`SubmissionService`] talks to the submission server; [`SubmissionModel`]
//! holds one project's submission state and notifies subscribers whenever
//! that state changes.

pub mod model;
pub mod service;
pub mod state;

pub use model::SubmissionModel;
pub use service::{
    HttpSubmissionService, MockSubmissionService, QueueRequest, SubmissionError,
    SubmissionService,
};
pub use state::{
    DataTypeReport, FileGroup, FileReport, FileTypeReport, SubmissionDocument, SubmissionFile,
    SubmissionReport, SubmissionState,
};
