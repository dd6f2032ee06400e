//! Deployment-script surface for tapdeploy
//!
//! The pieces a custom deployment script composes: shared command-line
//! arguments with interactive target completion, the HDFS uploader
//! client, and the Gearpump application submission client.

pub mod args;
pub mod gearpump;
pub mod uploader;

pub use args::{resolve_target, DeployArgs, TargetPlan};
pub use gearpump::{deploy_request, GearpumpClient};
pub use uploader::{
    base_url, upload_to_hdfs, uploader_endpoint, StoredObject, UploadRequest, Uploader,
};
