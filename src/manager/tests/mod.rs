use super::test_helpers::*;
use crate::error::{Error, JobError};
use crate::progress::FetchProgress;
use crate::types::{Event, FormatSelection, Status};
use std::sync::Arc;
use tokio::sync::Notify;

mod runner;
