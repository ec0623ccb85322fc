// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for feature validation and periodic fetches.

use thiserror::Error;

/// Reasons a feature fails its one-shot startup validation.
///
/// Every variant is fatal for the feature that produced it: the engine
/// records it as `Disabled(reason)` and never schedules that feature's task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown timezone '{id}'")]
    InvalidTimezone { id: String, detail: String },

    #[error("API key incorrect")]
    InvalidApiKey,

    #[error("zip/country code incorrect")]
    InvalidLocation,

    #[error("weather service rejected the configuration (HTTP {0})")]
    ConfigurationError(u16),

    #[error("weather service unavailable")]
    ServiceUnavailable { detail: String },
}

impl ValidationError {
    /// Underlying error detail, shown only in verbose output.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidTimezone { detail, .. } | Self::ServiceUnavailable { detail } => {
                Some(detail)
            }
            Self::InvalidApiKey | Self::InvalidLocation | Self::ConfigurationError(_) => None,
        }
    }
}

/// Failure of a single current-conditions fetch. Always recoverable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("weather service returned HTTP {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Malformed(String),
}
