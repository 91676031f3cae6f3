// Copyright (c) 2024 Mike Tsao

//! Build identification for logs and host "about" panels.

/// The version-control description of this build if one was supplied at
/// compile time, otherwise the crate version.
pub fn app_version() -> &'static str {
    option_env!("GIT_DESCRIBE")
        .or(option_env!("GIT_REV_PARSE"))
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}
