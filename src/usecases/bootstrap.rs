use std::path::Path;

use crate::{
    infra::{
        self,
        config::{ConfigAdapter, FileConfigAdapter},
        error::AppError,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(config_path)?;
    let guard = infra::logging::init(&context.config.logging)?;

    Ok(context.with_log_guard(guard))
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter.load().map_err(AppError::ConfigLoad)?;

    Ok(AppContext::new(config))
}
