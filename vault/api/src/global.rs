use binary_helper::global::{GlobalConfig, GlobalConfigProvider, GlobalCtx};

use crate::config::ApiConfig;
use crate::database::PromptStore;
use crate::service::PromptService;

pub trait ApiState {
	type Store: PromptStore;

	fn prompt_service(&self) -> &PromptService<Self::Store>;

	/// Reported by the health check.
	fn service_name(&self) -> &str;

	fn service_version(&self) -> &str;
}

pub trait ApiGlobal: GlobalCtx + GlobalConfigProvider<ApiConfig> + GlobalConfig + ApiState + Send + Sync + 'static {}

impl<T> ApiGlobal for T where
	T: GlobalCtx + GlobalConfigProvider<ApiConfig> + GlobalConfig + ApiState + Send + Sync + 'static
{
}
