// src/config.rs
//! Process-environment configuration. Every upstream key is optional: a
//! missing key degrades only the dependent source or AI feature, never the
//! whole service.

pub const ENV_TIANAPI_KEY: &str = "TIANAPI_KEY";
pub const ENV_TOPHUB_KEY: &str = "TOPHUB_API_KEY";
pub const ENV_DEEPSEEK_KEY: &str = "DEEPSEEK_API_KEY";
pub const ENV_DASHSCOPE_KEY: &str = "DASHSCOPE_API_KEY";
pub const ENV_QWEN_KEY: &str = "QWEN_API_KEY";
pub const ENV_BOCHA_KEY: &str = "BOCHA_API_KEY";

#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub tianapi_key: Option<String>,
    pub tophub_key: Option<String>,
    pub deepseek_key: Option<String>,
    pub qwen_key: Option<String>,
    pub bocha_key: Option<String>,
}

impl Secrets {
    /// Read all keys once at startup. `DASHSCOPE_API_KEY` wins over the older
    /// `QWEN_API_KEY` alias.
    pub fn from_env() -> Self {
        Self {
            tianapi_key: non_empty(ENV_TIANAPI_KEY),
            tophub_key: non_empty(ENV_TOPHUB_KEY),
            deepseek_key: non_empty(ENV_DEEPSEEK_KEY),
            qwen_key: non_empty(ENV_DASHSCOPE_KEY).or_else(|| non_empty(ENV_QWEN_KEY)),
            bocha_key: non_empty(ENV_BOCHA_KEY),
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
