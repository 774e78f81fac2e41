// src/config.rs

use std::env;
use std::path::PathBuf;

// Configuração de abertura do armazenamento. Sem `data_dir`, o estado vive
// apenas em memória e morre com o processo.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = env::var("CRM_DATA_DIR").ok().map(PathBuf::from);
        let seed_demo_data = env::var("CRM_SEED_DEMO_DATA")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            data_dir,
            seed_demo_data,
        }
    }
}
