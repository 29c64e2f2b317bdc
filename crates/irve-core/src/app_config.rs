/// Default CSV snapshot of the national IRVE consolidation.
pub const DEFAULT_CSV_URL: &str = "https://static.data.gouv.fr/resources/base-nationale-des-irve-infrastructures-de-recharge-pour-vehicules-electriques/20260208-045937/consolidation-etalab-schema-irve-statique-v-2.3.1-20260208.csv";

/// Default opendatasoft records endpoint for the same dataset.
pub const DEFAULT_RECORDS_API_URL: &str = "https://odre.opendatasoft.com/api/explore/v2.1/catalog/datasets/consolidation-etalab-schema-irve-statique-v-2-3-0/records";

#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the Supabase project, e.g. `https://xyz.supabase.co`.
    pub supabase_url: String,
    pub service_role_key: String,
    pub csv_url: String,
    pub records_api_url: String,
    pub batch_size: usize,
    pub cooldown_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("supabase_url", &self.supabase_url)
            .field("service_role_key", &"[redacted]")
            .field("csv_url", &self.csv_url)
            .field("records_api_url", &self.records_api_url)
            .field("batch_size", &self.batch_size)
            .field("cooldown_ms", &self.cooldown_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
