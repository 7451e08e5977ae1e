use super::*;

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            spot_base_url: "https://mijn.easyenergy.com/nl/api/tariff".to_string(),
            fees_url: "https://www.easyenergy.com/nl/energietarieven".to_string(),
            request_timeout_secs: 10,
            electricity_feed: "apx".to_string(),
            gas_feed: "leba".to_string(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 3600,
            publish_interval_secs: 60,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:8086".to_string(),
            database: "telegraf".to_string(),
            measurement: "easyenergy".to_string(),
            source_tag: "easyenergy".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/tariffwatch.log".to_string(),
            backup_count: 5,
            console_output: true,
            file_output: false,
            json_format: false,
        }
    }
}
