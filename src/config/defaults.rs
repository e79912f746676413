use super::*;

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            product_code: "AGILE-24-10-01".to_string(),
            tariff_code: "E-1R-AGILE-24-10-01-C".to_string(),
            api_base: "https://api.octopus.energy/v1".to_string(),
            page_size: 1500,
            timeout_secs: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            expiry_days: 7,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            time: "16:00".to_string(),
            timezone: "UTC".to_string(),
            fetch_delay_minutes: 1,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            duration_hours: 2,
            horizon_hours: 24,
        }
    }
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            low_below: 0.15,
            medium_below: 0.25,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: std::env::temp_dir()
                .join("agile-tracker.log")
                .to_string_lossy()
                .to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tariff: TariffConfig::default(),
            cache: CacheConfig::default(),
            release: ReleaseConfig::default(),
            search: SearchConfig::default(),
            bands: BandsConfig::default(),
            chart_hours: 48,
            logging: LoggingConfig::default(),
        }
    }
}
