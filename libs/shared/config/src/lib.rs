use std::env;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
    /// Offset from UTC at which the clinic's "today" is evaluated.
    pub clinic_utc_offset_minutes: i32,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            store_backend: match env::var("STORE_BACKEND").as_deref() {
                Ok("supabase") => StoreBackend::Supabase,
                Ok("memory") => StoreBackend::Memory,
                Ok(other) => {
                    warn!("Unknown STORE_BACKEND '{}', using in-memory store", other);
                    StoreBackend::Memory
                }
                Err(_) => StoreBackend::Memory,
            },
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|raw| match raw.parse::<i32>() {
                    Ok(minutes) if minutes.abs() < 24 * 60 => Some(minutes),
                    _ => {
                        warn!("CLINIC_UTC_OFFSET_MINUTES '{}' is not a valid offset, using UTC", raw);
                        None
                    }
                })
                .unwrap_or(0),
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(3000),
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_configured() {
            warn!("Supabase store selected but not fully configured - missing environment variables");
        }

        config
    }

    /// Configuration used by tests and local runs: in-memory store, UTC.
    pub fn in_memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_key: String::new(),
            clinic_utc_offset_minutes: 0,
            port: 3000,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_key.is_empty()
    }
}
