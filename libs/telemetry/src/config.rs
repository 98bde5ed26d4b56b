use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryProtocol {
    Grpc,
    HttpProtobuf,
}

impl TelemetryProtocol {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "http" | "http/protobuf" => TelemetryProtocol::HttpProtobuf,
            _ => TelemetryProtocol::Grpc,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub json_logs: bool,
    pub endpoint: String,
    pub protocol: TelemetryProtocol,
    pub enabled: bool,
}

impl TelemetryConfig {
    /// Reads `LOG_FORMAT`, `DEPLOYMENT_ENV` and the standard `OTEL_*`
    /// variables. Exporting also needs `ENABLE_OTEL` set to a truthy value.
    pub fn from_env(default_service_name: &str, default_service_version: &str) -> Self {
        let lookup = |key: &str| env::var(key).ok();
        Self::from_lookup(default_service_name, default_service_version, lookup)
    }

    fn from_lookup<F>(default_service_name: &str, default_service_version: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_default();
        let protocol = lookup("OTEL_EXPORTER_OTLP_PROTOCOL")
            .map(|v| TelemetryProtocol::parse(&v))
            .unwrap_or(TelemetryProtocol::Grpc);
        let service_name =
            lookup("OTEL_SERVICE_NAME").unwrap_or_else(|| default_service_name.to_string());
        let service_version = lookup("OTEL_SERVICE_VERSION")
            .unwrap_or_else(|| default_service_version.to_string());
        let environment = lookup("OTEL_RESOURCE_ATTRIBUTES")
            .and_then(|attrs| deployment_environment(&attrs))
            .or_else(|| lookup("DEPLOYMENT_ENV"))
            .unwrap_or_else(|| "dev".into());
        let json_logs = lookup("LOG_FORMAT")
            .map(|v| !matches!(v.to_lowercase().as_str(), "text" | "pretty" | "plain"))
            .unwrap_or(true);
        let enabled = lookup("ENABLE_OTEL")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            service_name,
            service_version,
            environment,
            json_logs,
            endpoint,
            protocol,
            enabled,
        }
    }

    pub fn exporter_enabled(&self) -> bool {
        self.enabled && !self.endpoint.trim().is_empty()
    }
}

fn deployment_environment(attrs: &str) -> Option<String> {
    attrs.split(',').find_map(|kv| {
        let (key, value) = kv.split_once('=')?;
        (key.trim() == "deployment.environment").then(|| value.trim().to_string())
    })
}
