use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    Console,
    Memory,
    Smtp,
}

impl MailBackend {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "memory" => Ok(Self::Memory),
            "smtp" => Ok(Self::Smtp),
            other => Err(anyhow::anyhow!("unknown MAIL_BACKEND {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub from_address: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let mail = MailConfig::from_env()?;
        Ok(Self {
            port,
            database_url,
            host,
            base_url,
            mail,
        })
    }

    /// Cookies are only marked `Secure` when the public URL is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl MailConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("MAIL_BACKEND") {
            Ok(value) => MailBackend::parse(&value)?,
            Err(_) => MailBackend::Console,
        };
        let from_address =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@example.com".to_string());

        let smtp = if backend == MailBackend::Smtp {
            let host = env::var("SMTP_HOST")
                .map_err(|_| anyhow::anyhow!("SMTP_HOST is required when MAIL_BACKEND=smtp"))?;
            let port = env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(587);
            Some(SmtpConfig {
                host,
                port,
                username: env::var("SMTP_USERNAME").ok(),
                password: env::var("SMTP_PASSWORD").ok(),
            })
        } else {
            None
        };

        Ok(Self {
            backend,
            from_address,
            smtp,
        })
    }

    pub fn console() -> Self {
        Self {
            backend: MailBackend::Console,
            from_address: "no-reply@example.com".to_string(),
            smtp: None,
        }
    }
}
