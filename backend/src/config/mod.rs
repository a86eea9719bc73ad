use dotenv::dotenv;
use std::collections::HashSet;
use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Identity-provider subject ids allowed to review verification requests.
    pub admin_users: HashSet<String>,
    pub upload_dir: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv().ok(); // Load .env file if present
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            port: env::var("PORT").unwrap_or_else(|_| "5000".to_string()).parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            admin_users: parse_admin_users(&env::var("ADMIN_USERS").unwrap_or_default()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads".to_string()),
        })
    }
}

pub fn parse_admin_users(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_list_parses_trimmed_entries() {
        let admins = parse_admin_users(" alice , bob,carol ");
        assert_eq!(admins.len(), 3);
        assert!(admins.contains("alice"));
        assert!(admins.contains("bob"));
        assert!(admins.contains("carol"));
    }

    #[test]
    fn admin_list_ignores_empty_entries() {
        assert!(parse_admin_users("").is_empty());
        assert!(parse_admin_users(" , ,").is_empty());
        assert_eq!(parse_admin_users("admin-1,,").len(), 1);
    }
}
