/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the staff data API (default: `http://localhost:8000`).
    pub api_url: String,
    /// Asset host account; uploads are refused while unset.
    pub cloud_name: Option<String>,
    /// Unsigned upload preset (default: `cv_uploads`).
    pub upload_preset: String,
    /// Asset host API root (default: `https://api.cloudinary.com/v1_1`).
    pub asset_host_base: String,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                            |
    /// |----------------------------|------------------------------------|
    /// | `API_URL`                  | `http://localhost:8000`            |
    /// | `CLOUDINARY_CLOUD_NAME`    | unset                              |
    /// | `CLOUDINARY_UPLOAD_PRESET` | `cv_uploads`                       |
    /// | `ASSET_HOST_BASE`          | `https://api.cloudinary.com/v1_1`  |
    pub fn from_env() -> Self {
        let api_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        let cloud_name = std::env::var("CLOUDINARY_CLOUD_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let upload_preset =
            std::env::var("CLOUDINARY_UPLOAD_PRESET").unwrap_or_else(|_| "cv_uploads".into());
        let asset_host_base = std::env::var("ASSET_HOST_BASE")
            .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".into());

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            cloud_name,
            upload_preset,
            asset_host_base: asset_host_base.trim_end_matches('/').to_string(),
        }
    }
}
