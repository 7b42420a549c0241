use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "display_name": "Laura Gómez",
        "email": "laura.gomez@company.com"
    })
)]
pub struct Employee {
    #[schema(example = 7)]
    pub id: u64,

    /// Nullable; consumers fall back to the account email.
    #[schema(example = "Laura Gómez", nullable = true)]
    pub display_name: Option<String>,

    #[schema(example = "laura.gomez@company.com", format = "email")]
    pub email: String,
}

impl Employee {
    /// Name to render: display name when recorded, account email otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}
