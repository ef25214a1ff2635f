use serde::Deserialize;

/// Body of `POST /categories` and `PUT /categories/:id`.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}
