use crate::api::http_client::HttpClient;
use crate::errors::ClientResult;
use crate::models::Category;
use std::collections::BTreeMap;

/// Category id to display name.
pub type CategoryNames = BTreeMap<u64, String>;

#[derive(Clone)]
pub struct CategoriesApi {
    http: HttpClient,
}

impl CategoriesApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> ClientResult<CategoryNames> {
        let categories = self.list_full().await?;
        Ok(categories
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect())
    }

    pub async fn list_full(&self) -> ClientResult<Vec<Category>> {
        self.http.get("/categories/").await
    }
}
