use crate::api_client::{decode, ApiClient};
use crate::error::ApiError;
use marquee_common::api::{Genre, MediaType, Movie, MovieDetail, TimeWindow, Trailer};
use marquee_common::domain::ItemId;

pub const MAX_PAGE: u32 = 500;

fn validate_page(page: u32) -> Result<(), ApiError> {
    if page == 0 || page > MAX_PAGE {
        return Err(ApiError::Validation(format!(
            "page must be between 1 and {MAX_PAGE}, got {page}"
        )));
    }
    Ok(())
}

/// Catalog endpoints. None of them need a session.
impl ApiClient {
    /// The title shown in the hero banner.
    pub async fn featured(&self) -> Result<Movie, ApiError> {
        let res = self.get("/movies/featured").send().await?;
        decode(res).await
    }

    pub async fn popular(&self, page: u32) -> Result<Vec<Movie>, ApiError> {
        validate_page(page)?;
        let res = self
            .get("/movies/popular")
            .query(&[("page", page)])
            .send()
            .await?;
        decode(res).await
    }

    pub async fn trending(
        &self,
        media_type: MediaType,
        time_window: TimeWindow,
    ) -> Result<Vec<Movie>, ApiError> {
        let res = self
            .get("/movies/trending")
            .query(&[
                ("media_type", media_type.as_str()),
                ("time_window", time_window.as_str()),
            ])
            .send()
            .await?;
        decode(res).await
    }

    pub async fn by_genre(&self, genre_id: i64, page: u32) -> Result<Vec<Movie>, ApiError> {
        validate_page(page)?;
        let res = self
            .get(&format!("/movies/genre/{genre_id}"))
            .query(&[("page", page)])
            .send()
            .await?;
        decode(res).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<Vec<Movie>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation("search query can not be empty".into()));
        }
        validate_page(page)?;

        let page = page.to_string();
        let res = self
            .get("/movies/search")
            .query(&[("q", query), ("page", page.as_str())])
            .send()
            .await?;
        decode(res).await
    }

    pub async fn details(&self, id: ItemId) -> Result<MovieDetail, ApiError> {
        let res = self.get(&format!("/movies/{id}")).send().await?;
        decode(res).await
    }

    pub async fn trailer(&self, id: ItemId) -> Result<Trailer, ApiError> {
        let res = self.get(&format!("/movies/{id}/trailer")).send().await?;
        decode(res).await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>, ApiError> {
        let res = self.get("/genres").send().await?;
        decode(res).await
    }
}
