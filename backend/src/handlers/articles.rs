//! HTTP handlers for article and ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use shared::StatusMessage;

use crate::error::{AppError, AppResult};
use crate::services::bins::BinService;
use crate::services::ledger::{
    AddArticleInput, Article, ArticleAdded, ArticleRemoved, EditArticleInput, LedgerService,
};
use crate::AppState;

/// Add an article to a bin (created lazily if the name is new)
pub async fn add_article(
    State(state): State<AppState>,
    Path(bin_name): Path<String>,
    Json(input): Json<AddArticleInput>,
) -> AppResult<Json<ArticleAddedResponse>> {
    let bins = BinService::new(state.db.clone());
    let ledger = LedgerService::new(state.db);

    let upsert = bins.get_or_create(&bin_name).await?;
    let added = ledger.add_article(upsert.bin.id, input).await?;

    let status = StatusMessage::success(format!(
        "Article (code={}, qty={}) added.",
        added.article.code, added.article.quantity
    ));
    // The registry prompts for a weight on the first article of an
    // unweighted bin; nothing is enforced.
    let weight_prompt = (added.first_in_bin && added.bin_weight == 0.0).then(|| {
        StatusMessage::warning("WARNING: bin was empty - remember to set a weight for this bin!")
    });

    Ok(Json(ArticleAddedResponse {
        added,
        status,
        weight_prompt,
    }))
}

/// Point lookup
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> AppResult<Json<Article>> {
    let ledger = LedgerService::new(state.db);
    let article = ledger
        .get_article(article_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Article".to_string()))?;
    Ok(Json(article))
}

/// Edit an article's reference, operator, and quantity
pub async fn edit_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
    Json(input): Json<EditArticleInput>,
) -> AppResult<Json<ArticleEditedResponse>> {
    let ledger = LedgerService::new(state.db);
    let article = ledger.edit_article(article_id, input).await?;
    let status = StatusMessage::success(format!("Article {} updated.", article.code));
    Ok(Json(ArticleEditedResponse { article, status }))
}

/// Remove an article, logging its whole quantity as one OUT
pub async fn remove_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> AppResult<Json<ArticleRemovedResponse>> {
    let ledger = LedgerService::new(state.db);
    let removed = ledger.remove_article(article_id).await?;
    let status = StatusMessage::info(format!("Article ID={} removed.", removed.article_id));
    Ok(Json(ArticleRemovedResponse { removed, status }))
}

/// Add result with status and the optional weight prompt
#[derive(Debug, Serialize)]
pub struct ArticleAddedResponse {
    #[serde(flatten)]
    pub added: ArticleAdded,
    pub status: StatusMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_prompt: Option<StatusMessage>,
}

/// Edit result with its status message
#[derive(Debug, Serialize)]
pub struct ArticleEditedResponse {
    pub article: Article,
    pub status: StatusMessage,
}

/// Removal result with its status message
#[derive(Debug, Serialize)]
pub struct ArticleRemovedResponse {
    #[serde(flatten)]
    pub removed: ArticleRemoved,
    pub status: StatusMessage,
}
