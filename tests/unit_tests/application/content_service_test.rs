use std::sync::Arc;

use chrono::{Duration, Utc};

use whisperlog::application::ports::{
    ContentFilter, ContentQuery, ContentSortField, ProcessedContentRepository,
};
use whisperlog::application::services::{ContentError, ContentService};
use whisperlog::domain::{
    ContentId, ContentType, PageRequest, ProcessedContent, ProcessingMetadata, SortOrder,
    Template, User,
};
use whisperlog::infrastructure::persistence::InMemoryRepository;

use crate::support::{seed_template, seed_user};

async fn seed_content(
    repo: &InMemoryRepository,
    user: &User,
    template: &Template,
    content_type: ContentType,
    processed: &str,
    processing_time_ms: u64,
) -> ProcessedContent {
    let record = ProcessedContent::new(
        user.id,
        template.id,
        content_type,
        "raw".to_string(),
        processed.to_string(),
        ProcessingMetadata {
            submission_date: Utc::now(),
            processing_time_ms,
            ai_model: "mock".to_string(),
            placeholder_warnings: Vec::new(),
        },
    );
    ProcessedContentRepository::create(repo, &record).await.unwrap();
    record
}

struct Fixture {
    repo: Arc<InMemoryRepository>,
    ana: User,
    bo: User,
    standup: Template,
    journal: Template,
    service: ContentService,
}

async fn fixture() -> Fixture {
    let repo = Arc::new(InMemoryRepository::new());
    let ana = seed_user(&repo, "ana").await;
    let bo = seed_user(&repo, "bo").await;
    let standup = seed_template(&repo, &ana, "Standup", "# Standup").await;
    let journal = seed_template(&repo, &ana, "Journal", "# Journal").await;

    seed_content(&repo, &ana, &standup, ContentType::Text, "Parser shipped", 100).await;
    seed_content(&repo, &ana, &standup, ContentType::Audio, "Voice standup", 300).await;
    seed_content(&repo, &ana, &journal, ContentType::Text, "Long walk", 200).await;

    let bo_template = seed_template(&repo, &bo, "Standup", "# Standup").await;
    seed_content(&repo, &bo, &bo_template, ContentType::Text, "Bo's notes", 50).await;

    let service = ContentService::new(repo.clone(), repo.clone());
    Fixture {
        repo,
        ana,
        bo,
        standup,
        journal,
        service,
    }
}

fn query(filter: ContentFilter) -> ContentQuery {
    ContentQuery {
        filter,
        ..ContentQuery::default()
    }
}

#[tokio::test]
async fn given_records_of_two_users_when_listing_then_only_own_records_returned() {
    let fx = fixture().await;

    let page = fx.service.list(fx.ana.id, ContentQuery::default()).await.unwrap();

    assert_eq!(page.pagination.total, 3);
    assert!(page.data.iter().all(|v| v.owner.id == fx.ana.id));
}

#[tokio::test]
async fn given_filters_when_listing_then_they_combine() {
    let fx = fixture().await;

    let text_only = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                content_type: Some(ContentType::Text),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(text_only.pagination.total, 2);

    let by_template_name = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                template_name: Some("stand".to_string()),
                content_type: Some(ContentType::Audio),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(by_template_name.pagination.total, 1);
    assert_eq!(by_template_name.data[0].content.processed_content, "Voice standup");

    let search = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                search: Some("WALK".to_string()),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(search.pagination.total, 1);
    assert_eq!(search.data[0].template.title, "Journal");
}

#[tokio::test]
async fn given_sort_by_processing_time_when_listing_then_ordered() {
    let fx = fixture().await;

    let page = fx
        .service
        .list(
            fx.ana.id,
            ContentQuery {
                sort_by: ContentSortField::ProcessingTime,
                sort_order: SortOrder::Asc,
                page: PageRequest::new(Some(1), Some(2)),
                ..ContentQuery::default()
            },
        )
        .await
        .unwrap();

    let times: Vec<u64> = page
        .data
        .iter()
        .map(|v| v.content.metadata.processing_time_ms)
        .collect();
    assert_eq!(times, vec![100, 200]);
    assert!(page.pagination.has_next);
}

#[tokio::test]
async fn given_date_range_when_listing_then_bounds_are_inclusive() {
    let fx = fixture().await;
    let now = Utc::now();

    let future = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                date_from: Some(now + Duration::hours(1)),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(future.pagination.total, 0);

    let around_now = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                date_from: Some(now - Duration::hours(1)),
                date_to: Some(now + Duration::hours(1)),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(around_now.pagination.total, 3);
}

#[tokio::test]
async fn given_inverted_date_range_when_listing_then_validation_error() {
    let fx = fixture().await;
    let now = Utc::now();

    let err = fx
        .service
        .list(
            fx.ana.id,
            query(ContentFilter {
                date_from: Some(now),
                date_to: Some(now - Duration::days(1)),
                ..ContentFilter::default()
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::Validation { field: "dateFrom", .. }));
}

#[tokio::test]
async fn given_template_when_listing_by_template_then_template_and_its_records_returned() {
    let fx = fixture().await;

    let (template, page) = fx
        .service
        .list_by_template(fx.ana.id, fx.journal.id, ContentQuery::default())
        .await
        .unwrap();

    assert_eq!(template.id, fx.journal.id);
    assert_eq!(page.pagination.total, 1);

    let err = fx
        .service
        .list_by_template(fx.bo.id, fx.journal.id, ContentQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::TemplateNotFound(_)));
}

#[tokio::test]
async fn given_record_when_editing_then_only_processed_text_changes() {
    let fx = fixture().await;
    let page = fx
        .service
        .list_by_template(fx.ana.id, fx.journal.id, ContentQuery::default())
        .await
        .unwrap()
        .1;
    let id = page.data[0].content.id;

    let edited = fx
        .service
        .update_processed_text(fx.ana.id, id, "Short walk")
        .await
        .unwrap();

    assert_eq!(edited.content.processed_content, "Short walk");
    assert_eq!(edited.content.original_content, "raw");

    let err = fx
        .service
        .update_processed_text(fx.ana.id, id, "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Validation { .. }));

    let err = fx
        .service
        .update_processed_text(fx.bo.id, id, "stolen")
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::NotFound(_)));
}

#[tokio::test]
async fn given_deleted_record_when_reading_then_hidden_but_kept() {
    let fx = fixture().await;
    let record = seed_content(&fx.repo, &fx.ana, &fx.standup, ContentType::Text, "Extra", 10).await;

    fx.service.delete(fx.ana.id, record.id).await.unwrap();

    assert!(matches!(
        fx.service.get(fx.ana.id, record.id).await,
        Err(ContentError::NotFound(_))
    ));
    assert!(matches!(
        fx.service.get(fx.ana.id, ContentId::new()).await,
        Err(ContentError::NotFound(_))
    ));
    let stored = ProcessedContentRepository::find_including_inactive(fx.repo.as_ref(), record.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn given_mixed_records_when_computing_stats_then_totals_and_top_formats_match() {
    let fx = fixture().await;

    let stats = fx.service.stats(fx.ana.id).await.unwrap();

    assert_eq!(stats.total_processed, 3);
    assert_eq!(stats.text_content, 2);
    assert_eq!(stats.audio_content, 1);
    assert_eq!(stats.total_processing_time_ms, 600);
    assert!((stats.avg_processing_time_ms - 200.0).abs() < f64::EPSILON);
    assert_eq!(stats.top_formats[0].title, "Standup");
    assert_eq!(stats.top_formats[0].count, 2);
    assert_eq!(stats.top_formats[1].title, "Journal");
}

#[tokio::test]
async fn given_user_without_records_when_computing_stats_then_zeroes() {
    let repo = Arc::new(InMemoryRepository::new());
    let user = seed_user(&repo, "new").await;
    let service = ContentService::new(repo.clone(), repo.clone());

    let stats = service.stats(user.id).await.unwrap();

    assert_eq!(stats.total_processed, 0);
    assert_eq!(stats.avg_processing_time_ms, 0.0);
    assert!(stats.top_formats.is_empty());
}
