use coursehub_db::{
    ContentRepository, ContentType, Course, CourseContent, CourseRepository, DbClient, NewContent,
    NewCourse, NewPurchase, ProgressRepository, PurchaseRecord, PurchaseRepository, Repositories,
};
use std::time::Duration;
use uuid::Uuid;

async fn setup() -> (DbClient, Repositories) {
    let db = DbClient::in_memory().await.expect("in-memory database");
    let repos = Repositories::new(&db);
    (db, repos)
}

async fn course(repos: &Repositories, slug: &str, published: bool) -> Course {
    repos
        .courses
        .insert_course(NewCourse {
            title: format!("Course {slug}"),
            slug: slug.to_string(),
            description: Some("About timber".to_string()),
            price_cents: 4900,
            thumbnail_url: None,
            published,
        })
        .await
        .unwrap()
}

async fn lesson(repos: &Repositories, course_id: Uuid, order_index: i64, preview: bool) -> CourseContent {
    repos
        .courses
        .insert_content(NewContent {
            course_id,
            title: format!("Lesson {order_index}"),
            description: None,
            content_type: ContentType::Video,
            content_url: format!("https://cdn.example.com/{order_index}.mp4"),
            order_index,
            duration_seconds: 600,
            is_preview: preview,
        })
        .await
        .unwrap()
}

fn purchase(user_id: &str, course_id: Uuid, session: &str) -> NewPurchase {
    NewPurchase {
        user_id: user_id.to_string(),
        course_id,
        stripe_payment_intent_id: Some("pi_123".to_string()),
        stripe_checkout_session_id: Some(session.to_string()),
        amount_cents: 4900,
    }
}

#[tokio::test]
async fn schema_init_is_idempotent() {
    let (db, _) = setup().await;
    db.init_schema().await.unwrap();
    assert!(db.is_healthy().await);
}

#[tokio::test]
async fn lists_only_published_courses_newest_first() {
    let (_db, repos) = setup().await;
    let older = course(&repos, "older", true).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    course(&repos, "draft", false).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let newer = course(&repos, "newer", true).await;

    let listed = repos.courses.list_published_courses().await.unwrap();

    let slugs: Vec<_> = listed.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec![newer.slug.as_str(), older.slug.as_str()]);
}

#[tokio::test]
async fn unpublished_course_is_not_found_by_slug_or_id() {
    let (_db, repos) = setup().await;
    let draft = course(&repos, "draft", false).await;

    assert!(repos.courses.find_published_by_slug("draft").await.unwrap().is_none());
    assert!(repos.courses.find_published_by_id(draft.id).await.unwrap().is_none());
    assert!(repos.courses.find_published_by_slug("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn stripe_ids_are_stored_on_course() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;

    repos.courses.set_stripe_ids(c.id, "prod_1", "price_1").await.unwrap();

    let stored = repos.courses.find_published_by_id(c.id).await.unwrap().unwrap();
    assert_eq!(stored.stripe_product_id.as_deref(), Some("prod_1"));
    assert_eq!(stored.stripe_price_id.as_deref(), Some("price_1"));
    assert!(repos.courses.set_stripe_ids(Uuid::new_v4(), "p", "q").await.is_err());
}

#[tokio::test]
async fn content_is_ordered_by_index() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;
    let third = lesson(&repos, c.id, 3, false).await;
    let first = lesson(&repos, c.id, 1, true).await;
    let second = lesson(&repos, c.id, 2, false).await;

    let listed = repos.content.list_for_course(c.id).await.unwrap();

    let ids: Vec<_> = listed.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert_eq!(listed[0].content_type, ContentType::Video);
    assert!(repos.content.find_by_id(second.id).await.unwrap().is_some());
    assert!(repos.content.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn recording_a_purchase_twice_keeps_one_row() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;

    let first = repos.purchases.record_purchase(purchase("user-1", c.id, "cs_1")).await.unwrap();
    let second = repos.purchases.record_purchase(purchase("user-1", c.id, "cs_2")).await.unwrap();

    assert!(matches!(first, PurchaseRecord::Created(_)));
    assert_eq!(second, PurchaseRecord::AlreadyRecorded);

    let purchases = repos.purchases.list_for_user("user-1").await.unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].stripe_checkout_session_id.as_deref(), Some("cs_1"));
    assert_eq!(purchases[0].amount_cents, 4900);
}

#[tokio::test]
async fn concurrent_duplicate_deliveries_record_once() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;

    let (a, b) = tokio::join!(
        repos.purchases.record_purchase(purchase("user-1", c.id, "cs_1")),
        repos.purchases.record_purchase(purchase("user-1", c.id, "cs_1")),
    );

    let created = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|r| matches!(r, PurchaseRecord::Created(_)))
        .count();
    assert_eq!(created, 1);
    assert_eq!(repos.purchases.list_for_user("user-1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn purchase_lookups() {
    let (_db, repos) = setup().await;
    let owned = course(&repos, "owned", true).await;
    let other = course(&repos, "other", true).await;
    repos.purchases.record_purchase(purchase("user-1", owned.id, "cs_1")).await.unwrap();

    assert!(repos.purchases.has_purchased("user-1", owned.id).await.unwrap());
    assert!(!repos.purchases.has_purchased("user-1", other.id).await.unwrap());
    assert!(!repos.purchases.has_purchased("user-2", owned.id).await.unwrap());

    let courses = repos.purchases.purchased_courses("user-1").await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, owned.id);

    let found = repos
        .purchases
        .find_for_user_and_course("user-1", owned.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.course_id, owned.id);
}

#[tokio::test]
async fn upsert_position_keeps_completion_unless_told_otherwise() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;
    let item = lesson(&repos, c.id, 1, false).await;

    let created = repos.progress.upsert_position("user-1", item.id, 30, None).await.unwrap();
    assert!(!created.completed);
    assert_eq!(created.last_position_seconds, 30);

    let completed = repos.progress.upsert_position("user-1", item.id, 40, Some(true)).await.unwrap();
    assert!(completed.completed);

    let kept = repos.progress.upsert_position("user-1", item.id, 55, None).await.unwrap();
    assert!(kept.completed);
    assert_eq!(kept.last_position_seconds, 55);
    assert_eq!(kept.id, created.id);

    let reset = repos.progress.upsert_position("user-1", item.id, 0, Some(false)).await.unwrap();
    assert!(!reset.completed);
}

#[tokio::test]
async fn mark_complete_keeps_position() {
    let (_db, repos) = setup().await;
    let c = course(&repos, "timber", true).await;
    let watched = lesson(&repos, c.id, 1, false).await;
    let unseen = lesson(&repos, c.id, 2, false).await;

    repos.progress.upsert_position("user-1", watched.id, 120, None).await.unwrap();
    let done = repos.progress.mark_complete("user-1", watched.id).await.unwrap();
    assert!(done.completed);
    assert_eq!(done.last_position_seconds, 120);

    let fresh = repos.progress.mark_complete("user-1", unseen.id).await.unwrap();
    assert!(fresh.completed);
    assert_eq!(fresh.last_position_seconds, 0);
}

#[tokio::test]
async fn course_progress_only_includes_that_course() {
    let (_db, repos) = setup().await;
    let a = course(&repos, "a", true).await;
    let b = course(&repos, "b", true).await;
    let in_a = lesson(&repos, a.id, 1, false).await;
    let in_b = lesson(&repos, b.id, 1, false).await;

    repos.progress.mark_complete("user-1", in_a.id).await.unwrap();
    repos.progress.mark_complete("user-1", in_b.id).await.unwrap();
    repos.progress.mark_complete("user-2", in_a.id).await.unwrap();

    let rows = repos.progress.list_for_course("user-1", a.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content_id, in_a.id);
    assert!(repos.progress.find("user-1", in_b.id).await.unwrap().is_some());
    assert!(repos.progress.find("user-3", in_b.id).await.unwrap().is_none());
}
