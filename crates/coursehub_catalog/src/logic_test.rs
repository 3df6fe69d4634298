#[cfg(test)]
mod tests {
    use crate::error::CatalogError;
    use crate::logic::*;
    use chrono::Utc;
    use coursehub_common::AuthUser;
    use coursehub_db::{
        ContentType, Course, CourseContent, CourseRepository, DbClient, NewContent, NewCourse,
        NewPurchase, Progress, PurchaseRepository, Repositories,
    };
    use uuid::Uuid;

    async fn setup() -> Repositories {
        let db = DbClient::in_memory().await.unwrap();
        Repositories::new(&db)
    }

    async fn course(repos: &Repositories, slug: &str) -> Course {
        repos
            .courses
            .insert_course(NewCourse {
                title: format!("Course {slug}"),
                slug: slug.to_string(),
                description: None,
                price_cents: 4900,
                thumbnail_url: None,
                published: true,
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
                content_type: if order_index % 2 == 0 { ContentType::Video } else { ContentType::Pdf },
                content_url: format!("https://cdn.example.com/{order_index}"),
                order_index,
                duration_seconds: 300,
                is_preview: preview,
            })
            .await
            .unwrap()
    }

    async fn buy(repos: &Repositories, user_id: &str, course_id: Uuid) {
        repos
            .purchases
            .record_purchase(NewPurchase {
                user_id: user_id.to_string(),
                course_id,
                stripe_payment_intent_id: None,
                stripe_checkout_session_id: Some("cs_test".to_string()),
                amount_cents: 4900,
            })
            .await
            .unwrap();
    }

    fn learner(user_id: &str) -> AuthUser {
        AuthUser {
            user_id: user_id.to_string(),
            email: None,
        }
    }

    fn item(is_preview: bool) -> CourseContent {
        CourseContent {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "Intro".to_string(),
            description: None,
            content_type: ContentType::Video,
            content_url: "https://cdn.example.com/intro.mp4".to_string(),
            order_index: 0,
            duration_seconds: 90,
            is_preview,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_percentage_rounding() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(0, 3), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(progress_percentage(3, 3), 100);
    }

    #[test]
    fn test_can_access_and_redaction() {
        assert!(can_access(true, &item(false)));
        assert!(can_access(false, &item(true)));
        assert!(!can_access(false, &item(false)));

        let locked = lesson_view(&item(false), false);
        assert!(locked.locked);
        assert_eq!(locked.content_url, None);

        let open = lesson_view(&item(true), true);
        assert!(!open.locked);
        assert_eq!(open.content_url.as_deref(), Some("https://cdn.example.com/intro.mp4"));
    }

    #[test]
    fn test_select_current_lesson() {
        let with = |item: &CourseContent, completed: Option<bool>| LessonWithProgress {
            lesson: lesson_view(item, true),
            progress: completed.map(|completed| Progress {
                id: Uuid::new_v4(),
                user_id: "user-1".to_string(),
                content_id: item.id,
                completed,
                last_position_seconds: 0,
                updated_at: Utc::now(),
            }),
        };
        let (a, b, c) = (item(false), item(false), item(false));

        assert_eq!(select_current_lesson(&[], None), None);
        assert_eq!(select_current_lesson(&[], Some(a.id)), None);

        let lessons = vec![with(&a, Some(true)), with(&b, Some(false)), with(&c, None)];
        assert_eq!(select_current_lesson(&lessons, None), Some(b.id));
        assert_eq!(select_current_lesson(&lessons, Some(c.id)), Some(c.id));
        assert_eq!(select_current_lesson(&lessons, Some(Uuid::new_v4())), Some(b.id));

        let finished = vec![with(&a, Some(true)), with(&b, Some(true))];
        assert_eq!(select_current_lesson(&finished, None), Some(a.id));
    }

    #[tokio::test]
    async fn test_course_progress_percentage() {
        let repos = setup().await;
        let empty = course(&repos, "empty").await;
        assert_eq!(course_progress_percentage(&repos, "user-1", empty.id).await.unwrap(), 0);

        let c = course(&repos, "timber").await;
        let l0 = lesson(&repos, c.id, 0, true).await;
        let l1 = lesson(&repos, c.id, 1, false).await;
        lesson(&repos, c.id, 2, false).await;
        buy(&repos, "user-1", c.id).await;

        let user = learner("user-1");
        complete_content(&repos, &user, l0.id).await.unwrap();
        assert_eq!(course_progress_percentage(&repos, "user-1", c.id).await.unwrap(), 33);

        // Position updates alone do not count
        update_progress(
            &repos,
            &user,
            l1.id,
            UpdateProgressRequest { last_position_seconds: 40, completed: None },
        )
        .await
        .unwrap();
        assert_eq!(course_progress_percentage(&repos, "user-1", c.id).await.unwrap(), 33);

        complete_content(&repos, &user, l1.id).await.unwrap();
        assert_eq!(course_progress_percentage(&repos, "user-1", c.id).await.unwrap(), 67);
        // Another user's progress is separate
        assert_eq!(course_progress_percentage(&repos, "user-2", c.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_content_with_progress_keeps_order() {
        let repos = setup().await;
        let c = course(&repos, "timber").await;
        let second = lesson(&repos, c.id, 2, false).await;
        let first = lesson(&repos, c.id, 1, true).await;
        complete_content(&repos, &learner("user-1"), first.id).await.unwrap();

        let items = content_with_progress(&repos, "user-1", c.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0.id, first.id);
        assert!(items[0].1.as_ref().is_some_and(|p| p.completed));
        assert_eq!(items[1].0.id, second.id);
        assert!(items[1].1.is_none());
    }

    #[tokio::test]
    async fn test_summaries_for_anonymous_and_owner() {
        let repos = setup().await;
        let owned = course(&repos, "owned").await;
        let l = lesson(&repos, owned.id, 0, false).await;
        course(&repos, "other").await;
        buy(&repos, "user-1", owned.id).await;
        complete_content(&repos, &learner("user-1"), l.id).await.unwrap();

        let anonymous = list_course_summaries(&repos, None, "usd").await.unwrap();
        assert_eq!(anonymous.len(), 2);
        assert!(anonymous.iter().all(|s| !s.is_purchased && s.progress_percentage == 0));
        assert!(anonymous.iter().all(|s| s.price_display == "$49.00"));

        let user = learner("user-1");
        let mine = list_course_summaries(&repos, Some(&user), "usd").await.unwrap();
        let entry = mine.iter().find(|s| s.course.id == owned.id).unwrap();
        assert!(entry.is_purchased);
        assert_eq!(entry.progress_percentage, 100);
        let other = mine.iter().find(|s| s.course.id != owned.id).unwrap();
        assert!(!other.is_purchased);

        let courses = my_courses(&repos, &user, "usd").await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course.slug, "owned");
        assert_eq!(courses[0].progress_percentage, 100);
    }

    #[tokio::test]
    async fn test_course_detail_redacts_locked_lessons() {
        let repos = setup().await;
        let c = course(&repos, "timber").await;
        lesson(&repos, c.id, 0, true).await;
        lesson(&repos, c.id, 1, false).await;

        let anonymous = course_detail(&repos, None, "timber", "eur").await.unwrap();
        assert!(!anonymous.is_purchased);
        assert_eq!(anonymous.price_display, "€49.00");
        assert!(anonymous.lessons[0].content_url.is_some());
        assert!(anonymous.lessons[1].content_url.is_none());

        buy(&repos, "user-1", c.id).await;
        let owner = course_detail(&repos, Some(&learner("user-1")), "timber", "usd").await.unwrap();
        assert!(owner.is_purchased);
        assert!(owner.lessons.iter().all(|l| l.content_url.is_some() && !l.locked));

        let missing = course_detail(&repos, None, "nope", "usd").await;
        assert!(matches!(missing, Err(CatalogError::CourseNotFound)));
    }

    #[tokio::test]
    async fn test_player_requires_purchase() {
        let repos = setup().await;
        let c = course(&repos, "timber").await;
        let l0 = lesson(&repos, c.id, 0, false).await;
        let l1 = lesson(&repos, c.id, 1, false).await;
        let user = learner("user-1");

        let locked = course_player(&repos, &user, "timber", None).await;
        assert!(matches!(locked, Err(CatalogError::NotPurchased)));

        buy(&repos, "user-1", c.id).await;
        complete_content(&repos, &user, l0.id).await.unwrap();

        let view = course_player(&repos, &user, "timber", None).await.unwrap();
        assert_eq!(view.lessons.len(), 2);
        assert_eq!(view.current_lesson_id, Some(l1.id));
        assert_eq!(view.progress_percentage, 50);

        let requested = course_player(&repos, &user, "timber", Some(l0.id)).await.unwrap();
        assert_eq!(requested.current_lesson_id, Some(l0.id));
    }

    #[tokio::test]
    async fn test_progress_write_rules() {
        let repos = setup().await;
        let c = course(&repos, "timber").await;
        let preview = lesson(&repos, c.id, 0, true).await;
        let paid = lesson(&repos, c.id, 1, false).await;
        let user = learner("user-1");

        let negative = update_progress(
            &repos,
            &user,
            preview.id,
            UpdateProgressRequest { last_position_seconds: -1, completed: None },
        )
        .await;
        assert!(matches!(negative, Err(CatalogError::InvalidProgress(_))));

        let unknown = complete_content(&repos, &user, Uuid::new_v4()).await;
        assert!(matches!(unknown, Err(CatalogError::ContentNotFound(_))));

        let locked = complete_content(&repos, &user, paid.id).await;
        assert!(matches!(locked, Err(CatalogError::NotPurchased)));

        // Preview content is open to everyone
        let saved = update_progress(
            &repos,
            &user,
            preview.id,
            UpdateProgressRequest { last_position_seconds: 30, completed: Some(true) },
        )
        .await
        .unwrap();
        assert!(saved.completed);
        assert_eq!(saved.last_position_seconds, 30);

        let fetched = content_progress(&repos, &user, preview.id).await.unwrap();
        assert_eq!(fetched, Some(saved));
        assert_eq!(content_progress(&repos, &user, paid.id).await.unwrap(), None);

        assert!(repos.purchases.list_for_user("user-1").await.unwrap().is_empty());
        let status = purchase_status(&repos, &user, c.id).await.unwrap();
        assert!(!status.is_purchased);
        assert!(repos.courses.find_published_by_slug("timber").await.unwrap().is_some());
    }
}
