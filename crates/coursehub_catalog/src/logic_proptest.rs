#[cfg(test)]
mod tests {
    use crate::logic::{progress_percentage, select_current_lesson, LessonView, LessonWithProgress};
    use chrono::Utc;
    use coursehub_db::{ContentType, Progress};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn lessons(completed: &[bool]) -> Vec<LessonWithProgress> {
        let course_id = Uuid::new_v4();
        completed
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let id = Uuid::new_v4();
                LessonWithProgress {
                    lesson: LessonView {
                        id,
                        course_id,
                        title: format!("Lesson {i}"),
                        description: None,
                        content_type: ContentType::Video,
                        content_url: Some(format!("https://cdn.example.com/{i}.mp4")),
                        order_index: i as i64,
                        duration_seconds: 60,
                        is_preview: false,
                        locked: false,
                    },
                    progress: Some(Progress {
                        id: Uuid::new_v4(),
                        user_id: "user-1".to_string(),
                        content_id: id,
                        completed: *done,
                        last_position_seconds: 0,
                        updated_at: Utc::now(),
                    }),
                }
            })
            .collect()
    }

    proptest! {
        // Matches round-half-up of the exact ratio
        #[test]
        fn test_percentage_matches_float_rounding(total in 1usize..500, completed_seed in 0usize..500) {
            let completed = completed_seed % (total + 1);
            let expected = ((completed * 100) as f64 / total as f64 + 0.5).floor() as u8;
            prop_assert_eq!(progress_percentage(completed, total), expected);
        }

        #[test]
        fn test_percentage_is_bounded(total in 0usize..1000, completed in 0usize..2000) {
            prop_assert!(progress_percentage(completed, total) <= 100);
        }

        // The selection is always one of the course's lessons
        #[test]
        fn test_selected_lesson_belongs_to_course(
            completed in proptest::collection::vec(any::<bool>(), 1..20),
            ask_foreign in any::<bool>(),
        ) {
            let lessons = lessons(&completed);
            let requested = ask_foreign.then(Uuid::new_v4);
            let selected = select_current_lesson(&lessons, requested);
            prop_assert!(selected.is_some());
            prop_assert!(lessons.iter().any(|l| Some(l.lesson.id) == selected));

            if let Some(first_open) = completed.iter().position(|done| !done) {
                prop_assert_eq!(selected, Some(lessons[first_open].lesson.id));
            } else {
                prop_assert_eq!(selected, Some(lessons[0].lesson.id));
            }
        }
    }
}
