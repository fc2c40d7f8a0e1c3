use campus_core::error::AppError;
use campus_core::models::{CourseUpdate, STATUS_ACTIVE};

use crate::common::{sample_course, setup_test_db};

#[tokio::test]
async fn create_and_get_round_trip() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    let created = repo
        .create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();
    assert_eq!(created.status, STATUS_ACTIVE);
    assert_eq!(created.credits, 3);

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.course_code, "CS101");
    assert_eq!(fetched.course_name, "Intro to CS");
    assert!(fetched.enrolled_students.is_empty());
}

#[tokio::test]
async fn duplicate_code_is_a_conflict() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    repo.create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();

    let err = repo
        .create(&sample_course("CS101", "Another Name"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert!(err.to_string().contains("already"));
}

#[tokio::test]
async fn duplicate_name_is_a_conflict() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    repo.create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();

    let err = repo
        .create(&sample_course("CS102", "Intro to CS"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn partial_update_refreshes_updated_at() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    let created = repo
        .create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();

    let update = CourseUpdate {
        credits: Some(4),
        status: Some("inactive".into()),
        ..Default::default()
    };
    let updated = repo.update(created.id, &update.to_diff()).await.unwrap();

    assert_eq!(updated.credits, 4);
    assert_eq!(updated.status, "inactive");
    assert_eq!(updated.course_code, "CS101");
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn empty_update_is_a_bad_request() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    let created = repo
        .create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();

    let err = repo
        .update(created.id, &CourseUpdate::default().to_diff())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn hard_delete_removes_the_row() {
    let db = setup_test_db().await;
    let repo = db.course_repo();

    let created = repo
        .create(&sample_course("CS101", "Intro to CS"))
        .await
        .unwrap();

    repo.delete(created.id).await.unwrap();
    assert!(matches!(
        repo.get(created.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let err = repo.delete(created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
