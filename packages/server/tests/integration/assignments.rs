use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use crate::common::{TestApp, column, routes};

mod assignment_crud {
    use super::*;

    #[tokio::test]
    async fn create_then_get_returns_empty_files() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::ASSIGNMENTS,
                &json!({"title": "T", "description": "D", "due_date": "2024-01-15"}),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.id();

        let res = app.get(&routes::assignment(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.data()["title"], "T");
        assert_eq!(res.data()["description"], "D");
        assert_eq!(res.data()["due_date"], "2024-01-15");
        assert_eq!(res.data()["files"], json!([]));
    }

    #[tokio::test]
    async fn text_fields_are_sanitized_and_files_kept_in_order() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::ASSIGNMENTS,
                &json!({
                    "title": "  <script>alert(1)</script><em>Lab</em> 1  ",
                    "description": "Read \"chapter\" 3 & 4",
                    "due_date": "2024-03-01",
                    "files": ["b.pdf", "a.pdf"],
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.get(&routes::assignment(res.id())).await;
        assert_eq!(res.data()["title"], "Lab 1");
        assert_eq!(
            res.data()["description"],
            "Read &quot;chapter&quot; 3 &amp; 4"
        );
        assert_eq!(res.data()["files"], json!(["b.pdf", "a.pdf"]));
    }

    #[tokio::test]
    async fn invalid_dates_and_missing_fields_are_rejected() {
        let app = TestApp::spawn().await;

        for date in ["2024-02-30", "2024-1-5", "tomorrow"] {
            let res = app
                .post(
                    routes::ASSIGNMENTS,
                    &json!({"title": "T", "description": "D", "due_date": date}),
                )
                .await;
            assert_eq!(res.status, 400, "{date} should be rejected");
            assert_eq!(res.error(), "Invalid date format");
        }

        let res = app
            .post(routes::ASSIGNMENTS, &json!({"title": "<p></p>", "description": "D", "due_date": "2024-01-15"}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing required fields");
    }

    #[tokio::test]
    async fn malformed_json_is_treated_as_empty_object() {
        let app = TestApp::spawn().await;

        let res = app
            .send_raw(reqwest::Method::POST, routes::ASSIGNMENTS, "{not json")
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing required fields");
    }

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let app = TestApp::spawn().await;
        let id = app.create_assignment("Lab 1", "2024-01-15").await;
        let before = app.get(&routes::assignment(id)).await;

        let res = app
            .put(routes::ASSIGNMENTS, &json!({"id": id, "files": ["brief.pdf"]}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["title"], "Lab 1");
        assert_eq!(res.data()["due_date"], "2024-01-15");
        assert_eq!(res.data()["files"], json!(["brief.pdf"]));

        let first: chrono::DateTime<chrono::Utc> =
            before.data()["updated_at"].as_str().unwrap().parse().unwrap();
        let second: chrono::DateTime<chrono::Utc> =
            res.data()["updated_at"].as_str().unwrap().parse().unwrap();
        assert!(second > first);

        let res = app
            .put(routes::ASSIGNMENTS, &json!({"id": id, "due_date": "2024-13-01"}))
            .await;
        assert_eq!(res.status, 400);

        let after = app.get(&routes::assignment(id)).await;
        assert_eq!(after.data()["due_date"], "2024-01-15");
    }

    #[tokio::test]
    async fn update_requires_existing_id() {
        let app = TestApp::spawn().await;

        let res = app.put(routes::ASSIGNMENTS, &json!({"title": "x"})).await;
        assert_eq!(res.status, 400);

        let res = app
            .put(routes::ASSIGNMENTS, &json!({"id": 42, "title": "x"}))
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Assignment not found");
    }
}

mod assignment_listing {
    use super::*;

    #[tokio::test]
    async fn list_defaults_to_due_date_ascending() {
        let app = TestApp::spawn().await;
        app.create_assignment("Late", "2024-05-01").await;
        app.create_assignment("Early", "2024-01-01").await;
        app.create_assignment("Middle", "2024-03-01").await;

        let res = app.get(routes::ASSIGNMENTS).await;
        assert_eq!(column(res.items(), "title"), vec!["Early", "Middle", "Late"]);

        let res = app.get("/api/assignments?sort=title&order=desc").await;
        assert_eq!(column(res.items(), "title"), vec!["Middle", "Late", "Early"]);
    }

    #[tokio::test]
    async fn invalid_sort_key_falls_back_to_due_date() {
        let app = TestApp::spawn().await;
        app.create_assignment("B", "2024-02-01").await;
        app.create_assignment("A", "2024-03-01").await;

        let res = app.get("/api/assignments?sort=id;DROP TABLE assignments").await;
        assert_eq!(res.status, 200);
        assert_eq!(column(res.items(), "title"), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn search_filters_title_and_description() {
        let app = TestApp::spawn().await;
        app.create_assignment("Recursion Lab", "2024-02-01").await;
        app.create_assignment("Sorting", "2024-03-01").await;

        let res = app.get("/api/assignments?search=recursion").await;
        assert_eq!(column(res.items(), "title"), vec!["Recursion Lab"]);

        let res = app.get("/api/assignments?search=%20").await;
        assert_eq!(res.items().len(), 2);
    }

    #[tokio::test]
    async fn search_matches_non_ascii_titles() {
        let app = TestApp::spawn().await;
        app.create_assignment("Élan vital", "2024-02-01").await;
        app.create_assignment("Sorting", "2024-03-01").await;

        let res = app.get("/api/assignments?search=%C3%89lan").await;
        assert_eq!(res.status, 200);
        assert_eq!(column(res.items(), "title"), vec!["Élan vital"]);

        let res = app.get("/api/assignments?search=%C3%89LAN%20VITAL").await;
        assert_eq!(column(res.items(), "title"), vec!["Élan vital"]);
    }
}

mod assignment_comments {
    use super::*;

    #[tokio::test]
    async fn comments_are_listed_oldest_first() {
        let app = TestApp::spawn().await;
        let id = app.create_assignment("Lab", "2024-01-15").await;
        app.create_assignment_comment(id, "first").await;
        app.create_assignment_comment(id, "second").await;

        let res = app.get(&routes::assignment_comments(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(column(res.items(), "text"), vec!["first", "second"]);
        assert_eq!(res.items()[0]["assignment_id"], id);
    }

    #[tokio::test]
    async fn listing_requires_parent_key() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::ASSIGNMENT_COMMENTS).await;
        assert_eq!(res.status, 400);

        let res = app.get(&routes::assignment_comments(77)).await;
        assert_eq!(res.status, 200);
        assert!(res.items().is_empty());
    }

    #[tokio::test]
    async fn comment_on_missing_assignment_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::ASSIGNMENT_COMMENTS,
                &json!({"assignment_id": 404, "author": "Grace", "text": "hello"}),
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Assignment not found");

        let count = server::entity::assignment_comment::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn comments_cannot_be_updated() {
        let app = TestApp::spawn().await;
        let id = app.create_assignment("Lab", "2024-01-15").await;
        let comment = app.create_assignment_comment(id, "first").await;

        let res = app
            .put(routes::ASSIGNMENT_COMMENTS, &json!({"id": comment, "text": "edited"}))
            .await;
        assert_eq!(res.status, 405);
        assert_eq!(res.code(), "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn single_comment_can_be_deleted() {
        let app = TestApp::spawn().await;
        let id = app.create_assignment("Lab", "2024-01-15").await;
        let keep = app.create_assignment_comment(id, "keep").await;
        let gone = app.create_assignment_comment(id, "drop").await;

        let res = app.delete(&routes::assignment_comment(gone)).await;
        assert_eq!(res.status, 200);

        let res = app.delete(&routes::assignment_comment(gone)).await;
        assert_eq!(res.status, 404);

        let res = app.get(&routes::assignment_comments(id)).await;
        assert_eq!(res.items().len(), 1);
        assert_eq!(res.items()[0]["id"], keep);
    }
}

mod assignment_deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_assignment_removes_its_comments() {
        let app = TestApp::spawn().await;
        let id = app.create_assignment("Lab", "2024-01-15").await;
        let other = app.create_assignment("Other", "2024-02-15").await;
        app.create_assignment_comment(id, "one").await;
        app.create_assignment_comment(id, "two").await;
        app.create_assignment_comment(other, "survivor").await;

        let res = app.delete(&routes::assignment(id)).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["message"],
            "Assignment and its comments were successfully deleted"
        );

        let res = app.get(&routes::assignment(id)).await;
        assert_eq!(res.status, 404);

        let orphaned = server::entity::assignment_comment::Entity::find()
            .filter(server::entity::assignment_comment::Column::AssignmentId.eq(id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(orphaned, 0);

        let res = app.get(&routes::assignment_comments(other)).await;
        assert_eq!(res.items().len(), 1);
    }

    #[tokio::test]
    async fn delete_error_cases() {
        let app = TestApp::spawn().await;

        let res = app.delete(routes::ASSIGNMENTS).await;
        assert_eq!(res.status, 400);

        let res = app.delete(&routes::assignment(9)).await;
        assert_eq!(res.status, 404);

        let res = app.delete("/api/assignments?id=nine").await;
        assert_eq!(res.status, 404);
    }
}
