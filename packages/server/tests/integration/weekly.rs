use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use crate::common::{TestApp, column, routes};

mod week_crud {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips_links() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WEEKLY,
                &json!({
                    "title": "Week 1: Introduction",
                    "start_date": "2024-01-08",
                    "description": "Course overview",
                    "links": ["https://example.edu/syllabus", "https://example.edu/slides"],
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let res = app.get(&routes::week(res.id())).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.data()["start_date"], "2024-01-08");
        assert_eq!(res.data()["links"][1], "https://example.edu/slides");
    }

    #[tokio::test]
    async fn missing_links_default_to_empty() {
        let app = TestApp::spawn().await;
        let id = app.create_week("Week 1", "2024-01-08").await;

        let res = app.get(&routes::week(id)).await;
        assert_eq!(res.data()["links"], json!([]));
    }

    #[tokio::test]
    async fn wrongly_typed_links_are_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WEEKLY,
                &json!({"title": "W", "start_date": "2024-01-08", "description": "D", "links": 3}),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn partial_update_and_validation() {
        let app = TestApp::spawn().await;
        let id = app.create_week("Week 1", "2024-01-08").await;

        let res = app
            .put(routes::WEEKLY, &json!({"id": id, "description": "  Revised <i>notes</i> "}))
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["description"], "Revised notes");
        assert_eq!(res.data()["title"], "Week 1");

        let res = app
            .put(routes::WEEKLY, &json!({"id": id, "start_date": "2024-02-30"}))
            .await;
        assert_eq!(res.status, 400);

        let res = app
            .put(routes::WEEKLY, &json!({"id": id, "title": "   "}))
            .await;
        assert_eq!(res.status, 400);

        let res = app.put(routes::WEEKLY, &json!({"id": id})).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "No fields to update");
    }
}

mod week_listing {
    use super::*;

    #[tokio::test]
    async fn list_defaults_to_start_date_ascending() {
        let app = TestApp::spawn().await;
        app.create_week("Week 3", "2024-01-22").await;
        app.create_week("Week 1", "2024-01-08").await;
        app.create_week("Week 2", "2024-01-15").await;

        let res = app.get(routes::WEEKLY).await;
        assert_eq!(column(res.items(), "title"), vec!["Week 1", "Week 2", "Week 3"]);

        let res = app.get("/api/weekly?resource=weeks&order=desc").await;
        assert_eq!(column(res.items(), "title"), vec!["Week 3", "Week 2", "Week 1"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let app = TestApp::spawn().await;
        app.create_week("Graphs", "2024-01-08").await;
        app.create_week("Trees", "2024-01-15").await;

        let res = app.get("/api/weekly?search=GRAPH").await;
        assert_eq!(column(res.items(), "title"), vec!["Graphs"]);
    }
}

mod week_comments {
    use super::*;

    #[tokio::test]
    async fn comments_round_trip() {
        let app = TestApp::spawn().await;
        let id = app.create_week("Week 1", "2024-01-08").await;
        app.create_week_comment(id, "<b>Great</b> week").await;

        let res = app.get(&routes::week_comments(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(column(res.items(), "text"), vec!["Great week"]);
        assert_eq!(res.items()[0]["week_id"], id);
    }

    #[tokio::test]
    async fn comment_requires_existing_week() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::WEEK_COMMENTS,
                &json!({"week_id": 12, "author": "Grace", "text": "hello"}),
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Week not found");

        let res = app
            .post(routes::WEEK_COMMENTS, &json!({"author": "Grace", "text": "hello"}))
            .await;
        assert_eq!(res.status, 400);

        let res = app.get(routes::WEEK_COMMENTS).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "week_id parameter is missing");
    }

    #[tokio::test]
    async fn deleting_week_cascades_to_comments() {
        let app = TestApp::spawn().await;
        let id = app.create_week("Week 1", "2024-01-08").await;
        let first = app.create_week_comment(id, "one").await;
        app.create_week_comment(id, "two").await;

        let res = app.delete(&routes::week(id)).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get(&routes::week(id)).await;
        assert_eq!(res.status, 404);

        let res = app.delete(&routes::week_comment(first)).await;
        assert_eq!(res.status, 404);

        let remaining = server::entity::week_comment::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
