mod helpers;

use cloudnotes::ports::{HtmlPresenter, PageModel};
use cloudnotes::util::testing::MockObjectStorage;
use helpers::{seeded_store, test_notes};

#[tokio::test]
async fn given_fetched_notes_when_rendering_then_images_use_display_urls() {
    // Arrange
    let mut store = seeded_store();
    let notes = store.fetch_all().await.expect("fetch should succeed");

    // Act
    let html = HtmlPresenter::new().render(&PageModel::new(notes));

    // Assert
    assert!(html.contains(r#"alt="visual aid for Cat""#));
    assert!(html.contains("public/1695797540370_cat.png?X-Amz-Expires=900"));
    assert!(html.contains("receipt%20scan%20%282%29.jpg"));
    assert_eq!(html.matches("<img ").count(), 2);
}

#[tokio::test]
async fn given_deleted_note_when_rerendering_then_it_disappears() {
    // Arrange
    let mut store = seeded_store();
    store.fetch_all().await.expect("fetch should succeed");
    let cat = store.notes()[0].clone();
    let presenter = HtmlPresenter::new();
    let before = presenter.render(&PageModel::new(store.notes()));

    // Act
    store.delete(&cat).await.expect("delete should succeed");
    let after = presenter.render(&PageModel::new(store.notes()));

    // Assert
    let cat_marker = format!(r#"data-note-id="{}""#, test_notes::CAT);
    assert!(before.contains(&cat_marker));
    assert!(!after.contains(&cat_marker));
    assert!(!after.contains(&MockObjectStorage::url_for(test_notes::CAT_KEY)));
    assert!(after.contains(&format!(r#"data-note-id="{}""#, test_notes::GROCERIES)));
}

#[test]
fn given_empty_list_when_rendering_then_shows_form_and_placeholder() {
    let html = HtmlPresenter::new().render(&PageModel::new(&[]));

    assert!(html.contains("Create Note"));
    assert!(html.contains(r#"name="description""#));
    assert!(html.contains(r#"type="file""#));
    assert!(html.contains("No notes yet"));
}
