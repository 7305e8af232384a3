// src/ports/html.rs
use crate::domain::Note;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

/// Everything the notes page shows
#[derive(Debug, Clone, Copy)]
pub struct PageModel<'a> {
    pub notes: &'a [Note],
    pub username: Option<&'a str>,
}

impl<'a> PageModel<'a> {
    pub fn new(notes: &'a [Note]) -> Self {
        Self {
            notes,
            username: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "trace", skip(self))]
    fn render_note(&self, note: &Note) -> String {
        let name = encode_text(&note.name);
        let image = note
            .image
            .as_ref()
            .map(|image| {
                format!(
                    r#"
            <img src="{src}" alt="visual aid for {alt}" style="width: 400px">"#,
                    src = encode_double_quoted_attribute(image.as_str()),
                    alt = encode_double_quoted_attribute(&note.name),
                )
            })
            .unwrap_or_default();

        format!(
            r#"
        <div class="note" data-note-id="{id}">
            <strong>{name}</strong>
            <span>{description}</span>{image}
            <span class="action">Delete note: <code>cloudnotes delete {id}</code></span>
        </div>"#,
            id = encode_double_quoted_attribute(&note.id),
            name = name,
            description = encode_text(&note.description),
            image = image,
        )
    }

    pub fn render(&self, page: &PageModel<'_>) -> String {
        let notes: String = page.notes.iter().map(|n| self.render_note(n)).collect();
        let notes = if notes.is_empty() {
            r#"
        <p class="empty">No notes yet</p>"#
                .to_string()
        } else {
            notes
        };
        let user = page
            .username
            .map(|u| format!(r#"<span class="user">{}</span>"#, encode_text(u)))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>My Notes App</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 900px;
            margin: 2rem auto;
            padding: 0 1rem;
            text-align: center;
        }}
        form.create, .note {{
            display: flex;
            flex-direction: row;
            justify-content: center;
            align-items: center;
            gap: 1rem;
            margin: 1rem 0;
        }}
        form.create {{
            margin: 3rem 0;
        }}
        input[type=text] {{
            border: none;
            border-bottom: 1px solid #999;
            padding: 4px;
        }}
        .action {{
            color: #047d95;
            font-size: 0.9em;
        }}
        .user {{
            color: #666;
            font-size: 0.9em;
        }}
    </style>
</head>
<body>
    <h1>My Notes App</h1>
    <form class="create" onsubmit="return false">
        <input type="text" name="name" placeholder="Note Name" aria-label="Note Name" required>
        <input type="text" name="description" placeholder="Note Description" aria-label="Note Description" required>
        <input type="file" name="image" accept="image/jpeg,image/png,image/webp">
        {user}
    </form>
    <p class="action">Create Note: <code>cloudnotes create -n NAME -d DESCRIPTION [-i IMAGE]</code></p>
    <p class="action">Sign Out: <code>cloudnotes sign-out</code></p>
    <h2>Current Notes</h2>
    <div class="notes">{notes}
    </div>
</body>
</html>"#,
            user = user,
            notes = notes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoteImage;
    use rstest::rstest;

    fn note(id: &str, name: &str, image: Option<NoteImage>) -> Note {
        Note {
            id: id.to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            image,
        }
    }

    #[test]
    fn given_notes_when_rendering_then_lists_each_with_delete_action() {
        let notes = vec![note("1", "A", None), note("2", "B", None)];
        let presenter = HtmlPresenter::new();

        let html = presenter.render(&PageModel::new(&notes));

        assert!(html.contains("<!DOCTYPE html>"));
        assert_eq!(html.matches("Delete note").count(), 2);
        assert!(html.contains(r#"data-note-id="1""#));
        assert!(html.contains(r#"data-note-id="2""#));
        assert!(html.contains("<code>cloudnotes delete 2</code>"));
        assert!(!html.contains("No notes yet"));
    }

    #[test]
    fn given_note_with_display_url_when_rendering_then_shows_image() {
        let url = "https://b.s3.amazonaws.com/public/1_a.png?X-Amz-Date=1&X-Amz-Signature=f";
        let notes = vec![note("1", "Cat", Some(NoteImage::DisplayUrl(url.to_string())))];

        let html = HtmlPresenter::new().render(&PageModel::new(&notes));

        assert!(html.contains(r#"alt="visual aid for Cat""#));
        assert!(html.contains("public/1_a.png?X-Amz-Date=1&amp;X-Amz-Signature=f"));
    }

    #[rstest]
    #[case("<script>alert(1)</script>", "&lt;script&gt;alert(1)&lt;/script&gt;")]
    #[case("Tom & Jerry", "Tom &amp; Jerry")]
    fn given_markup_in_name_when_rendering_then_escapes_it(
        #[case] name: &str,
        #[case] expected: &str,
    ) {
        let notes = vec![note("1", name, None)];

        let html = HtmlPresenter::new().render(&PageModel::new(&notes));

        assert!(html.contains(expected));
        assert!(!html.contains(name));
    }

    #[test]
    fn given_user_and_no_notes_when_rendering_then_shows_cli_actions() {
        let page = PageModel {
            notes: &[],
            username: Some("alice"),
        };

        let html = HtmlPresenter::new().render(&page);

        assert!(html.contains(r#"<span class="user">alice</span>"#));
        assert!(html.contains("No notes yet"));
        assert!(html.contains("Sign Out: <code>cloudnotes sign-out</code>"));
        assert!(html.contains("<code>cloudnotes create -n NAME -d DESCRIPTION [-i IMAGE]</code>"));
        assert!(!html.contains("method=\"post\""));
    }

    #[test]
    fn given_same_notes_when_rendering_twice_then_output_is_identical() {
        let notes = vec![note("1", "A", None)];
        let presenter = HtmlPresenter::new();

        assert_eq!(
            presenter.render(&PageModel::new(&notes)),
            presenter.render(&PageModel::new(&notes))
        );
    }
}
